#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Reference plugins.
//!
//! Each plugin is a small binary built on [`plugins::run_stdio`]:
//!
//! - `rrgen-json-generator` writes the schema it receives as JSON
//!   ([`JsonGenerator`]).
//! - `rrgen-prune-processor` removes source-only declarations
//!   ([`PruneProcessor`]).
//! - `rrgen-test-plugin` follows or breaks the protocol on request
//!   ([`scripted`]).

pub mod json;
pub mod prune;
pub mod scripted;

pub use json::JsonGenerator;
pub use prune::PruneProcessor;
