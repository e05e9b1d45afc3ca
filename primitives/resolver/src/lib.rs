#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Schema resolver and visitor framework.
//!
//! [`RSResolver`] is a read-only database over the files of one generation
//! run. It answers lookups by declaration url or location and can produce a
//! pruned copy of itself from a keep/drop [`Visitor`].

mod filter;
mod resolver;
pub mod visitor;

use thiserror::Error;

pub use resolver::RSResolver;
pub use visitor::{DefaultVisitor, EmptyVisitor, Node, NodeHandler, Visitor};

/// Kind of options an extend block contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsTarget {
    /// File options.
    File,
    /// Message options.
    Message,
    /// Field options.
    Field,
    /// Enum options.
    Enum,
    /// Enum constant options.
    EnumValue,
    /// Service options.
    Service,
    /// Rpc options.
    Method,
    /// `oneof` options.
    OneOf,
}

/// Errors returned by resolver queries.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver does not index extends of this kind.
    #[error("extends of {0:?} options are not supported")]
    UnsupportedOptionsTarget(OptionsTarget),
}
