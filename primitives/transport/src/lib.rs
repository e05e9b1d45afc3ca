#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `rrgen-transport` — Plugin Wire Protocol
//!
//! This crate defines how the orchestrator and an out-of-process plugin talk
//! to each other.
//!
//! ## Core Concepts
//!
//! ### Frames
//! Every message travels as a 4-byte little-endian length followed by its
//! bincode payload ([`frame`]). A stream that ends before a length prefix is
//! a clean close; a stream that ends inside a frame is a protocol error.
//!
//! ### Signals
//! [`GeneratorMessage`] flows from orchestrator to plugin and
//! [`PluginMessage`] back. Each carries a [`SignalId`] and one signal.
//!
//! ### `GPCommunication`
//! A duplex channel over any `AsyncRead` / `AsyncWrite` pair: process pipes
//! in production, `tokio::io::duplex` in tests. The incoming side is a pull
//! iterator (`has_next` then `next`); the outgoing side is cloneable.
//!
//! ### `Transport`
//! Object-safe sending half, used where a component only needs to emit
//! messages, e.g. a logger forwarding records to the orchestrator.
//!
//! ## Example
//! ```no_run
//! use transport::{GeneratorCommunication, GeneratorMessage, GeneratorSignal, SignalId};
//!
//! async fn handshake() -> transport::Result<()> {
//!     let (ours, _theirs) = tokio::io::duplex(1024);
//!     let (reader, writer) = tokio::io::split(ours);
//!     let mut channel = GeneratorCommunication::new(reader, writer, "plugin");
//!     let request = GeneratorMessage { id: SignalId("1".into()), signal: GeneratorSignal::FetchMetadata };
//!     channel.send(&request).await?;
//!     if channel.has_next().await? {
//!         println!("{:?}", channel.next()?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod communication;
pub mod descriptor;
pub mod frame;
pub mod options;
pub mod signal;

use std::sync::Arc;

use async_trait::async_trait;
pub use communication::{GPCommunication, GeneratorCommunication, Incoming, Outgoing, PluginCommunication};
pub use descriptor::{OptionDescriptor, OptionTypeKind};
pub use options::{GenerationOption, GenerationOptions};
pub use signal::{
    GeneratorMessage, GeneratorSignal, Level, MetaInformation, PluginMessage, PluginRole, PluginSignal,
    SignalId, SignalIdGenerator,
};

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type of the wire protocol.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Reading from or writing to the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The peer violated the framing or the message order.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A frame exceeds [`frame::MAX_FRAME_LEN`].
    #[error("Frame of {0} bytes exceeds the size limit")]
    FrameTooLarge(usize),

    /// `next()` was called without a successful `has_next()`.
    #[error("No message buffered; call has_next() first")]
    NothingBuffered,

    /// The peer closed the stream while a message was expected.
    #[error("Channel closed: {0}")]
    Closed(String),
}

/// Sending half of a channel, independent of the stream type.
#[async_trait]
pub trait Transport<M: Send + 'static>: Send + Sync {
    /// Sends one message; returns once it is flushed.
    async fn send(&self, message: M) -> Result<()>;

    /// Name of the peer, for diagnostics.
    fn endpoint(&self) -> &str;
}

/// Shared, dynamically dispatched sender.
pub type DynTransport<M> = Arc<dyn Transport<M>>;
