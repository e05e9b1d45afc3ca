//! Duplex message channel over a byte stream pair.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::trace;

use crate::frame::{read_frame, write_frame};
use crate::signal::{GeneratorMessage, PluginMessage};
use crate::{Result, Transport, TransportError};

/// Pull iterator over incoming messages.
///
/// [`Incoming::has_next`] reads ahead at most one message; [`Incoming::next`]
/// hands it out.
#[derive(Debug)]
pub struct Incoming<R, M> {
    reader: R,
    buffered: Option<M>,
    closed: bool,
}

impl<R, M> Incoming<R, M>
where
    R: AsyncRead + Unpin + Send,
    M: DeserializeOwned + Send,
{
    /// Reads messages from `reader`.
    pub fn new(reader: R) -> Self { Self { reader, buffered: None, closed: false } }

    /// Whether another message is available, waiting for it if needed.
    /// Returns `false` once the peer closed the stream.
    pub async fn has_next(&mut self) -> Result<bool> {
        if self.buffered.is_some() {
            return Ok(true);
        }
        if self.closed {
            return Ok(false);
        }
        match read_frame(&mut self.reader).await? {
            Some(message) => {
                self.buffered = Some(message);
                Ok(true)
            }
            None => {
                self.closed = true;
                Ok(false)
            }
        }
    }

    /// Takes the message buffered by [`Incoming::has_next`].
    pub fn next(&mut self) -> Result<M> { self.buffered.take().ok_or(TransportError::NothingBuffered) }

    /// Next message, or `None` once the stream is closed.
    pub async fn receive(&mut self) -> Result<Option<M>> {
        if self.has_next().await? {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Next message; a closed stream is an error built by `on_closed`.
    pub async fn receive_or(&mut self, on_closed: impl FnOnce() -> TransportError + Send) -> Result<M> {
        match self.receive().await? {
            Some(message) => Ok(message),
            None => Err(on_closed()),
        }
    }
}

/// Sending half. Clones share the underlying writer.
#[derive(Debug)]
pub struct Outgoing<W, M> {
    writer: Arc<Mutex<W>>,
    endpoint: Arc<str>,
    _message: PhantomData<fn(M)>,
}

impl<W, M> Clone for Outgoing<W, M> {
    fn clone(&self) -> Self {
        Self { writer: Arc::clone(&self.writer), endpoint: Arc::clone(&self.endpoint), _message: PhantomData }
    }
}

impl<W, M> Outgoing<W, M>
where
    W: AsyncWrite + Unpin + Send,
    M: Serialize + Sync,
{
    /// Writes messages to `writer`; `endpoint` names the peer in diagnostics.
    pub fn new(writer: W, endpoint: impl Into<String>) -> Self {
        Self { writer: Arc::new(Mutex::new(writer)), endpoint: Arc::from(endpoint.into()), _message: PhantomData }
    }

    /// Sends one message. Returns once it is written and flushed.
    pub async fn send(&self, message: &M) -> Result<()> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, message).await?;
        trace!(endpoint = %self.endpoint, "Frame sent");
        Ok(())
    }

    /// Shuts the writer down, signalling end of stream to the peer.
    pub async fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }

    /// Name of the peer.
    pub fn endpoint(&self) -> &str { &self.endpoint }
}

#[async_trait]
impl<W, M> Transport<M> for Outgoing<W, M>
where
    W: AsyncWrite + Unpin + Send,
    M: Serialize + Send + Sync + 'static,
{
    async fn send(&self, message: M) -> Result<()> { Outgoing::send(self, &message).await }

    fn endpoint(&self) -> &str { &self.endpoint }
}

/// Both directions of a conversation with one peer.
#[derive(Debug)]
pub struct GPCommunication<R, W, In, Out> {
    /// Messages from the peer.
    pub incoming: Incoming<R, In>,
    /// Messages to the peer.
    pub outgoing: Outgoing<W, Out>,
}

/// Orchestrator side of a plugin conversation.
pub type GeneratorCommunication<R, W> = GPCommunication<R, W, PluginMessage, GeneratorMessage>;

/// Plugin side of a plugin conversation.
pub type PluginCommunication<R, W> = GPCommunication<R, W, GeneratorMessage, PluginMessage>;

impl<R, W, In, Out> GPCommunication<R, W, In, Out>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    In: DeserializeOwned + Send,
    Out: Serialize + Sync,
{
    /// Channel reading from `reader` and writing to `writer`.
    pub fn new(reader: R, writer: W, endpoint: impl Into<String>) -> Self {
        Self { incoming: Incoming::new(reader), outgoing: Outgoing::new(writer, endpoint) }
    }

    /// See [`Incoming::has_next`].
    pub async fn has_next(&mut self) -> Result<bool> { self.incoming.has_next().await }

    /// See [`Incoming::next`].
    pub fn next(&mut self) -> Result<In> { self.incoming.next() }

    /// See [`Incoming::receive`].
    pub async fn receive(&mut self) -> Result<Option<In>> { self.incoming.receive().await }

    /// See [`Outgoing::send`].
    pub async fn send(&self, message: &Out) -> Result<()> { self.outgoing.send(message).await }

    /// Closes the outgoing direction.
    pub async fn close(&self) -> Result<()> { self.outgoing.close().await }

    /// Splits into independently owned halves.
    pub fn split(self) -> (Incoming<R, In>, Outgoing<W, Out>) { (self.incoming, self.outgoing) }
}
