//! Length-prefixed framing.
//!
//! A frame is a 4-byte little-endian payload length followed by the
//! bincode encoding of one message.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Result, TransportError};

/// Largest payload accepted by [`read_frame`].
pub const MAX_FRAME_LEN: u32 = 256 * 1024 * 1024;

/// Writes one message and flushes.
pub async fn write_frame<W, M>(writer: &mut W, message: &M) -> Result<()>
where
    W: AsyncWrite + Unpin,
    M: Serialize,
{
    let payload = bincode::serialize(message)?;
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_LEN)
        .ok_or(TransportError::FrameTooLarge(payload.len()))?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one message.
///
/// Returns `Ok(None)` when the stream ends cleanly before a length prefix.
/// A stream ending anywhere inside a frame is a protocol error.
pub async fn read_frame<R, M>(reader: &mut R) -> Result<Option<M>>
where
    R: AsyncRead + Unpin,
    M: DeserializeOwned,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let read = reader.read(&mut prefix[filled..]).await?;
        if read == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(TransportError::Protocol(format!(
                "stream closed after {} of 4 length bytes",
                filled
            )));
        }
        filled += read;
    }

    let len = u32::from_le_bytes(prefix);
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(len as usize));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            TransportError::Protocol(format!("stream closed inside a frame of {} bytes", len))
        }
        _ => TransportError::Io(err),
    })?;
    Ok(Some(bincode::deserialize(&payload)?))
}
