//! Byte source trait for serial and replay inputs

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Whether a source can reach end-of-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Physical device; never ends on its own.
    Live,
    /// Captured file; ends when the content is exhausted.
    Replay,
}

/// Trait for raw byte inputs feeding a packet stream
///
/// Sources abstract over serial transports and captured files. Chunk
/// boundaries carry no meaning: the frame decoder produces the same events
/// however the bytes are split.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Read the next chunk of bytes
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - At least one new byte
    /// - `Ok(None)` - End of stream (replay sources only)
    /// - `Err(e)` - I/O failure; the stream terminates
    async fn read(&mut self) -> Result<Option<Bytes>>;

    /// Write a command (such as a reset) to the device
    ///
    /// Sources without a device to talk to accept and ignore commands.
    async fn send_command(&mut self, command: &[u8]) -> Result<()>;

    /// Kind of this source
    fn kind(&self) -> SourceKind;
}

#[async_trait::async_trait]
impl ByteSource for Box<dyn ByteSource> {
    async fn read(&mut self) -> Result<Option<Bytes>> {
        (**self).read().await
    }

    async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        (**self).send_command(command).await
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }
}
