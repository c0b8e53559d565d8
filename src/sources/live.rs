//! Live source over a serial-like transport

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::Result;
use crate::source::{ByteSource, SourceKind};

/// Bytes requested from the transport per read
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Pause between polls while the transport reports no data
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Live source reading from a device transport
///
/// The transport is any `AsyncRead + AsyncWrite`, typically a serial port
/// opened by the caller. Reads wait until at least one byte is available. A
/// zero-byte read is not end-of-stream for a device: it is logged and the
/// source keeps polling until the stream is cancelled.
pub struct LiveSource<T> {
    transport: T,
    buffer: BytesMut,
    read_size: usize,
    idle_reads: u64,
}

impl<T> LiveSource<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(transport: T) -> Self {
        Self::with_read_size(transport, DEFAULT_READ_SIZE)
    }

    pub fn with_read_size(transport: T, read_size: usize) -> Self {
        let read_size = read_size.max(1);
        Self { transport, buffer: BytesMut::with_capacity(read_size), read_size, idle_reads: 0 }
    }
}

#[async_trait::async_trait]
impl<T> ByteSource for LiveSource<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn read(&mut self) -> Result<Option<Bytes>> {
        loop {
            self.buffer.reserve(self.read_size);
            let n = (&mut self.transport).take(self.read_size as u64).read_buf(&mut self.buffer).await?;

            if n > 0 {
                if self.idle_reads > 0 {
                    debug!("Live source resumed after {} empty reads", self.idle_reads);
                    self.idle_reads = 0;
                }
                trace!("Live source read {} bytes", n);
                return Ok(Some(self.buffer.split().freeze()));
            }

            self.idle_reads += 1;
            if self.idle_reads == 1 {
                warn!("Live source returned no data, continuing to poll");
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }

    async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        debug!("Sending {}-byte command to device", command.len());
        self.transport.write_all(command).await?;
        self.transport.flush().await?;
        Ok(())
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }
}
