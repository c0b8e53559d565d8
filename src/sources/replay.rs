//! Replay source for captured log files

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info};

use crate::source::{ByteSource, SourceKind};
use crate::{Result, TelemetryError};

/// Replay source that serves the content of a capture file
///
/// The whole capture is loaded when the source is opened. Reads hand out the
/// remaining content at once, or in fixed-size chunks when
/// [`with_chunk_size`](Self::with_chunk_size) is set, and return `Ok(None)`
/// from then on.
#[derive(Debug)]
pub struct ReplaySource {
    /// Content not yet handed out
    data: Bytes,

    /// Bytes per read; `None` hands out everything at once
    chunk_size: Option<usize>,

    /// Origin of the capture, for logs
    path: Option<PathBuf>,

    closed: bool,
}

impl ReplaySource {
    /// Load a capture file
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;

        info!("Opened capture file {}: {} bytes", path.display(), data.len());

        Ok(Self { data: Bytes::from(data), chunk_size: None, path: Some(path.to_path_buf()), closed: false })
    }

    /// Serve bytes already in memory
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), chunk_size: None, path: None, closed: false }
    }

    /// Hand out at most `chunk_size` bytes per read (0 restores whole reads)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = (chunk_size > 0).then_some(chunk_size);
        self
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Path of the capture, if opened from a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// End the replay early; the next read reports end-of-stream
    pub fn close(&mut self) {
        if !self.closed {
            debug!("Replay closed with {} bytes unread", self.data.len());
        }
        self.closed = true;
        self.data = Bytes::new();
    }
}

#[async_trait::async_trait]
impl ByteSource for ReplaySource {
    async fn read(&mut self) -> Result<Option<Bytes>> {
        if self.closed || self.data.is_empty() {
            return Ok(None);
        }

        let take = self.chunk_size.map_or(self.data.len(), |n| n.min(self.data.len()));
        Ok(Some(self.data.split_to(take)))
    }

    async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        debug!("Replay source ignoring {}-byte command", command.len());
        Ok(())
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Replay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn whole_content_then_end_of_stream() {
        let mut source = ReplaySource::from_bytes(vec![1u8, 2, 3]);
        assert_eq!(source.read().await.unwrap().unwrap().as_ref(), &[1, 2, 3]);
        assert!(source.read().await.unwrap().is_none());
        assert!(source.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chunked_reads_cover_everything() {
        let mut source = ReplaySource::from_bytes((0u8..10).collect::<Vec<_>>()).with_chunk_size(4);
        let mut lens = Vec::new();
        while let Some(chunk) = source.read().await.unwrap() {
            lens.push(chunk.len());
        }
        assert_eq!(lens, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn empty_capture_ends_immediately() {
        let mut source = ReplaySource::from_bytes(Vec::<u8>::new());
        assert!(source.read().await.unwrap().is_none());
        assert_eq!(source.kind(), SourceKind::Replay);
    }

    #[tokio::test]
    async fn close_ends_the_replay() {
        let mut source = ReplaySource::from_bytes(vec![0u8; 100]).with_chunk_size(10);
        assert!(source.read().await.unwrap().is_some());
        source.close();
        assert!(source.read().await.unwrap().is_none());
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn commands_are_accepted_and_ignored() {
        let mut source = ReplaySource::from_bytes(vec![7u8]);
        source.send_command(&[0x55, 0x55, 0x53, 0x52, 0x00, 0x7E, 0x4F]).await.unwrap();
        assert_eq!(source.read().await.unwrap().unwrap().as_ref(), &[7]);
    }

    #[tokio::test]
    async fn open_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.bin");
        std::fs::write(&path, [0x55, 0x55]).unwrap();

        let mut source = ReplaySource::open(&path).await.unwrap();
        assert_eq!(source.path(), Some(path.as_path()));
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.read().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_a_file_error() {
        let result = ReplaySource::open("definitely/not/here.bin").await;
        assert!(matches!(result, Err(TelemetryError::File { .. })));
    }
}
