//! Accumulation buffer for partially received frames.

use bytes::{Buf, Bytes, BytesMut};

/// Byte queue owned by one frame decoder.
///
/// Bytes are appended at the back and consumed from the front. The buffer
/// tracks how many bytes it has consumed so diagnostics can report absolute
/// stream offsets.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    bytes: BytesMut,
    consumed: u64,
}

impl FrameBuffer {
    /// Create a buffer sized for two frames of `frame_size` bytes.
    pub fn for_frame_size(frame_size: usize) -> Self {
        Self { bytes: BytesMut::with_capacity(frame_size * 2), consumed: 0 }
    }

    /// Append received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Buffered bytes, front first.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Absolute stream offset of the first buffered byte.
    pub fn offset(&self) -> u64 {
        self.consumed
    }

    /// Drop `n` bytes from the front.
    pub fn discard(&mut self, n: usize) {
        let n = n.min(self.bytes.len());
        self.bytes.advance(n);
        self.consumed += n as u64;
    }

    /// Remove and return the first `n` bytes.
    pub fn take(&mut self, n: usize) -> Bytes {
        let n = n.min(self.bytes.len());
        self.consumed += n as u64;
        self.bytes.split_to(n).freeze()
    }

    /// Position of the first `byte` at or after `from`.
    pub fn find(&self, byte: u8, from: usize) -> Option<usize> {
        self.bytes.get(from..)?.iter().position(|&b| b == byte).map(|i| i + from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consuming_tracks_absolute_offset() {
        let mut buffer = FrameBuffer::for_frame_size(4);
        buffer.extend(&[1, 2, 3, 4, 5, 6]);
        buffer.discard(2);
        assert_eq!(buffer.offset(), 2);
        assert_eq!(buffer.take(3).as_ref(), &[3, 4, 5]);
        assert_eq!(buffer.offset(), 5);
        assert_eq!(buffer.as_slice(), &[6]);
    }

    #[test]
    fn discard_past_end_empties_buffer() {
        let mut buffer = FrameBuffer::default();
        buffer.extend(&[1, 2]);
        buffer.discard(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.offset(), 2);
    }

    #[test]
    fn find_respects_start_position() {
        let mut buffer = FrameBuffer::default();
        buffer.extend(&[0x55, 0x00, 0x55]);
        assert_eq!(buffer.find(0x55, 0), Some(0));
        assert_eq!(buffer.find(0x55, 1), Some(2));
        assert_eq!(buffer.find(0x55, 3), None);
        assert_eq!(buffer.find(0x55, 9), None);
    }
}
