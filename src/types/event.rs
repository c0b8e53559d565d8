//! Events emitted by a packet stream

use serde::Serialize;

use crate::records::DecodedRecord;

/// Why buffered bytes were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncLossReason {
    /// Aligned frame failed its integrity check.
    ChecksumMismatch { computed: u16, expected: u16 },
    /// Aligned frame carried a payload length that does not match the catalog.
    LengthMismatch { expected: u16, found: u16 },
    /// No preamble byte anywhere in the buffered bytes.
    NoPreamble,
}

/// Diagnostic for bytes that could not be framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncLoss {
    /// Absolute stream offset of the first rejected byte.
    pub offset: u64,
    /// Number of bytes in the rejected span (a full candidate frame for
    /// integrity failures, the discarded bytes for `NoPreamble`).
    pub len: usize,
    /// Cause of the loss.
    pub reason: SyncLossReason,
}

/// Counters reported when a stream closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Bytes consumed from the source
    pub bytes_read: u64,
    /// Records emitted
    pub records: u64,
    /// Sync loss events emitted
    pub sync_losses: u64,
    /// Bytes dropped while searching for alignment
    pub bytes_discarded: u64,
}

/// One item delivered to a stream consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StreamEvent {
    /// A validated, decoded frame.
    Record(DecodedRecord),
    /// Framing diagnostic; the stream continues.
    SyncLoss(SyncLoss),
    /// Terminal marker; nothing follows it.
    EndOfStream(StreamSummary),
}

impl StreamEvent {
    /// The decoded record, if this event carries one.
    pub fn record(&self) -> Option<&DecodedRecord> {
        match self {
            StreamEvent::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Consume the event, keeping only a decoded record.
    pub fn into_record(self) -> Option<DecodedRecord> {
        match self {
            StreamEvent::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Whether this is the terminal event.
    pub fn is_end(&self) -> bool {
        matches!(self, StreamEvent::EndOfStream(_))
    }
}
