//! Frame alignment and validation.

use bytes::Bytes;

use crate::catalog::PacketDefinition;
use crate::types::{SyncLoss, SyncLossReason};

/// Result of one synchronizer step over the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStep {
    /// A validated frame, already removed from the buffer.
    Frame(Bytes),
    /// Bytes were rejected and dropped from the buffer.
    Lost(SyncLoss),
}

/// Finds frame boundaries for one packet type.
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer {
    definition: &'static PacketDefinition,
}

impl Synchronizer {
    pub fn new(definition: &'static PacketDefinition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &'static PacketDefinition {
        self.definition
    }

    /// Advance over the buffer until a frame is validated, bytes are
    /// rejected, or more input is needed (`None`).
    ///
    /// Returns the step together with the number of bytes skipped silently
    /// while hunting for the next preamble byte.
    pub fn step(&self, buffer: &mut super::FrameBuffer) -> (Option<SyncStep>, usize) {
        let def = self.definition;
        let frame_size = def.frame_size;
        let mut skipped = 0;

        while buffer.len() >= frame_size {
            if def.header_matches(buffer.as_slice()) {
                let frame = &buffer.as_slice()[..frame_size];
                return match validate(def, frame) {
                    Ok(()) => (Some(SyncStep::Frame(buffer.take(frame_size))), skipped),
                    Err(reason) => {
                        let loss = SyncLoss { offset: buffer.offset(), len: frame_size, reason };
                        buffer.discard(1);
                        (Some(SyncStep::Lost(loss)), skipped)
                    }
                };
            }

            match buffer.find(def.preamble[0], 1) {
                Some(k) => {
                    buffer.discard(k);
                    skipped += k;
                }
                None => {
                    let loss = SyncLoss {
                        offset: buffer.offset(),
                        len: buffer.len(),
                        reason: SyncLossReason::NoPreamble,
                    };
                    buffer.discard(buffer.len());
                    return (Some(SyncStep::Lost(loss)), skipped);
                }
            }
        }
        (None, skipped)
    }
}

/// Check the length field and checksum of an aligned frame.
pub fn validate(def: &PacketDefinition, frame: &[u8]) -> Result<(), SyncLossReason> {
    let expected_len = def.payload_len() as u16;
    let found = def.declared_len(frame);
    if found != expected_len {
        return Err(SyncLossReason::LengthMismatch { expected: expected_len, found });
    }

    let computed = def.checksum.compute(def.checksum_span(frame));
    let expected = def.transmitted_checksum(frame);
    if computed != expected {
        return Err(SyncLossReason::ChecksumMismatch { computed, expected });
    }
    Ok(())
}
