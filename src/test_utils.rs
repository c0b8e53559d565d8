//! Test utilities for synthesizing frames and capture files
//!
//! Captures are built from records through [`encode_frame`], so tests never
//! depend on recorded device logs being present in the checkout.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::catalog::definition;
use crate::framing::encode_frame;
use crate::records::DecodedRecord;
use crate::types::PacketType;

/// Frame builders.
pub mod frames {
    use super::*;
    use crate::records::S1Record;

    /// Encode a record into a wire frame.
    pub fn frame(record: impl Into<DecodedRecord>) -> Bytes {
        encode_frame(&record.into()).expect("catalog records always encode")
    }

    /// S1 frame with zero sensor data and the given counter.
    pub fn s1_counter(counter: u16) -> Bytes {
        frame(S1Record { counter, ..Default::default() })
    }

    /// Valid frame whose payload is all zero.
    pub fn zeroed(packet: PacketType) -> Bytes {
        encode_frame(&zeroed_record(packet)).expect("catalog records always encode")
    }

    /// Record decoded from an all-zero payload.
    pub fn zeroed_record(packet: PacketType) -> DecodedRecord {
        let def = definition(packet);
        def.decode_payload(&vec![0; def.payload_len()]).expect("catalog layouts fit their payloads")
    }

    /// Record with every field non-zero and exactly re-encodable.
    ///
    /// Decoded from a payload filled with `0x11`, which keeps every float
    /// finite and every integer away from its limits.
    pub fn sample(packet: PacketType) -> DecodedRecord {
        let def = definition(packet);
        def.decode_payload(&vec![0x11; def.payload_len()]).expect("catalog layouts fit their payloads")
    }
}

/// Concatenate `count` sample frames of `packet`, inserting `noise` bytes of
/// line noise (never a preamble byte) before every `noise_every`-th frame.
pub fn capture(packet: PacketType, count: usize, noise_every: usize, noise: usize) -> Vec<u8> {
    let frame = frames::frame(frames::sample(packet));
    let filler = if definition(packet).preamble[0] == 0x00 { 0x01 } else { 0x00 };

    let mut bytes = Vec::with_capacity(count * (frame.len() + noise));
    for i in 0..count {
        if noise_every > 0 && i % noise_every == 0 {
            bytes.extend(std::iter::repeat_n(filler, noise));
        }
        bytes.extend_from_slice(&frame);
    }
    bytes
}

/// Write a capture into `dir` and return its path.
pub fn write_capture(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
