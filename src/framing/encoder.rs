//! Frame synthesis for records.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Result;
use crate::catalog::{self, CHECKSUM_LEN, LengthField};
use crate::records::DecodedRecord;

/// Build a complete wire frame for `record`: preamble, marker, length
/// field, encoded payload and checksum.
///
/// Reserved payload bytes are zero.
pub fn encode_frame(record: &DecodedRecord) -> Result<Bytes> {
    let def = catalog::definition(record.packet_type());
    let mut frame = BytesMut::with_capacity(def.frame_size);
    frame.put_slice(def.preamble);
    frame.put_slice(def.marker);
    match def.length_field {
        LengthField::U8 => frame.put_u8(def.payload_len() as u8),
        LengthField::U16Le => frame.put_u16_le(def.payload_len() as u16),
    }
    frame.put_bytes(0, def.payload_len() + CHECKSUM_LEN);

    let payload_end = def.frame_size - CHECKSUM_LEN;
    record.encode_payload(&mut frame[def.payload_offset()..payload_end])?;

    let checksum = def.checksum.compute(def.checksum_span(&frame));
    frame[payload_end..].copy_from_slice(&checksum.to_be_bytes());
    Ok(frame.freeze())
}
