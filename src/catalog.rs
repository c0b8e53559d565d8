//! Static catalog of packet framing parameters.
//!
//! Every supported [`PacketType`] maps to exactly one [`PacketDefinition`]:
//! preamble, marker, total frame size, length field, integrity family and
//! the record decoder. Definitions are resolved once when a stream is opened.

use serde::Serialize;

use crate::Result;
use crate::records::{self, DecodedRecord, PacketRecord, decode_as};
use crate::types::{FieldSpec, PacketType};

/// Preamble of the short-preamble family.
pub const SHORT_PREAMBLE: [u8; 2] = [0x55, 0x55];

/// Sync bytes of the INS1000 binary protocol.
pub const NAV_PREAMBLE: [u8; 2] = [0xAF, 0x20];

/// Message class and id of the INS1000 navigation packet.
///
/// The device fills the u16 length field that follows with the payload
/// length, 119, so 4 + 2 + 119 + 2 gives the 127-byte frame.
pub const NAV_MARKER: [u8; 2] = [0x05, 0x0D];

/// Integrity check used by a packet family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChecksumFamily {
    /// CRC-16, polynomial 0x1021, initial value 0x1D0F, over every byte
    /// after the preamble up to the checksum.
    Crc16,
    /// Dual running sum `256 * A + B` over the payload.
    RunningSum,
}

/// Width and encoding of the payload length field that follows the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LengthField {
    /// One byte.
    U8,
    /// Two bytes, little-endian. Used by the nav frame, whose length field
    /// always carries the payload length and is checked like the short one.
    U16Le,
}

impl LengthField {
    pub const fn size(self) -> usize {
        match self {
            LengthField::U8 => 1,
            LengthField::U16Le => 2,
        }
    }
}

/// Framing and decoding parameters of one packet type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PacketDefinition {
    pub packet_type: PacketType,
    /// Bytes that start every frame.
    pub preamble: &'static [u8],
    /// Bytes that follow the preamble and identify the packet type.
    pub marker: &'static [u8],
    /// Total frame size in bytes, checksum included.
    pub frame_size: usize,
    pub length_field: LengthField,
    pub checksum: ChecksumFamily,
    /// Field layout of the payload.
    pub layout: &'static [FieldSpec],
    #[serde(skip)]
    decode: fn(&[u8]) -> Result<DecodedRecord>,
}

/// Size of the trailing checksum of every frame.
pub const CHECKSUM_LEN: usize = 2;

impl PacketDefinition {
    const fn short<R: PacketRecord>(marker: &'static [u8; 2], frame_size: usize) -> Self {
        Self {
            packet_type: R::PACKET,
            preamble: &SHORT_PREAMBLE,
            marker,
            frame_size,
            length_field: LengthField::U8,
            checksum: ChecksumFamily::Crc16,
            layout: R::LAYOUT,
            decode: decode_as::<R>,
        }
    }

    /// Length of preamble plus marker.
    pub const fn header_len(&self) -> usize {
        self.preamble.len() + self.marker.len()
    }

    /// Offset of the first payload byte within the frame.
    pub const fn payload_offset(&self) -> usize {
        self.header_len() + self.length_field.size()
    }

    /// Number of payload bytes.
    pub const fn payload_len(&self) -> usize {
        self.frame_size - self.payload_offset() - CHECKSUM_LEN
    }

    /// Whether `frame` begins with this packet's preamble and marker.
    pub fn header_matches(&self, frame: &[u8]) -> bool {
        frame.len() >= self.header_len()
            && frame[..self.preamble.len()] == *self.preamble
            && frame[self.preamble.len()..self.header_len()] == *self.marker
    }

    /// Payload length the frame declares in its length field.
    pub fn declared_len(&self, frame: &[u8]) -> u16 {
        let at = self.header_len();
        match self.length_field {
            LengthField::U8 => frame[at] as u16,
            LengthField::U16Le => u16::from_le_bytes([frame[at], frame[at + 1]]),
        }
    }

    /// Bytes covered by the integrity check.
    pub fn checksum_span<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        let end = self.frame_size - CHECKSUM_LEN;
        match self.checksum {
            ChecksumFamily::Crc16 => &frame[self.preamble.len()..end],
            ChecksumFamily::RunningSum => &frame[self.payload_offset()..end],
        }
    }

    /// Checksum transmitted at the end of the frame (big-endian).
    pub fn transmitted_checksum(&self, frame: &[u8]) -> u16 {
        let end = self.frame_size;
        u16::from_be_bytes([frame[end - 2], frame[end - 1]])
    }

    /// Payload bytes of a complete frame.
    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        &frame[self.payload_offset()..self.frame_size - CHECKSUM_LEN]
    }

    /// Decode a payload into this packet's record type.
    pub fn decode_payload(&self, payload: &[u8]) -> Result<DecodedRecord> {
        (self.decode)(payload)
    }
}

// Indexed by `PacketType as usize`; order follows `PacketType::ALL`.
static CATALOG: [PacketDefinition; 17] = [
    PacketDefinition::short::<records::A1Record>(b"A1", 39),
    PacketDefinition::short::<records::A2Record>(b"A2", 37),
    PacketDefinition::short::<records::S0Record>(b"S0", 37),
    PacketDefinition::short::<records::S1Record>(b"S1", 31),
    PacketDefinition::short::<records::SHRecord>(b"SH", 37),
    PacketDefinition::short::<records::E3Record>(b"E3", 39),
    PacketDefinition::short::<records::SARecord>(b"SA", 25),
    PacketDefinition::short::<records::MGRecord>(b"MG", 35),
    PacketDefinition::short::<records::OpenZ1Record>(b"z1", 47),
    PacketDefinition::short::<records::OpenS1Record>(b"s1", 59),
    PacketDefinition::short::<records::OpenA2Record>(b"a2", 55),
    PacketDefinition::short::<records::OpenE1Record>(b"e1", 82),
    PacketDefinition::short::<records::OpenE2Record>(b"e2", 130),
    PacketDefinition::short::<records::OpenIdRecord>(b"id", 154),
    PacketDefinition::short::<records::OpenSdRecord>(b"sd", 57),
    PacketDefinition::short::<records::FMRecord>(b"FM", 123),
    PacketDefinition {
        packet_type: PacketType::Nav,
        preamble: &NAV_PREAMBLE,
        marker: &NAV_MARKER,
        frame_size: 127,
        length_field: LengthField::U16Le,
        checksum: ChecksumFamily::RunningSum,
        layout: <records::NavRecord as PacketRecord>::LAYOUT,
        decode: decode_as::<records::NavRecord>,
    },
];

/// Definition of `packet`.
pub fn definition(packet: PacketType) -> &'static PacketDefinition {
    &CATALOG[packet as usize]
}

/// Resolve a configuration tag such as `"S1"` or `"z1"`.
///
/// Fails with [`TelemetryError::UnsupportedPacketType`](crate::TelemetryError::UnsupportedPacketType)
/// for unknown tags.
pub fn lookup(tag: &str) -> Result<&'static PacketDefinition> {
    Ok(definition(tag.parse()?))
}

/// All definitions in catalog order.
pub fn definitions() -> &'static [PacketDefinition] {
    &CATALOG
}
