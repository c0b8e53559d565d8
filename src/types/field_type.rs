//! Payload field type definitions

use serde::{Deserialize, Serialize};

/// Numeric kinds found in packet payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer (two's complement)
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer (two's complement)
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit IEEE-754 floating point
    Float32,
    /// 64-bit IEEE-754 floating point
    Float64,
}

impl FieldType {
    /// Returns the size in bytes of this field type.
    pub const fn size(&self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => 4,
            FieldType::UInt64 | FieldType::Float64 => 8,
        }
    }

    /// Whether the raw value is an integer (and therefore subject to scaling).
    pub const fn is_integer(&self) -> bool {
        !matches!(self, FieldType::Float32 | FieldType::Float64)
    }
}

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Least significant byte first (struct-packed payloads)
    Little,
    /// Most significant byte first (field-by-field payloads)
    Big,
}

impl ByteOrder {
    /// Assemble `N` bytes into their native array in this byte order.
    pub(crate) fn arrange<const N: usize>(self, bytes: &[u8]) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes[..N]);
        if self == ByteOrder::Big {
            out.reverse();
        }
        out
    }
}

/// Conversion from a raw field value to physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scale {
    /// Raw value is already in physical units
    Identity,
    /// `raw * full_scale / 2^16`
    PerLsb16(f64),
    /// `raw * factor`
    Factor(f64),
}

impl Scale {
    const LSB16: f64 = 65536.0;

    /// Multiplier applied to the raw value.
    pub fn factor(self) -> f64 {
        match self {
            Scale::Identity => 1.0,
            Scale::PerLsb16(full_scale) => full_scale / Self::LSB16,
            Scale::Factor(factor) => factor,
        }
    }

    /// Convert a raw value to physical units.
    pub fn apply(self, raw: f64) -> f64 {
        raw * self.factor()
    }

    /// Convert a physical value back to the raw domain (before rounding).
    pub fn invert(self, value: f64) -> f64 {
        value / self.factor()
    }
}
