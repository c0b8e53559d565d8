//! Payload field layout entries

use serde::Serialize;

use super::{ByteOrder, FieldType, Scale};

/// Location and interpretation of one payload field.
///
/// Offsets are relative to the start of the payload, not the frame. A field
/// with `count > 1` is a contiguous array of `count` elements of `field_type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Field name as used in records and logs
    pub name: &'static str,
    /// Byte offset within the payload
    pub offset: usize,
    /// Numeric kind of each element
    pub field_type: FieldType,
    /// Byte order of each element
    pub order: ByteOrder,
    /// Number of elements (1 for scalar, >1 for arrays)
    pub count: usize,
    /// Raw to physical conversion
    pub scale: Scale,
    /// Units of the converted value (e.g. "m/s^2", "deg/s")
    pub units: &'static str,
}

impl FieldSpec {
    /// Scalar field in physical units.
    pub const fn scalar(
        name: &'static str,
        offset: usize,
        field_type: FieldType,
        order: ByteOrder,
        scale: Scale,
        units: &'static str,
    ) -> Self {
        Self { name, offset, field_type, order, count: 1, scale, units }
    }

    /// Array of `count` elements.
    pub const fn array(
        name: &'static str,
        offset: usize,
        field_type: FieldType,
        order: ByteOrder,
        count: usize,
        scale: Scale,
        units: &'static str,
    ) -> Self {
        Self { name, offset, field_type, order, count, scale, units }
    }

    /// Size in bytes occupied by the whole field.
    pub const fn byte_len(&self) -> usize {
        self.field_type.size() * self.count
    }

    /// One past the last payload byte used by this field.
    pub const fn end(&self) -> usize {
        self.offset + self.byte_len()
    }

    /// Layout of element `index` of an array field, as a scalar.
    pub fn element(&self, index: usize) -> FieldSpec {
        FieldSpec { offset: self.offset + index * self.field_type.size(), count: 1, ..*self }
    }

    /// Raw bytes of this (scalar) field within `payload`.
    pub(crate) fn bytes<'a>(&self, payload: &'a [u8]) -> crate::Result<&'a [u8]> {
        payload.get(self.offset..self.offset + self.field_type.size()).ok_or(
            crate::TelemetryError::PayloadBounds {
                field: self.name,
                offset: self.offset,
                payload_len: payload.len(),
            },
        )
    }

    /// Mutable raw bytes of this (scalar) field within `payload`.
    pub(crate) fn bytes_mut<'a>(&self, payload: &'a mut [u8]) -> crate::Result<&'a mut [u8]> {
        let payload_len = payload.len();
        payload.get_mut(self.offset..self.offset + self.field_type.size()).ok_or(
            crate::TelemetryError::PayloadBounds {
                field: self.name,
                offset: self.offset,
                payload_len,
            },
        )
    }
}

/// Check a field table against its payload length.
///
/// Fields must fit the payload and must not overlap; order in the table is
/// the order of increasing offsets.
pub fn validate_layout(layout: &[FieldSpec], payload_len: usize) -> crate::Result<()> {
    let mut cursor = 0usize;
    for field in layout {
        if field.count == 0 {
            return Err(crate::TelemetryError::TypeConversion {
                details: format!("Field '{}' has count of 0", field.name),
            });
        }
        if field.offset < cursor {
            return Err(crate::TelemetryError::TypeConversion {
                details: format!("Field '{}' overlaps the previous field", field.name),
            });
        }
        if field.end() > payload_len {
            return Err(crate::TelemetryError::PayloadBounds {
                field: field.name,
                offset: field.offset,
                payload_len,
            });
        }
        cursor = field.end();
    }
    Ok(())
}
