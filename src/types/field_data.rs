//! Field data parsing trait and implementations

use super::{FieldSpec, FieldType};
use crate::{Result, TelemetryError};

/// Trait for types that can be read from (and written to) a packet payload.
///
/// Exact integer and `f32` implementations require the field to have the
/// matching [`FieldType`] and ignore the scale. The `f64` implementation
/// accepts any numeric field and applies the field's [`Scale`](super::Scale),
/// which is how raw counts become physical units.
pub trait FieldData: Sized {
    /// Parse this type from the payload at the field's offset.
    fn from_payload(payload: &[u8], field: &FieldSpec) -> Result<Self>;

    /// Write this value into the payload at the field's offset.
    fn to_payload(&self, payload: &mut [u8], field: &FieldSpec) -> Result<()>;
}

fn expect_type(field: &FieldSpec, expected: FieldType) -> Result<()> {
    if field.field_type != expected {
        return Err(TelemetryError::TypeConversion {
            details: format!(
                "Field '{}': expected {:?}, got {:?}",
                field.name, expected, field.field_type
            ),
        });
    }
    Ok(())
}

/// Copy little-endian bytes into the payload in the field's byte order.
fn put(payload: &mut [u8], field: &FieldSpec, le_bytes: &[u8]) -> Result<()> {
    let dst = field.bytes_mut(payload)?;
    dst.copy_from_slice(le_bytes);
    if field.order == super::ByteOrder::Big {
        dst.reverse();
    }
    Ok(())
}

macro_rules! impl_exact_field {
    ($ty:ty, $variant:ident) => {
        impl FieldData for $ty {
            fn from_payload(payload: &[u8], field: &FieldSpec) -> Result<Self> {
                expect_type(field, FieldType::$variant)?;
                let bytes = field.bytes(payload)?;
                Ok(<$ty>::from_le_bytes(field.order.arrange(bytes)))
            }

            fn to_payload(&self, payload: &mut [u8], field: &FieldSpec) -> Result<()> {
                expect_type(field, FieldType::$variant)?;
                put(payload, field, &self.to_le_bytes())
            }
        }
    };
}

impl_exact_field!(i8, Int8);
impl_exact_field!(u8, UInt8);
impl_exact_field!(i16, Int16);
impl_exact_field!(u16, UInt16);
impl_exact_field!(i32, Int32);
impl_exact_field!(u32, UInt32);
impl_exact_field!(u64, UInt64);
impl_exact_field!(f32, Float32);

/// Raw field value before scaling, with two's complement already applied.
fn read_raw(payload: &[u8], field: &FieldSpec) -> Result<f64> {
    let bytes = field.bytes(payload)?;
    let order = field.order;
    let raw = match field.field_type {
        FieldType::Int8 => bytes[0] as i8 as f64,
        FieldType::UInt8 => bytes[0] as f64,
        FieldType::Int16 => i16::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::UInt16 => u16::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::Int32 => i32::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::UInt32 => u32::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::UInt64 => u64::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::Float32 => f32::from_le_bytes(order.arrange(bytes)) as f64,
        FieldType::Float64 => f64::from_le_bytes(order.arrange(bytes)),
    };
    Ok(raw)
}

/// Write a raw-domain value, rounding and saturating for integer fields.
fn write_raw(payload: &mut [u8], field: &FieldSpec, raw: f64) -> Result<()> {
    let rounded = raw.round();
    match field.field_type {
        FieldType::Int8 => put(payload, field, &(rounded as i8).to_le_bytes()),
        FieldType::UInt8 => put(payload, field, &(rounded as u8).to_le_bytes()),
        FieldType::Int16 => put(payload, field, &(rounded as i16).to_le_bytes()),
        FieldType::UInt16 => put(payload, field, &(rounded as u16).to_le_bytes()),
        FieldType::Int32 => put(payload, field, &(rounded as i32).to_le_bytes()),
        FieldType::UInt32 => put(payload, field, &(rounded as u32).to_le_bytes()),
        FieldType::UInt64 => put(payload, field, &(rounded as u64).to_le_bytes()),
        FieldType::Float32 => put(payload, field, &(raw as f32).to_le_bytes()),
        FieldType::Float64 => put(payload, field, &raw.to_le_bytes()),
    }
}

impl FieldData for f64 {
    fn from_payload(payload: &[u8], field: &FieldSpec) -> Result<Self> {
        Ok(field.scale.apply(read_raw(payload, field)?))
    }

    fn to_payload(&self, payload: &mut [u8], field: &FieldSpec) -> Result<()> {
        write_raw(payload, field, field.scale.invert(*self))
    }
}

// Array support for FieldData
impl<T: FieldData + Copy + Default, const N: usize> FieldData for [T; N] {
    fn from_payload(payload: &[u8], field: &FieldSpec) -> Result<Self> {
        if field.count != N {
            return Err(TelemetryError::TypeConversion {
                details: format!(
                    "Field '{}' has {} elements, expected {}",
                    field.name, field.count, N
                ),
            });
        }

        let mut result = [T::default(); N];
        for (i, slot) in result.iter_mut().enumerate() {
            *slot = T::from_payload(payload, &field.element(i))?;
        }
        Ok(result)
    }

    fn to_payload(&self, payload: &mut [u8], field: &FieldSpec) -> Result<()> {
        if field.count != N {
            return Err(TelemetryError::TypeConversion {
                details: format!(
                    "Field '{}' has {} elements, expected {}",
                    field.name, field.count, N
                ),
            });
        }

        for (i, value) in self.iter().enumerate() {
            value.to_payload(payload, &field.element(i))?;
        }
        Ok(())
    }
}
