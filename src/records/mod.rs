//! Typed records decoded from validated frames.
//!
//! Each packet type has a record struct whose fields are declared together
//! with their payload layout through `packet_record!`. The macro generates
//! the struct, its `LAYOUT` table and a [`PacketRecord`] implementation, so
//! decode and encode can never disagree about offsets or scaling.
//!
//! ```rust
//! use imulink::records::{PacketRecord, S1Record};
//!
//! let mut payload = [0u8; 24];
//! payload[21] = 1; // counter = 1, big-endian
//! let record = S1Record::decode(&payload).unwrap();
//! assert_eq!(record.counter, 1);
//! assert_eq!(record.accel, [0.0; 3]);
//! ```

use serde::Serialize;

use crate::types::{FieldSpec, PacketType};
use crate::{Result, TelemetryError};

mod imu;
mod ins;
mod nav;

pub use imu::{
    A1Record, A2Record, ChipCounts, E3Record, FMRecord, MGRecord, S0Record, S1Record, SARecord,
    SHRecord,
};
pub use ins::{
    OpenA2Record, OpenE1Record, OpenE2Record, OpenIdRecord, OpenS1Record, OpenSdRecord,
    OpenZ1Record,
};
pub use nav::NavRecord;

/// Standard gravity, used by the accelerometer scale factors.
pub const GRAVITY: f64 = 9.80665;

/// A record type bound to one packet type and its payload layout.
pub trait PacketRecord: Sized + Into<DecodedRecord> {
    /// Packet type this record is decoded from.
    const PACKET: PacketType;

    /// Field layout of the payload, in increasing offset order.
    const LAYOUT: &'static [FieldSpec];

    /// Decode a payload (frame bytes after the header and length field).
    fn decode(payload: &[u8]) -> Result<Self>;

    /// Write this record into a payload buffer.
    fn encode(&self, payload: &mut [u8]) -> Result<()>;
}

pub(crate) fn next_field<'a>(
    fields: &mut std::slice::Iter<'a, FieldSpec>,
    record: &'static str,
) -> Result<&'a FieldSpec> {
    fields.next().ok_or_else(|| TelemetryError::TypeConversion {
        details: format!("{} layout has fewer entries than fields", record),
    })
}

/// Declare a record struct together with its payload layout.
///
/// Every field is written as `name: Type = FieldSpec`. Field order must match
/// the layout order.
macro_rules! packet_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident for $packet:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty = $spec:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )+
        }

        impl $crate::records::PacketRecord for $name {
            const PACKET: $crate::types::PacketType = $crate::types::PacketType::$packet;
            const LAYOUT: &'static [$crate::types::FieldSpec] = &[$($spec),+];

            fn decode(payload: &[u8]) -> $crate::Result<Self> {
                let mut fields = <Self as $crate::records::PacketRecord>::LAYOUT.iter();
                Ok(Self {
                    $(
                        $field: <$ty as $crate::types::FieldData>::from_payload(
                            payload,
                            $crate::records::next_field(&mut fields, stringify!($name))?,
                        )?,
                    )+
                })
            }

            fn encode(&self, payload: &mut [u8]) -> $crate::Result<()> {
                let mut fields = <Self as $crate::records::PacketRecord>::LAYOUT.iter();
                $(
                    $crate::types::FieldData::to_payload(
                        &self.$field,
                        payload,
                        $crate::records::next_field(&mut fields, stringify!($name))?,
                    )?;
                )+
                Ok(())
            }
        }

        impl From<$name> for $crate::records::DecodedRecord {
            fn from(record: $name) -> Self {
                $crate::records::DecodedRecord::$packet(record)
            }
        }
    };
}

pub(crate) use packet_record;

macro_rules! decoded_records {
    ($($packet:ident => $record:ident),+ $(,)?) => {
        /// A decoded frame: one variant per packet type.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "packet", content = "fields")]
        pub enum DecodedRecord {
            $($packet($record),)+
        }

        impl DecodedRecord {
            /// Packet type this record was decoded from.
            pub fn packet_type(&self) -> PacketType {
                match self {
                    $(DecodedRecord::$packet(_) => PacketType::$packet,)+
                }
            }

            /// Write the record into a payload buffer of the catalog length.
            pub fn encode_payload(&self, payload: &mut [u8]) -> Result<()> {
                match self {
                    $(DecodedRecord::$packet(record) => record.encode(payload),)+
                }
            }

            /// Payload layout of this record's packet type.
            pub fn layout(&self) -> &'static [FieldSpec] {
                match self {
                    $(DecodedRecord::$packet(_) => $record::LAYOUT,)+
                }
            }
        }
    };
}

decoded_records! {
    A1 => A1Record,
    A2 => A2Record,
    S0 => S0Record,
    S1 => S1Record,
    SH => SHRecord,
    E3 => E3Record,
    SA => SARecord,
    MG => MGRecord,
    OpenZ1 => OpenZ1Record,
    OpenS1 => OpenS1Record,
    OpenA2 => OpenA2Record,
    OpenE1 => OpenE1Record,
    OpenE2 => OpenE2Record,
    OpenId => OpenIdRecord,
    OpenSd => OpenSdRecord,
    FM => FMRecord,
    Nav => NavRecord,
}

/// Decode a payload as record type `R`; the catalog stores one
/// monomorphised copy of this per packet type.
pub fn decode_as<R: PacketRecord>(payload: &[u8]) -> Result<DecodedRecord> {
    R::decode(payload).map(Into::into)
}
