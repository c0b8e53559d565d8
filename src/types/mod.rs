//! Core types for packet layouts and stream events.
//!
//! This module provides the foundational data structures shared by the
//! catalog, the decoders and the stream layer.
//!
//! ## Architecture
//!
//! - [`PacketType`] names every packet the catalog can frame and decode
//! - [`FieldSpec`] describes where a field lives in a payload and how to scale it
//! - [`FieldType`], [`ByteOrder`] and [`Scale`] describe the raw wire encoding
//! - [`FieldData`] parses typed values out of a payload, with bounds checking
//! - [`StreamEvent`] is the only thing a stream hands to its consumer
//!
//! ## Usage Example
//!
//! ```rust
//! use imulink::types::{ByteOrder, FieldData, FieldSpec, FieldType, Scale};
//!
//! // Angular rate, big-endian, 1260 deg/s full scale
//! let rate = FieldSpec::scalar(
//!     "rate_x",
//!     0,
//!     FieldType::Int16,
//!     ByteOrder::Big,
//!     Scale::PerLsb16(1260.0),
//!     "deg/s",
//! );
//!
//! let payload = [0x40, 0x00]; // 16384 counts
//! let value = f64::from_payload(&payload, &rate).unwrap();
//! assert_eq!(value, 315.0);
//! ```

mod event;
mod field;
mod field_data;
mod field_type;
mod packet_type;
mod update_rate;

// Re-export all public types
pub use event::{StreamEvent, StreamSummary, SyncLoss, SyncLossReason};
pub use field::{FieldSpec, validate_layout};
pub use field_data::FieldData;
pub use field_type::{ByteOrder, FieldType, Scale};
pub use packet_type::PacketType;
pub use update_rate::UpdateRate;
