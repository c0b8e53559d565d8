//! Navigation packet of the INS1000 unit.

use super::packet_record;
use crate::types::{ByteOrder, FieldSpec, FieldType, Scale};

const fn le(
    name: &'static str,
    offset: usize,
    field_type: FieldType,
    count: usize,
    units: &'static str,
) -> FieldSpec {
    FieldSpec::array(name, offset, field_type, ByteOrder::Little, count, Scale::Identity, units)
}

packet_record! {
    /// Position, velocity and attitude solution.
    pub struct NavRecord for Nav {
        /// GPS time of week.
        time: f64 = le("time", 0, FieldType::Float64, 1, "s"),
        latitude: f64 = le("latitude", 8, FieldType::Float64, 1, "deg"),
        longitude: f64 = le("longitude", 16, FieldType::Float64, 1, "deg"),
        altitude: f32 = le("altitude", 24, FieldType::Float32, 1, "m"),
        /// North, east, down.
        velocity: [f32; 3] = le("velocity", 28, FieldType::Float32, 3, "m/s"),
        /// Attitude quaternion, scalar first.
        quaternion: [f32; 4] = le("quaternion", 40, FieldType::Float32, 4, ""),
    }
}
