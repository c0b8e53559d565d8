//! Big-endian packets of the IMU38x line.
//!
//! Integer fields are transmitted most significant byte first. Scaled fields
//! use the full-scale convention `raw * range / 2^16` unless noted.

use super::{GRAVITY, packet_record};
use crate::types::{ByteOrder, FieldSpec, FieldType, Scale};

const ACCEL: Scale = Scale::PerLsb16(20.0 * GRAVITY);
const ACCEL_G: Scale = Scale::PerLsb16(20.0);
const RATE: Scale = Scale::PerLsb16(1260.0);
const MAG: Scale = Scale::PerLsb16(2.0);
const ANGLE: Scale = Scale::PerLsb16(360.0);
const TEMP: Scale = Scale::PerLsb16(200.0);
const SPEED: Scale = Scale::Factor(0.001);

const fn be(
    name: &'static str,
    offset: usize,
    field_type: FieldType,
    count: usize,
    scale: Scale,
    units: &'static str,
) -> FieldSpec {
    FieldSpec::array(name, offset, field_type, ByteOrder::Big, count, scale, units)
}

const fn raw(name: &'static str, offset: usize, field_type: FieldType) -> FieldSpec {
    be(name, offset, field_type, 1, Scale::Identity, "")
}

packet_record! {
    /// Scaled sensor data with magnetometer.
    pub struct S0Record for S0 {
        accel: [f64; 3] = be("accel", 0, FieldType::Int16, 3, ACCEL, "m/s^2"),
        rate: [f64; 3] = be("rate", 6, FieldType::Int16, 3, RATE, "deg/s"),
        mag: [f64; 3] = be("mag", 12, FieldType::Int16, 3, MAG, "Gauss"),
        /// Rate sensor temperatures followed by the board temperature.
        temperature: [f64; 4] = be("temperature", 18, FieldType::Int16, 4, TEMP, "degC"),
        /// Lower 16 bits of the GPS time of week.
        counter: u16 = raw("counter", 26, FieldType::UInt16),
        bit_status: u16 = raw("bit_status", 28, FieldType::UInt16),
    }
}

packet_record! {
    /// Scaled sensor data without magnetometer.
    pub struct S1Record for S1 {
        accel: [f64; 3] = be("accel", 0, FieldType::Int16, 3, ACCEL, "m/s^2"),
        rate: [f64; 3] = be("rate", 6, FieldType::Int16, 3, RATE, "deg/s"),
        temperature: [f64; 4] = be("temperature", 12, FieldType::Int16, 4, TEMP, "degC"),
        counter: u16 = raw("counter", 20, FieldType::UInt16),
        bit_status: u16 = raw("bit_status", 22, FieldType::UInt16),
    }
}

packet_record! {
    /// High-resolution scaled sensor data (32-bit accel and rate).
    pub struct SHRecord for SH {
        accel: [f64; 3] = be("accel", 0, FieldType::Int32, 3, Scale::Factor(GRAVITY / 4.0e6), "m/s^2"),
        rate: [f64; 3] = be("rate", 12, FieldType::Int32, 3, Scale::Factor(1.0 / 2.56e5), "deg/s"),
        temperature: f64 = be("temperature", 24, FieldType::Int16, 1, Scale::PerLsb16(400.0), "degC"),
        counter: u16 = raw("counter", 26, FieldType::UInt16),
        bit_status: u16 = raw("bit_status", 28, FieldType::UInt16),
    }
}

packet_record! {
    /// Attitude solution with magnetometer.
    pub struct A1Record for A1 {
        /// Roll, pitch, yaw.
        angles: [f64; 3] = be("angles", 0, FieldType::Int16, 3, ANGLE, "deg"),
        rate: [f64; 3] = be("rate", 6, FieldType::Int16, 3, RATE, "deg/s"),
        accel: [f64; 3] = be("accel", 12, FieldType::Int16, 3, ACCEL, "m/s^2"),
        mag: [f64; 3] = be("mag", 18, FieldType::Int16, 3, MAG, "Gauss"),
        temperature: f64 = be("temperature", 24, FieldType::Int16, 1, TEMP, "degC"),
        itow: u32 = raw("itow", 26, FieldType::UInt32),
        bit_status: u16 = raw("bit_status", 30, FieldType::UInt16),
    }
}

packet_record! {
    /// Attitude solution without magnetometer.
    pub struct A2Record for A2 {
        angles: [f64; 3] = be("angles", 0, FieldType::Int16, 3, ANGLE, "deg"),
        rate: [f64; 3] = be("rate", 6, FieldType::Int16, 3, RATE, "deg/s"),
        accel: [f64; 3] = be("accel", 12, FieldType::Int16, 3, ACCEL, "m/s^2"),
        temperature: [f64; 3] = be("temperature", 18, FieldType::Int16, 3, TEMP, "degC"),
        itow: u32 = raw("itow", 24, FieldType::UInt32),
        bit_status: u16 = raw("bit_status", 28, FieldType::UInt16),
    }
}

packet_record! {
    /// Vehicle dynamics packet with steering channel.
    pub struct E3Record for E3 {
        counter: u32 = raw("counter", 0, FieldType::UInt32),
        angles: [f64; 3] = be("angles", 4, FieldType::Int16, 3, ANGLE, "deg"),
        steering_angle: f64 = be("steering_angle", 10, FieldType::Int16, 1, ANGLE, "deg"),
        accel: [f64; 3] = be("accel", 12, FieldType::Int16, 3, ACCEL_G, "g"),
        rate: [f64; 3] = be("rate", 18, FieldType::Int16, 3, RATE, "deg/s"),
        steering_rate: f64 = be("steering_rate", 24, FieldType::Int16, 1, RATE, "deg/s"),
        vehicle_speed: f64 = be("vehicle_speed", 26, FieldType::Int16, 1, SPEED, "m/s"),
        ins_state: u16 = raw("ins_state", 28, FieldType::UInt16),
        dg_state: u16 = raw("dg_state", 30, FieldType::UInt16),
    }
}

packet_record! {
    /// Steering-only packet. Payload bytes 10..18 are reserved.
    pub struct SARecord for SA {
        counter: u32 = raw("counter", 0, FieldType::UInt32),
        steering_angle: f64 = be("steering_angle", 4, FieldType::Int16, 1, ANGLE, "deg"),
        steering_rate: f64 = be("steering_rate", 6, FieldType::Int16, 1, RATE, "deg/s"),
        algorithm_state: u16 = raw("algorithm_state", 8, FieldType::UInt16),
    }
}

packet_record! {
    /// Motion and GNSS status packet. Payload bytes 24..28 are reserved.
    pub struct MGRecord for MG {
        counter: u32 = raw("counter", 0, FieldType::UInt32),
        accel: [f64; 3] = be("accel", 4, FieldType::Int16, 3, ACCEL_G, "g"),
        rate: [f64; 3] = be("rate", 10, FieldType::Int16, 3, RATE, "deg/s"),
        gnss_itow: u32 = raw("gnss_itow", 16, FieldType::UInt32),
        ground_speed: f64 = be("ground_speed", 20, FieldType::Int16, 1, SPEED, "m/s"),
        gnss_updated: i8 = raw("gnss_updated", 22, FieldType::Int8),
        gnss_fix_type: i8 = raw("gnss_fix_type", 23, FieldType::Int8),
    }
}

packet_record! {
    /// Factory raw counts: four sensor chips of seven channels each.
    pub struct FMRecord for FM {
        counts: [i32; 28] = be("counts", 0, FieldType::Int32, 28, Scale::Identity, "counts"),
        sensor_subset: u16 = raw("sensor_subset", 112, FieldType::UInt16),
        sample_index: u16 = raw("sample_index", 114, FieldType::UInt16),
    }
}

/// Raw counts of one sensor chip inside an [`FMRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipCounts {
    pub accel: [i32; 3],
    pub rate: [i32; 3],
    pub temperature: i32,
}

impl FMRecord {
    /// Number of sensor chips carried per frame.
    pub const CHIPS: usize = 4;

    /// Counts of chip `index` (0..4), or `None` when out of range.
    pub fn chip(&self, index: usize) -> Option<ChipCounts> {
        if index >= Self::CHIPS {
            return None;
        }
        let c = &self.counts[index * 7..index * 7 + 7];
        Some(ChipCounts {
            accel: [c[0], c[1], c[2]],
            rate: [c[3], c[4], c[5]],
            temperature: c[6],
        })
    }
}
