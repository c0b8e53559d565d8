//! Little-endian packets of the OpenIMU/INS firmware.
//!
//! These payloads are packed C structs, so floats arrive already in
//! physical units and no scaling is applied.

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

const fn vec3(name: &'static str, offset: usize, units: &'static str) -> FieldSpec {
    le(name, offset, FieldType::Float32, 3, units)
}

packet_record! {
    /// Raw-rate sensor packet.
    pub struct OpenZ1Record for OpenZ1 {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        accel: [f32; 3] = vec3("accel", 4, "m/s^2"),
        rate: [f32; 3] = vec3("rate", 16, "deg/s"),
        mag: [f32; 3] = vec3("mag", 28, "Gauss"),
    }
}

packet_record! {
    /// Scaled sensor packet with a 64-bit timestamp.
    pub struct OpenS1Record for OpenS1 {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        timestamp: u64 = le("timestamp", 4, FieldType::UInt64, 1, "us"),
        accel: [f32; 3] = vec3("accel", 12, "g"),
        rate: [f32; 3] = vec3("rate", 24, "deg/s"),
        mag: [f32; 3] = vec3("mag", 36, "Gauss"),
        temperature: f32 = le("temperature", 48, FieldType::Float32, 1, "degC"),
    }
}

packet_record! {
    /// Attitude packet.
    pub struct OpenA2Record for OpenA2 {
        itow: u32 = le("itow", 0, FieldType::UInt32, 1, "ms"),
        time: f64 = le("time", 4, FieldType::Float64, 1, "s"),
        /// Yaw, pitch, roll.
        ypr: [f32; 3] = vec3("ypr", 12, "deg"),
        rate: [f32; 3] = vec3("rate", 24, "deg/s"),
        accel: [f32; 3] = vec3("accel", 36, "m/s^2"),
    }
}

packet_record! {
    /// Euler attitude with rate bias and algorithm switches.
    pub struct OpenE1Record for OpenE1 {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        time: f64 = le("time", 4, FieldType::Float64, 1, "s"),
        euler: [f32; 3] = vec3("euler", 12, "deg"),
        accel: [f32; 3] = vec3("accel", 24, "g"),
        rate: [f32; 3] = vec3("rate", 36, "deg/s"),
        rate_bias: [f32; 3] = vec3("rate_bias", 48, "deg/s"),
        mag: [f32; 3] = vec3("mag", 60, "Gauss"),
        op_mode: u8 = le("op_mode", 72, FieldType::UInt8, 1, ""),
        lin_accel_switch: u8 = le("lin_accel_switch", 73, FieldType::UInt8, 1, ""),
        turn_switch: u8 = le("turn_switch", 74, FieldType::UInt8, 1, ""),
    }
}

packet_record! {
    /// Full INS solution: attitude, velocity and position.
    pub struct OpenE2Record for OpenE2 {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        time: f64 = le("time", 4, FieldType::Float64, 1, "s"),
        euler: [f32; 3] = vec3("euler", 12, "deg"),
        accel: [f32; 3] = vec3("accel", 24, "g"),
        accel_bias: [f32; 3] = vec3("accel_bias", 36, "g"),
        rate: [f32; 3] = vec3("rate", 48, "deg/s"),
        rate_bias: [f32; 3] = vec3("rate_bias", 60, "deg/s"),
        velocity: [f32; 3] = vec3("velocity", 72, "m/s"),
        mag: [f32; 3] = vec3("mag", 84, "Gauss"),
        /// Latitude, longitude (deg) and altitude (m).
        lla: [f64; 3] = le("lla", 96, FieldType::Float64, 3, "deg,deg,m"),
        op_mode: u8 = le("op_mode", 120, FieldType::UInt8, 1, ""),
        lin_accel_switch: u8 = le("lin_accel_switch", 121, FieldType::UInt8, 1, ""),
        turn_switch: u8 = le("turn_switch", 122, FieldType::UInt8, 1, ""),
    }
}

packet_record! {
    /// INS solution alongside the raw GNSS fix it was blended with.
    pub struct OpenIdRecord for OpenId {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        gps_heading: f32 = le("gps_heading", 4, FieldType::Float32, 1, "deg"),
        gps_itow: u32 = le("gps_itow", 8, FieldType::UInt32, 1, "ms"),
        euler: [f32; 3] = vec3("euler", 12, "deg"),
        accel: [f32; 3] = vec3("accel", 24, "g"),
        accel_bias: [f32; 3] = vec3("accel_bias", 36, "g"),
        rate: [f32; 3] = vec3("rate", 48, "deg/s"),
        rate_bias: [f32; 3] = vec3("rate_bias", 60, "deg/s"),
        velocity: [f32; 3] = vec3("velocity", 72, "m/s"),
        gps_velocity: [f32; 3] = vec3("gps_velocity", 84, "m/s"),
        lla: [f64; 3] = le("lla", 96, FieldType::Float64, 3, "deg,deg,m"),
        gps_lla: [f64; 3] = le("gps_lla", 120, FieldType::Float64, 3, "deg,deg,m"),
        op_mode: u8 = le("op_mode", 144, FieldType::UInt8, 1, ""),
        lin_accel_switch: u8 = le("lin_accel_switch", 145, FieldType::UInt8, 1, ""),
        turn_switch: u8 = le("turn_switch", 146, FieldType::UInt8, 1, ""),
    }
}

packet_record! {
    /// Dual-IMU packet: master and slave sensor readings plus GNSS status.
    pub struct OpenSdRecord for OpenSd {
        timer: u32 = le("timer", 0, FieldType::UInt32, 1, "ms"),
        master_rate: [f32; 3] = vec3("master_rate", 4, "deg/s"),
        master_accel: [f32; 3] = vec3("master_accel", 16, "g"),
        slave_rate: [f32; 3] = vec3("slave_rate", 28, "deg/s"),
        ground_speed: f32 = le("ground_speed", 40, FieldType::Float32, 1, "m/s"),
        gnss_updated: i8 = le("gnss_updated", 44, FieldType::Int8, 1, ""),
        gnss_fix_type: i8 = le("gnss_fix_type", 45, FieldType::Int8, 1, ""),
        gnss_itow: u32 = le("gnss_itow", 46, FieldType::UInt32, 1, "ms"),
    }
}
