//! Packet type identifiers

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TelemetryError;

/// Every packet type the catalog knows how to frame and decode.
///
/// The upper-case group and `FM` are the big-endian field-by-field packets of
/// the IMU38x line. The `Open*` group are the little-endian struct-packed
/// packets of the OpenIMU/INS firmware (wire tags `z1`, `s1`, `a2`, ...).
/// `Nav` is the navigation packet of the INS1000 reference unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PacketType {
    A1,
    A2,
    S0,
    S1,
    SH,
    E3,
    SA,
    MG,
    OpenZ1,
    OpenS1,
    OpenA2,
    OpenE1,
    OpenE2,
    OpenId,
    OpenSd,
    FM,
    Nav,
}

impl PacketType {
    /// All packet types in catalog order.
    pub const ALL: [PacketType; 17] = [
        PacketType::A1,
        PacketType::A2,
        PacketType::S0,
        PacketType::S1,
        PacketType::SH,
        PacketType::E3,
        PacketType::SA,
        PacketType::MG,
        PacketType::OpenZ1,
        PacketType::OpenS1,
        PacketType::OpenA2,
        PacketType::OpenE1,
        PacketType::OpenE2,
        PacketType::OpenId,
        PacketType::OpenSd,
        PacketType::FM,
        PacketType::Nav,
    ];

    /// Configuration tag of this packet type (the ASCII marker for the
    /// short-preamble family).
    pub const fn tag(self) -> &'static str {
        match self {
            PacketType::A1 => "A1",
            PacketType::A2 => "A2",
            PacketType::S0 => "S0",
            PacketType::S1 => "S1",
            PacketType::SH => "SH",
            PacketType::E3 => "E3",
            PacketType::SA => "SA",
            PacketType::MG => "MG",
            PacketType::OpenZ1 => "z1",
            PacketType::OpenS1 => "s1",
            PacketType::OpenA2 => "a2",
            PacketType::OpenE1 => "e1",
            PacketType::OpenE2 => "e2",
            PacketType::OpenId => "id",
            PacketType::OpenSd => "sd",
            PacketType::FM => "FM",
            PacketType::Nav => "nav",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PacketType {
    type Err = TelemetryError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        PacketType::ALL
            .iter()
            .copied()
            .find(|packet| packet.tag() == tag)
            .ok_or_else(|| TelemetryError::unsupported_packet_type(tag))
    }
}

impl Serialize for PacketType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for PacketType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
