//! Frame integrity checks.

use crc::{CRC_16_SPI_FUJITSU, Crc};

use crate::catalog::ChecksumFamily;

// poly 0x1021, init 0x1D0F, no reflection, no final xor
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_SPI_FUJITSU);

/// CRC-16 of the short-preamble family.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Dual running sum of the reference unit: `A += b; B += A` modulo 256,
/// result `256 * A + B`.
pub fn running_sum(data: &[u8]) -> u16 {
    let (a, b) = data.iter().fold((0u8, 0u8), |(a, b), &byte| {
        let a = a.wrapping_add(byte);
        (a, b.wrapping_add(a))
    });
    u16::from_be_bytes([a, b])
}

impl ChecksumFamily {
    /// Compute this family's checksum over `span`.
    pub fn compute(self, span: &[u8]) -> u16 {
        match self {
            ChecksumFamily::Crc16 => crc16(span),
            ChecksumFamily::RunningSum => running_sum(span),
        }
    }
}
