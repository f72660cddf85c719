//! CRC-32 checksum (IEEE 802.3)
//!
//! Reflected polynomial 0xEDB88320, initial value all ones, final XOR
//! all ones. Firmware updates advertise this checksum over the whole
//! image before any chunk is sent; the device verifies after the last
//! chunk lands.

use tracing::trace;

/// Reflected IEEE 802.3 polynomial
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table processing one input byte per step
static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Calculate the CRC-32 of a byte slice
///
/// # Examples
///
/// ```
/// use imatch_core::crc32;
///
/// assert_eq!(crc32::calculate(b"123456789"), 0xCBF4_3926);
/// ```
pub fn calculate(data: &[u8]) -> u32 {
    let mut crc = u32::MAX;

    for &byte in data {
        crc = TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }

    let crc = !crc;

    trace!(len = data.len(), crc = format!("0x{crc:08X}"), "Calculated CRC-32");

    crc
}

/// Verify a byte slice against an expected CRC-32
pub fn verify(data: &[u8], expected: u32) -> bool {
    calculate(data) == expected
}
