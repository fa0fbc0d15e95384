//! Keyed digests computed with a rolling LFSR ("LFSR-based Toeplitz hash").
//!
//! For every message bit that is set the current key is XORed into the sum, then
//! the key is advanced one step through the generator. Any final XOR mask is a
//! protocol constant applied by the caller.

/// 8-bit digest, bytes first to last, bits MSB to LSB, key rolled right.
///
/// `gen` must include the MSB if the LFSR is rolling.
#[must_use]
pub fn lfsr_digest8(message: &[u8], gen: u8, key: u8) -> u8 {
    digest8_ror(message.iter().copied(), gen, key)
}

/// 8-bit digest over the bytes in reverse order, bits MSB to LSB, key rolled right.
#[must_use]
pub fn lfsr_digest8_reverse(message: &[u8], gen: u8, key: u8) -> u8 {
    digest8_ror(message.iter().rev().copied(), gen, key)
}

fn digest8_ror(bytes: impl Iterator<Item = u8>, gen: u8, mut key: u8) -> u8 {
    let mut sum = 0;
    for data in bytes {
        for i in (0..8).rev() {
            if (data >> i) & 1 == 1 {
                sum ^= key;
            }
            key = if key & 1 == 1 { (key >> 1) ^ gen } else { key >> 1 };
        }
    }
    sum
}

/// 8-bit digest over the bytes in reverse order, bits reflected (LSB to MSB), key
/// rolled left.
///
/// `gen` must include the LSB if the LFSR is rolling.
#[must_use]
pub fn lfsr_digest8_reflect(message: &[u8], gen: u8, mut key: u8) -> u8 {
    let mut sum = 0;
    for data in message.iter().rev() {
        for i in 0..8 {
            if (data >> i) & 1 == 1 {
                sum ^= key;
            }
            key = if key & 0x80 != 0 { (key << 1) ^ gen } else { key << 1 };
        }
    }
    sum
}

/// 16-bit digest, bytes first to last, bits MSB to LSB, key rolled right.
#[must_use]
pub fn lfsr_digest16(message: &[u8], gen: u16, mut key: u16) -> u16 {
    let mut sum = 0;
    for data in message {
        for i in (0..8).rev() {
            if (data >> i) & 1 == 1 {
                sum ^= key;
            }
            key = if key & 1 == 1 { (key >> 1) ^ gen } else { key >> 1 };
        }
    }
    sum
}
