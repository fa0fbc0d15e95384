//! Bitwise CRCs parameterized by polynomial and initial register value.
//!
//! The MSB-first variants take the polynomial without its implicit top bit, e.g.,
//! `0x31` for x^8 + x^5 + x^4 + 1. The LSB-first variants expect the polynomial and
//! init already reflected. No final XOR is applied.

/// CRC-4, MSB-first.
#[must_use]
pub fn crc4(message: &[u8], polynomial: u8, init: u8) -> u8 {
    // work in the top nibble of a byte register
    let poly = polynomial << 4;
    let mut rem = init << 4;
    for b in message {
        rem ^= b;
        for _ in 0..8 {
            rem = if rem & 0x80 != 0 { (rem << 1) ^ poly } else { rem << 1 };
        }
    }
    rem >> 4
}

/// CRC-7, MSB-first.
#[must_use]
pub fn crc7(message: &[u8], polynomial: u8, init: u8) -> u8 {
    let poly = polynomial << 1;
    let mut rem = init << 1;
    for b in message {
        rem ^= b;
        for _ in 0..8 {
            rem = if rem & 0x80 != 0 { (rem << 1) ^ poly } else { rem << 1 };
        }
    }
    rem >> 1
}

/// CRC-8, MSB-first.
///
/// A message that includes its own trailing CRC byte yields zero when `init` is 0.
#[must_use]
pub fn crc8(message: &[u8], polynomial: u8, init: u8) -> u8 {
    let mut rem = init;
    for b in message {
        rem ^= b;
        for _ in 0..8 {
            rem = if rem & 0x80 != 0 {
                (rem << 1) ^ polynomial
            } else {
                rem << 1
            };
        }
    }
    rem
}

/// CRC-8 with input and output reflected, i.e., the least significant bit of each
/// byte is shifted in first. `polynomial` and `init` are given unreflected.
#[must_use]
pub fn crc8le(message: &[u8], polynomial: u8, init: u8) -> u8 {
    let mut crc = init;
    for b in message {
        for i in 0..8 {
            let feedback = (crc & 0x80 != 0) ^ ((b >> i) & 1 == 1);
            crc <<= 1;
            if feedback {
                crc ^= polynomial;
            }
        }
    }
    crc.reverse_bits()
}

/// CRC-16, MSB-first.
#[must_use]
pub fn crc16(message: &[u8], polynomial: u16, init: u16) -> u16 {
    let mut rem = init;
    for b in message {
        rem ^= u16::from(*b) << 8;
        for _ in 0..8 {
            rem = if rem & 0x8000 != 0 {
                (rem << 1) ^ polynomial
            } else {
                rem << 1
            };
        }
    }
    rem
}

/// CRC-16, LSB-first. `polynomial` and `init` must already be reflected, e.g.,
/// `0x8408` for the CCITT polynomial `0x1021`.
#[must_use]
pub fn crc16lsb(message: &[u8], polynomial: u16, init: u16) -> u16 {
    let mut rem = init;
    for b in message {
        rem ^= u16::from(*b);
        for _ in 0..8 {
            rem = if rem & 1 != 0 {
                (rem >> 1) ^ polynomial
            } else {
                rem >> 1
            };
        }
    }
    rem
}
