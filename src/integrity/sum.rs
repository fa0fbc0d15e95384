//! Additive, XOR and parity checks.

/// Sum of all bytes, unreduced. Mask with `& 0xff` for a modulo-256 checksum or
/// use [fold_carry] for an end-around carry checksum.
#[must_use]
pub fn add_bytes(message: &[u8]) -> u32 {
    message.iter().map(|&b| u32::from(b)).sum()
}

/// Sum of both nibbles of every byte, unreduced.
#[must_use]
pub fn add_nibbles(message: &[u8]) -> u32 {
    message
        .iter()
        .map(|&b| u32::from(b >> 4) + u32::from(b & 0x0f))
        .sum()
}

/// Fold carries out of the low byte back into it until the sum fits 8 bits, as
/// used by one's-complement style checksums.
#[must_use]
pub fn fold_carry(mut sum: u32) -> u8 {
    while sum > 0xff {
        sum = (sum & 0xff) + (sum >> 8);
    }
    sum as u8
}

/// XOR of all bytes, i.e., the parity of each bit position.
#[must_use]
pub fn xor_bytes(message: &[u8]) -> u8 {
    message.iter().fold(0, |acc, b| acc ^ b)
}

/// Parity of a byte: 1 for an odd number of set bits, 0 for even.
#[must_use]
pub fn parity8(byte: u8) -> u8 {
    let b = byte ^ (byte >> 4);
    ((0x6996u16 >> (b & 0x0f)) & 1) as u8
}

/// Parity over all bits of `message`.
#[must_use]
pub fn parity_bytes(message: &[u8]) -> u8 {
    parity8(xor_bytes(message))
}
