//! Bit and field level helpers used while decoding payloads.

/// A UART frame with a bad start or stop bit.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("malformed UART frame {frame}, {decoded} bytes decoded")]
pub struct UartError {
    /// Index of the first malformed frame.
    pub frame: usize,
    /// Number of bytes written to the destination before the malformed frame.
    pub decoded: usize,
}

/// Reverse the bit order of a byte.
#[must_use]
pub fn reverse8(x: u8) -> u8 {
    x.reverse_bits()
}

/// Reverse the bit order of each nibble of a byte, keeping the nibbles in place.
#[must_use]
pub fn reflect4(x: u8) -> u8 {
    let x = ((x & 0xcc) >> 2) | ((x & 0x33) << 2);
    ((x & 0xaa) >> 1) | ((x & 0x55) << 1)
}

/// Reverse the bit order of every byte in place.
pub fn reflect_bytes(message: &mut [u8]) {
    for b in message {
        *b = b.reverse_bits();
    }
}

/// Reverse the bit order of every nibble in place.
pub fn reflect_nibbles(message: &mut [u8]) {
    for b in message {
        *b = reflect4(*b);
    }
}

fn bit_at(message: &[u8], idx: usize) -> u8 {
    message
        .get(idx / 8)
        .map_or(0, |b| (b >> (7 - idx % 8)) & 1)
}

/// Decode UART "8n1" frames, a 0 start bit, 8 data bits LSB-first and a 1 stop
/// bit, from `num_bits` bits of `message` starting at bit `offset_bits`.
///
/// Trailing bits that do not form a complete 10-bit frame are ignored. At most
/// `dst.len()` bytes are decoded. Returns the number of bytes written to `dst`, or
/// a [UartError] naming the first frame with a bad start or stop bit; bytes of the
/// frames before it have already been written.
pub fn extract_bytes_uart(
    message: &[u8],
    offset_bits: usize,
    num_bits: usize,
    dst: &mut [u8],
) -> Result<usize, UartError> {
    let frames = (num_bits / 10).min(dst.len());
    for frame in 0..frames {
        let pos = offset_bits + frame * 10;
        let start = bit_at(message, pos);
        let stop = bit_at(message, pos + 9);
        if start != 0 || stop != 1 {
            return Err(UartError {
                frame,
                decoded: frame,
            });
        }
        dst[frame] = (0..8).fold(0u8, |acc, i| acc | (bit_at(message, pos + 1 + i) << i));
    }
    Ok(frames)
}

/// Remove bit stuffing of the form 4 data bits followed by a 1, writing one nibble
/// per `dst` byte. Stops at the first group whose stuffing bit is 0, or when `dst`
/// is full. Returns the number of nibbles written.
pub fn extract_nibbles_4b1s(
    message: &[u8],
    offset_bits: usize,
    num_bits: usize,
    dst: &mut [u8],
) -> usize {
    let groups = (num_bits / 5).min(dst.len());
    for group in 0..groups {
        let pos = offset_bits + group * 5;
        if bit_at(message, pos + 4) != 1 {
            return group;
        }
        dst[group] = (0..4).fold(0u8, |acc, i| (acc << 1) | bit_at(message, pos + i));
    }
    groups
}

/// Sign extend the low `bits` bits of `value` as a two's-complement number.
///
/// # Panics
/// If `bits` is 0 or greater than 32.
#[must_use]
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    assert!((1..=32).contains(&bits), "invalid field width {bits}");
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Decode a byte of two BCD digits, or `None` if either nibble is not a digit.
#[must_use]
pub fn bcd_decode8(byte: u8) -> Option<u8> {
    let (hi, lo) = (byte >> 4, byte & 0x0f);
    (hi <= 9 && lo <= 9).then_some(hi * 10 + lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflections() {
        assert_eq!(reverse8(0x01), 0x80);
        assert_eq!(reverse8(0xe4), 0x27);
        assert_eq!(reflect4(0x12), 0x84);
        assert_eq!(reflect4(0xe4), 0x72);

        let mut b = [0xe4, 0x4b];
        reflect_bytes(&mut b);
        assert_eq!(b, [0x27, 0xd2]);
        reflect_nibbles(&mut b);
        assert_eq!(b, [0x4e, 0xb4]);
    }

    // start bit, 8 data bits LSB-first, stop bit
    fn uart_frame(byte: u8, stop: u8) -> Vec<u8> {
        let mut bits = vec![0];
        bits.extend((0..8).map(|i| (byte >> i) & 1));
        bits.push(stop);
        bits
    }

    fn pack(bits: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            out[i / 8] |= bit << (7 - i % 8);
        }
        out
    }

    #[test]
    fn uart_decodes_frames_at_offset() {
        let mut bits = vec![1, 1, 1];
        bits.extend(uart_frame(0x55, 1));
        bits.extend(uart_frame(0xa3, 1));
        bits.extend([0, 1]);
        let msg = pack(&bits);

        let mut dst = [0u8; 4];
        assert_eq!(extract_bytes_uart(&msg, 3, bits.len() - 3, &mut dst), Ok(2));
        assert_eq!(&dst[..2], &[0x55, 0xa3]);
    }

    #[test]
    fn uart_reports_bad_stop_bit() {
        let mut bits = uart_frame(0x12, 1);
        bits.extend(uart_frame(0x34, 0));
        bits.extend(uart_frame(0x56, 1));
        let msg = pack(&bits);

        let mut dst = [0u8; 3];
        let err = extract_bytes_uart(&msg, 0, bits.len(), &mut dst).unwrap_err();
        assert_eq!(err, UartError { frame: 1, decoded: 1 });
        assert_eq!(dst[0], 0x12);
    }

    #[test]
    fn uart_reports_bad_start_bit() {
        let mut bits = uart_frame(0x12, 1);
        bits[0] = 1;
        let msg = pack(&bits);
        let mut dst = [0u8; 1];
        assert_eq!(
            extract_bytes_uart(&msg, 0, bits.len(), &mut dst),
            Err(UartError { frame: 0, decoded: 0 })
        );
    }

    #[test]
    fn nibbles_4b1s() {
        // 1010 1, 0011 1, 1111 0
        let msg = pack(&[1, 0, 1, 0, 1, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0]);
        let mut dst = [0u8; 3];
        assert_eq!(extract_nibbles_4b1s(&msg, 0, 15, &mut dst), 2);
        assert_eq!(&dst[..2], &[0x0a, 0x03]);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x7ff, 12), 2047);
        assert_eq!(sign_extend(0x800, 12), -2048);
        assert_eq!(sign_extend(0xfff, 12), -1);
        assert_eq!(sign_extend(0x1, 1), -1);
        assert_eq!(sign_extend(0xffff_ffff, 32), -1);
    }

    #[test]
    fn bcd() {
        assert_eq!(bcd_decode8(0x42), Some(42));
        assert_eq!(bcd_decode8(0x99), Some(99));
        assert_eq!(bcd_decode8(0x4a), None);
        assert_eq!(bcd_decode8(0xa0), None);
    }
}
