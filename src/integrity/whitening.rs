/// Remove (or apply) PN9 data whitening in place.
///
/// The key stream comes from the 9-bit LFSR x^9 + x^5 + 1 seeded with `0x1ff`, as
/// used by CCITT/IBM whitening in common sub-GHz transceivers. Each byte is XORed
/// with the low 8 bits of the register before it advances 8 steps.
pub fn pn9_whitening(buffer: &mut [u8]) {
    let mut lfsr: u16 = 0x1ff;
    for b in buffer {
        *b ^= (lfsr & 0xff) as u8;
        for _ in 0..8 {
            let feedback = (lfsr ^ (lfsr >> 5)) & 1;
            lfsr = (lfsr >> 1) | (feedback << 8);
        }
    }
}
