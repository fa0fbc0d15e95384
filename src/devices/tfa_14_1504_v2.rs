use tracing::debug;

use crate::{
    bitbuffer::BitBuffer,
    decoder::{DecodeError, DecodeOutcome, Decoder, Modulation, Protocol},
    integrity::{lfsr_digest16, Mic},
    record::Record,
};

const MODEL: &str = "TFA-141504v2";
const PREAMBLE: [u8; 3] = [0xaa, 0xaa, 0x5c];
const PREAMBLE_BITS: usize = 24;
const DATA_BYTES: usize = 5;
const DATA_BITS: usize = DATA_BYTES * 8;
const TOTAL_BITS: usize = PREAMBLE_BITS + DATA_BITS;
const MAX_BITS: usize = TOTAL_BITS + 12;
/// Raw temperature reported when no probe is plugged in.
const NO_PROBE: u16 = 0x1c0;

/// TFA Dostmann 14.1504.V2 (30.3254.01) grill and meat thermometer.
///
/// Not to be confused with the 14.1504 (30.3201), which uses an unrelated protocol.
///
/// After the `{36}7aaaaaa5c` preamble, of which only the `{24}aaaa5c` tail is used:
///
/// - flags {4}: 0x2 battery ok, 0x5 resync button
/// - temperature {12}: `value / 4 - 532` C
/// - separator {8}: 0xff
/// - digest {16}: LFSR digest, gen 0x8810 key 0x0d42, final XOR 0x16eb
///
/// For example `28a0ffce69` is 20 C.
pub struct Tfa141504v2 {
    protocol: Protocol,
}

impl Tfa141504v2 {
    #[must_use]
    pub fn new() -> Self {
        Tfa141504v2 {
            protocol: Protocol::builder()
                .name(MODEL)
                .modulation(Modulation::FskPcm)
                .short_width(360.0)
                .long_width(360.0)
                .reset_limit(4096.0)
                .fields(&["model", "battery_ok", "probe_fail", "temperature_C", "mic"])
                .build(),
        }
    }
}

impl Default for Tfa141504v2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Tfa141504v2 {
    fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    fn decode(&self, bits: &BitBuffer) -> DecodeOutcome {
        if bits.num_rows() != 1 {
            return Err(DecodeError::AbortEarly);
        }
        let len = bits.bits_per_row(0);
        if len < TOTAL_BITS {
            return Err(DecodeError::AbortEarly);
        }

        let start = bits.search(0, 0, &PREAMBLE, PREAMBLE_BITS);
        let available = len - start;
        if available < PREAMBLE_BITS {
            return Err(DecodeError::AbortEarly);
        }
        if !(TOTAL_BITS..=MAX_BITS).contains(&available) {
            return Err(DecodeError::AbortLength);
        }

        let mut data = [0u8; DATA_BYTES];
        bits.extract_bytes(0, start + PREAMBLE_BITS, &mut data, DATA_BITS);

        let calc = lfsr_digest16(&data[..3], 0x8810, 0x0d42) ^ 0x16eb;
        let expected = u16::from_be_bytes([data[3], data[4]]);
        if calc != expected {
            debug!(expected, actual = calc, "digest mismatch");
            return Err(DecodeError::FailMic);
        }

        let flags = data[0] >> 4;
        if flags & 0x5 == 0x5 {
            debug!(flags, "resync message");
            return Err(DecodeError::FailSanity);
        }
        if data[2] != 0xff {
            debug!(separator = data[2], "bad separator");
            return Err(DecodeError::FailSanity);
        }
        let battery_ok = flags & 0x2 != 0;

        // the 2 LSBs are always zero
        let temp_raw = (u16::from(data[0] & 0x0f) << 6) + u16::from(data[1] >> 2);
        let probe_ok = temp_raw != NO_PROBE;

        Ok(Record::new(MODEL)
            .with("battery_ok", battery_ok)
            .with("probe_fail", !probe_ok)
            .with_opt(
                "temperature_C",
                probe_ok.then(|| f64::from(i32::from(temp_raw) - 532)),
            )
            .with(Record::MIC, Mic::Digest))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn decode(payload: &str) -> DecodeOutcome {
        let bits: BitBuffer = format!("7aaaaaa5c{payload}").parse().unwrap();
        Tfa141504v2::new().decode(&bits)
    }

    #[test_case("28a0ffce69", 20.0; "20 C")]
    #[test_case("28a4ffa0f5", 21.0; "21 C")]
    #[test_case("28b0ff6438", 24.0; "24 C")]
    #[test_case("2900ff8c9d", 44.0; "44 C")]
    fn temperatures(payload: &str, temp: f64) {
        let rec = decode(payload).unwrap();
        assert_eq!(rec.get("temperature_C").unwrap().as_f64(), Some(temp));
        assert_eq!(rec.get("probe_fail").unwrap().as_i64(), Some(0));
        assert_eq!(rec.get("battery_ok").unwrap().as_i64(), Some(1));
        assert_eq!(rec.mic(), Some("DIGEST"));
    }

    #[test]
    fn no_probe() {
        let rec = decode("2700ffb791").unwrap();
        assert_eq!(rec.get("probe_fail").unwrap().as_i64(), Some(1));
        assert!(rec.get("temperature_C").is_none());
        assert!(Tfa141504v2::new().protocol().conforms(&rec));
    }

    #[test_case("28a0ffce68", DecodeError::FailMic; "bad digest")]
    #[test_case("7052f9cee3", DecodeError::FailMic; "resync encoding")]
    #[test_case("78a0ff8d68", DecodeError::FailSanity; "resync flags")]
    #[test_case("28a0fe8d0a", DecodeError::FailSanity; "bad separator")]
    fn failures(payload: &str, err: DecodeError) {
        assert_eq!(decode(payload), Err(err));
    }

    #[test]
    fn length_checks() {
        let tfa = Tfa141504v2::new();
        let short: BitBuffer = "aaaa5c28a0ffce".parse().unwrap();
        assert_eq!(tfa.decode(&short), Err(DecodeError::AbortEarly));

        let no_preamble: BitBuffer = "0000000028a0ffce69".parse().unwrap();
        assert_eq!(tfa.decode(&no_preamble), Err(DecodeError::AbortEarly));

        let long: BitBuffer = "aaaa5c28a0ffce69000000".parse().unwrap();
        assert_eq!(tfa.decode(&long), Err(DecodeError::AbortLength));

        let two_rows: BitBuffer = "aaaa5c28a0ffce69/aaaa5c28a0ffce69".parse().unwrap();
        assert_eq!(tfa.decode(&two_rows), Err(DecodeError::AbortEarly));
    }
}
