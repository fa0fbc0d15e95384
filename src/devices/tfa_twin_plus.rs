use tracing::debug;

use crate::{
    bitbuffer::BitBuffer,
    bits::reflect_bytes,
    decoder::{DecodeError, DecodeOutcome, Decoder, Modulation, Protocol},
    integrity::{add_nibbles, Mic},
    record::Record,
};

const MODEL: &str = "TFA-TwinPlus";
const ROW_BITS: usize = 36;

/// TFA Twin Plus 30.3049 temperature/humidity sensor, also Ea2 BL999.
///
/// 36 bits, every field sent LSB-first:
///
/// ```text
/// IIIICCII B???TTTT TTTTTSSS HHHHHHH1 XXXX
/// ```
///
/// - I: 6 bit sensor id, changes on battery change
/// - C: channel
/// - B: battery low
/// - T: 9 bit temperature, 0.1 C
/// - S: sign, all set for negative temperatures which are `-(512 - T)`
/// - H: humidity plus 28
/// - X: sum of the first 8 nibbles (after bit reflection), modulo 16
///
/// For example `{36}e44b707300` is channel 1, 23.7 C and 50 %.
pub struct TfaTwinPlus {
    protocol: Protocol,
}

impl TfaTwinPlus {
    #[must_use]
    pub fn new() -> Self {
        TfaTwinPlus {
            protocol: Protocol::builder()
                .name(MODEL)
                .modulation(Modulation::OokPpm)
                .short_width(2000.0)
                .long_width(4000.0)
                .gap_limit(7000.0)
                .reset_limit(8000.0)
                .fields(&[
                    "model",
                    "id",
                    "channel",
                    "battery_ok",
                    "temperature_C",
                    "humidity",
                    "mic",
                ])
                .build(),
        }
    }

    fn decode_row(bits: &BitBuffer, row: usize) -> DecodeOutcome {
        let mut b = [0u8; 5];
        bits.extract_bytes(row, 0, &mut b, ROW_BITS);
        if b.iter().all(|&x| x == 0) {
            return Err(DecodeError::FailSanity);
        }

        let mut rb = b;
        reflect_bytes(&mut rb);
        let sum = add_nibbles(&rb[..4]) & 0x0f;
        // only the first nibble of the last byte is sent
        let checksum = u32::from(rb[4] & 0x0f);
        if sum != checksum {
            debug!(row, expected = checksum, actual = sum, "checksum mismatch");
            return Err(DecodeError::FailMic);
        }

        let negative = b[2] & 0x07 != 0;
        let temp_raw = (i32::from(rb[2] & 0x1f) << 4) | i32::from(rb[1] >> 4);
        let temp_raw = if negative { temp_raw - 512 } else { temp_raw };
        let humidity = i32::from(rb[3] & 0x7f) - 28;
        let id = (rb[0] & 0x0f) | ((rb[0] & 0xc0) >> 2);
        let battery_low = b[1] >> 7;
        let channel = (b[0] >> 2) & 0x03;

        Ok(Record::new(MODEL)
            .with("id", id)
            .with("channel", channel)
            .with("battery_ok", battery_low == 0)
            .with("temperature_C", f64::from(temp_raw) / 10.0)
            .with("humidity", humidity)
            .with(Record::MIC, Mic::Checksum))
    }
}

impl Default for TfaTwinPlus {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TfaTwinPlus {
    fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Decodes the first valid 36 bit row.
    fn decode(&self, bits: &BitBuffer) -> DecodeOutcome {
        let mut first_err = None;
        for row in (0..bits.num_rows()).filter(|&r| bits.bits_per_row(r) == ROW_BITS) {
            match Self::decode_row(bits, row) {
                Ok(record) => return Ok(record),
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        Err(first_err.unwrap_or(DecodeError::AbortLength))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> DecodeOutcome {
        TfaTwinPlus::new().decode(&s.parse().unwrap())
    }

    #[test]
    fn documented_example() {
        let rec = decode("{36}e44b707300").unwrap();
        assert_eq!(rec.get("id").unwrap().as_i64(), Some(7));
        assert_eq!(rec.get("channel").unwrap().as_i64(), Some(1));
        assert_eq!(rec.get("battery_ok").unwrap().as_i64(), Some(1));
        assert_eq!(rec.get("temperature_C").unwrap().as_f64(), Some(23.7));
        assert_eq!(rec.get("humidity").unwrap().as_i64(), Some(50));
        assert_eq!(rec.mic(), Some("CHECKSUM"));
        assert!(TfaTwinPlus::new().protocol().conforms(&rec));
    }

    #[test]
    fn negative_temperature() {
        let rec = decode("{36}e44c1f73f0").unwrap();
        assert_eq!(rec.get("temperature_C").unwrap().as_f64(), Some(-12.5));
    }

    #[test]
    fn battery_low_and_sign_bits() {
        let rec = decode("{36}da9d0fc254").unwrap();
        assert_eq!(rec.get("id").unwrap().as_i64(), Some(27));
        assert_eq!(rec.get("channel").unwrap().as_i64(), Some(2));
        assert_eq!(rec.get("battery_ok").unwrap().as_i64(), Some(0));
        assert_eq!(rec.get("temperature_C").unwrap().as_f64(), Some(-24.5));
        assert_eq!(rec.get("humidity").unwrap().as_i64(), Some(39));
    }

    #[test]
    fn skips_rows_of_other_lengths() {
        let rec = decode("{12}fff/{36}e44b707300").unwrap();
        assert_eq!(rec.get("humidity").unwrap().as_i64(), Some(50));
    }

    #[test]
    fn failures() {
        assert_eq!(decode("{35}e44b707300"), Err(DecodeError::AbortLength));
        assert_eq!(decode("{36}0000000000"), Err(DecodeError::FailSanity));
        assert_eq!(decode("{36}e44b707310"), Err(DecodeError::FailMic));
    }
}
