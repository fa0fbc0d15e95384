use tracing::debug;

use crate::{
    bitbuffer::BitBuffer,
    decoder::{DecodeError, DecodeOutcome, Decoder, Modulation, Protocol},
    integrity::Mic,
    record::Record,
};

const MODEL: &str = "Bresser-3CH";

/// Bresser Thermo-/Hygro-Sensor 3CH.
///
/// The sensor repeats a 40 bit message 15 times, each preceded by 4 sync pulses
/// that land in rows of their own. Bits are sent inverted.
///
/// ```text
/// [id] [id] [flags] [temp] [temp] [temp] [humi] [humi] [chk] [chk]
/// ```
///
/// - flags: battery low, test button, 2 bit channel (1 to 3)
/// - temp: 12 bit Fahrenheit, offset 90, scale 10
/// - chk: sum of the first 4 bytes
pub struct Bresser3ch {
    protocol: Protocol,
}

impl Bresser3ch {
    #[must_use]
    pub fn new() -> Self {
        Bresser3ch {
            protocol: Protocol::builder()
                .name(MODEL)
                .modulation(Modulation::OokPwm)
                .short_width(250.0)
                .long_width(500.0)
                .reset_limit(1200.0)
                .fields(&[
                    "model",
                    "id",
                    "channel",
                    "battery_ok",
                    "test",
                    "temperature_F",
                    "humidity",
                    "mic",
                ])
                .build(),
        }
    }
}

impl Default for Bresser3ch {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Bresser3ch {
    fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    fn decode(&self, bits: &BitBuffer) -> DecodeOutcome {
        let row = bits
            .find_repeated_row(3, 40)
            .ok_or(DecodeError::AbortEarly)?;
        if bits.bits_per_row(row) > 41 {
            return Err(DecodeError::AbortLength);
        }

        let mut b = [0u8; 5];
        bits.extract_bytes(row, 0, &mut b, 40);
        for x in &mut b {
            *x = !*x;
        }

        let sum = b[..4].iter().fold(0u8, |acc, &x| acc.wrapping_add(x));
        if sum != b[4] {
            debug!(expected = b[4], actual = sum, "checksum mismatch");
            return Err(DecodeError::FailMic);
        }

        let id = b[0];
        let battery_low = (b[1] & 0x80) != 0;
        let test = (b[1] & 0x40) >> 6;
        let channel = (b[1] & 0x30) >> 4;
        let temp_raw = (i32::from(b[1] & 0x0f) << 8) + i32::from(b[2]);
        let temp_f = f64::from(temp_raw - 900) / 10.0;
        let humidity = b[3];

        // channel 0 is not selectable on the device
        if channel == 0 || humidity > 100 || !(-20.0..=160.0).contains(&temp_f) {
            debug!(channel, humidity, temp_f, "implausible values");
            return Err(DecodeError::FailSanity);
        }

        Ok(Record::new(MODEL)
            .with("id", id)
            .with("channel", channel)
            .with("battery_ok", !battery_low)
            .with("test", test)
            .with("temperature_F", temp_f)
            .with("humidity", humidity)
            .with(Record::MIC, Mic::Checksum))
    }
}
