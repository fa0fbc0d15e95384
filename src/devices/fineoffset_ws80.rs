use tracing::debug;

use crate::{
    bitbuffer::BitBuffer,
    decoder::{DecodeError, DecodeOutcome, Decoder, Modulation, Protocol},
    integrity::{add_bytes, crc8, Mic},
    record::Record,
};

const MODEL: &str = "Fineoffset-WS80";
/// Tail of the `aa..aa` preamble plus the `2dd4` sync word.
const PREAMBLE: [u8; 3] = [0xaa, 0x2d, 0xd4];
const FAMILY: u8 = 0x80;
const DATA_BYTES: usize = 18;
const MIN_BITS: usize = 168;
const MAX_BITS: usize = 240;

/// Fine Offset Electronics WS80 weather station, also sold by EcoWitt.
///
/// ```text
///  0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16 17
/// YY II II II LL LL BB FF TT HH WW DD GG VV UU UU AA XX
/// 80 0a 00 3b 00 00 88 8a 59 38 18 6d 1c 00 ff ff d8 df
/// ```
///
/// - Y: family code 0x80
/// - I: device id
/// - L: light, 10 lux
/// - B: battery, 20 mV
/// - F: flags and MSBs; 0x03 temperature, 0x10 wind, 0x20 bearing, 0x40 gust
/// - T: temperature, offset 40, scale 10
/// - H: humidity
/// - W, D, G: wind speed (0.1 m/s), bearing (deg), gust (0.1 m/s)
/// - V: UV index, scale 10
/// - U: unknown
/// - A: CRC-8 poly 0x31 over bytes 0 to 15
/// - X: sum of bytes 0 to 16
///
/// Fields with all bits set are not reported.
pub struct FineOffsetWs80 {
    protocol: Protocol,
}

impl FineOffsetWs80 {
    #[must_use]
    pub fn new() -> Self {
        FineOffsetWs80 {
            protocol: Protocol::builder()
                .name(MODEL)
                .modulation(Modulation::FskPcm)
                .short_width(58.0)
                .long_width(58.0)
                .reset_limit(1500.0)
                .fields(&[
                    "model",
                    "id",
                    "battery_ok",
                    "battery_mV",
                    "temperature_C",
                    "humidity",
                    "wind_dir_deg",
                    "wind_avg_m_s",
                    "wind_max_m_s",
                    "uvi",
                    "light_lux",
                    "flags",
                    "unknown",
                    "mic",
                ])
                .build(),
        }
    }
}

impl Default for FineOffsetWs80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FineOffsetWs80 {
    fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    fn decode(&self, bits: &BitBuffer) -> DecodeOutcome {
        if bits.is_empty() {
            return Err(DecodeError::AbortEarly);
        }
        let len = bits.bits_per_row(0);
        if !(MIN_BITS..=MAX_BITS).contains(&len) {
            return Err(DecodeError::AbortLength);
        }

        let start = bits.search(0, 0, &PREAMBLE, 24);
        if start >= len {
            return Err(DecodeError::AbortEarly);
        }
        let offset = start + 24;
        if offset + DATA_BYTES * 8 > len {
            debug!(offset, len, "short package");
            return Err(DecodeError::AbortLength);
        }
        let mut b = [0u8; DATA_BYTES];
        bits.extract_bytes(0, offset, &mut b, DATA_BYTES * 8);

        let crc = crc8(&b[..17], 0x31, 0x00);
        let chk = (add_bytes(&b[..17]) & 0xff) as u8;
        if crc != 0 || chk != b[17] {
            debug!(crc, expected = b[17], actual = chk, "integrity check failed");
            return Err(DecodeError::FailMic);
        }
        if b[0] != FAMILY {
            return Err(DecodeError::AbortEarly);
        }

        let id = (u32::from(b[1]) << 16) | (u32::from(b[2]) << 8) | u32::from(b[3]);
        let light_raw = (u32::from(b[4]) << 8) | u32::from(b[5]);
        let battery_mv = u32::from(b[6]) * 20;
        // 1.4V to 3.0V is 0 to 100 %
        let battery_lvl = battery_mv.saturating_sub(1400) / 16;
        let flags = b[7];
        let temp_raw = (i32::from(b[7] & 0x03) << 8) | i32::from(b[8]);
        let humidity = b[9];
        let wind_avg = (u32::from(b[7] & 0x10) << 4) | u32::from(b[10]);
        let wind_dir = (u32::from(b[7] & 0x20) << 3) | u32::from(b[11]);
        let wind_max = (u32::from(b[7] & 0x40) << 2) | u32::from(b[12]);
        let uv_index = b[13];
        let unknown = (u32::from(b[14]) << 8) | u32::from(b[15]);

        Ok(Record::new(MODEL)
            .with("id", id)
            .with("battery_ok", f64::from(battery_lvl) / 100.0)
            .with("battery_mV", battery_mv)
            .with_opt(
                "temperature_C",
                (temp_raw != 0x3ff).then(|| f64::from(temp_raw - 400) / 10.0),
            )
            .with_opt("humidity", (humidity != 0xff).then_some(humidity))
            .with_opt("wind_dir_deg", (wind_dir != 0x1ff).then_some(wind_dir))
            .with_opt(
                "wind_avg_m_s",
                (wind_avg != 0x1ff).then(|| f64::from(wind_avg) / 10.0),
            )
            .with_opt(
                "wind_max_m_s",
                (wind_max != 0x1ff).then(|| f64::from(wind_max) / 10.0),
            )
            .with_opt("uvi", (uv_index != 0xff).then(|| f64::from(uv_index) / 10.0))
            .with_opt(
                "light_lux",
                (light_raw != 0xffff).then(|| f64::from(light_raw * 10)),
            )
            .with("flags", flags)
            .with_opt("unknown", (unknown != 0x3fff).then_some(unknown))
            .with(Record::MIC, Mic::Crc))
    }
}
