#![allow(dead_code)]

use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};
use rfdecode::bitbuffer::BitBuffer;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

/// A capture from a fixture file, `<model> <bit notation>` per line.
#[derive(Debug)]
pub struct Capture {
    pub line: usize,
    pub model: String,
    pub bits: BitBuffer,
}

pub fn load_captures(name: &str) -> Vec<Capture> {
    let text = std::fs::read_to_string(fixture_path(name)).unwrap();
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'))
        .map(|(i, l)| {
            let (model, bits) = l.split_once(char::is_whitespace).unwrap();
            Capture {
                line: i + 1,
                model: model.to_string(),
                bits: bits
                    .trim()
                    .parse()
                    .unwrap_or_else(|e| panic!("line {}: {e}", i + 1)),
            }
        })
        .collect()
}

/// Deterministic rng so failures are reproducible.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed_433)
}

/// Pack 0/1 values MSB-first.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    for (i, bit) in bits.iter().enumerate() {
        out[i / 8] |= (bit & 1) << (7 - i % 8);
    }
    out
}
