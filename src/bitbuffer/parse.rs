//! Text notation for bit buffers.
//!
//! Rows are written as hex, optionally prefixed by an explicit bit count in braces,
//! and separated by `/`, e.g., `{36}e44b707300/{36}e44b707300`. Without a bit count
//! a row is 4 bits per hex digit. Whitespace is ignored.
use std::fmt;
use std::str::FromStr;

use super::{BitBuffer, BitRow};
use crate::error::Error;

fn parse_row(s: &str, offset: usize) -> Result<BitRow, Error> {
    let mut chars = s.char_indices();
    let mut explicit_bits: Option<usize> = None;
    let mut nibbles: Vec<u8> = Vec::new();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                if explicit_bits.is_some() || !nibbles.is_empty() {
                    return Err(Error::Parse {
                        pos: offset + i,
                        msg: "bit count must precede row data".to_string(),
                    });
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, d)) if d.is_ascii_digit() => digits.push(d),
                        Some((j, d)) => {
                            return Err(Error::Parse {
                                pos: offset + j,
                                msg: format!("unexpected {d:?} in bit count"),
                            })
                        }
                        None => {
                            return Err(Error::Parse {
                                pos: offset + s.len(),
                                msg: "unterminated bit count".to_string(),
                            })
                        }
                    }
                }
                let n = digits.parse::<usize>().map_err(|e| Error::Parse {
                    pos: offset + i,
                    msg: format!("invalid bit count: {e}"),
                })?;
                if n > BitRow::MAX_BITS {
                    return Err(Error::Parse {
                        pos: offset + i,
                        msg: format!("bit count {n} exceeds {}", BitRow::MAX_BITS),
                    });
                }
                explicit_bits = Some(n);
            }
            c if c.is_whitespace() => {}
            c => match c.to_digit(16) {
                Some(v) => nibbles.push(v as u8),
                None => {
                    return Err(Error::Parse {
                        pos: offset + i,
                        msg: format!("unexpected {c:?}"),
                    })
                }
            },
        }
    }

    let num_bits = explicit_bits.unwrap_or(nibbles.len() * 4);
    let mut bytes: Vec<u8> = nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect();
    bytes.resize(bytes.len().max(num_bits.div_ceil(8)), 0);
    Ok(BitRow::from_bytes(&bytes, num_bits))
}

impl FromStr for BitBuffer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = BitBuffer::new();
        if s.trim().is_empty() {
            return Ok(bits);
        }
        let mut offset = 0;
        for part in s.split('/') {
            let row = parse_row(part, offset)?;
            if !bits.push_row(row) {
                return Err(Error::Parse {
                    pos: offset,
                    msg: format!("more than {} rows", BitBuffer::MAX_ROWS),
                });
            }
            offset += part.len() + 1;
        }
        Ok(bits)
    }
}

impl fmt::Display for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.len())?;
        for b in self.as_bytes() {
            write!(f, " {b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{i:02}] {row}")?;
        }
        Ok(())
    }
}
