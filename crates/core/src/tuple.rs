//! Order-preserving tuple codec
//!
//! Composite keys are encoded into byte strings whose lexicographic order
//! matches the tuple order. Part ordering, lowest to highest:
//!
//! `null < false < true < number < timestamp < raw bytes < string < nested
//! tuple < undefined`
//!
//! `undefined` sorts after every other part, which makes it the natural
//! maximal sentinel when a range bound must be padded past every entry
//! sharing a key prefix.
//!
//! Encoding details:
//! - Each part starts with a one-byte type tag chosen so tag order matches
//!   part order.
//! - Numbers are f64 in big-endian after a sign-dependent bit transform, so
//!   byte order matches IEEE total order (negatives before positives).
//! - Timestamps are signed microseconds since the epoch, offset-encoded.
//! - Bytes and strings are written raw with `0x00` escaped as `0x00 0xFF`
//!   and a bare `0x00` terminator. No type tag starts with `0xFF`, so the
//!   escape never collides with the byte that follows a terminator.
//! - Nested tuples recurse between their tag and a `0x00` terminator.

use crate::error::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

const TAG_NULL: u8 = 0x01;
const TAG_FALSE: u8 = 0x02;
const TAG_TRUE: u8 = 0x03;
const TAG_NUMBER: u8 = 0x04;
const TAG_TIMESTAMP: u8 = 0x05;
const TAG_BYTES: u8 = 0x06;
const TAG_STRING: u8 = 0x07;
const TAG_TUPLE: u8 = 0x08;
const TAG_UNDEFINED: u8 = 0xFE;

const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0xFF;

const SIGN_BIT: u64 = 1 << 63;

/// One part of a composite key
///
/// Timestamps carry microsecond precision; finer-grained instants are
/// truncated by the codec.
#[derive(Debug, Clone)]
pub enum TuplePart {
    /// Sorts before everything else
    Null,
    /// `false` before `true`
    Bool(bool),
    /// f64 under IEEE total order
    Number(f64),
    /// Instant in time, microsecond precision
    Timestamp(DateTime<Utc>),
    /// Raw bytes, lexicographic
    Bytes(Bytes),
    /// UTF-8 string, lexicographic by encoded bytes
    Text(String),
    /// Nested tuple, compared element-wise
    Tuple(Vec<TuplePart>),
    /// The maximal sentinel; sorts after everything else
    Undefined,
}

impl TuplePart {
    fn rank(&self) -> u8 {
        match self {
            TuplePart::Null => 0,
            TuplePart::Bool(_) => 1,
            TuplePart::Number(_) => 2,
            TuplePart::Timestamp(_) => 3,
            TuplePart::Bytes(_) => 4,
            TuplePart::Text(_) => 5,
            TuplePart::Tuple(_) => 6,
            TuplePart::Undefined => 7,
        }
    }

    /// Convenience constructor for text parts
    pub fn text(s: impl Into<String>) -> Self {
        TuplePart::Text(s.into())
    }
}

impl PartialEq for TuplePart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TuplePart {}

impl PartialOrd for TuplePart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TuplePart {
    fn cmp(&self, other: &Self) -> Ordering {
        use TuplePart::*;
        match (self, other) {
            (Null, Null) | (Undefined, Undefined) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.timestamp_micros().cmp(&b.timestamp_micros()),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Tuple(a), Tuple(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Encode a sequence of parts into a single ordered byte key
pub fn pack(parts: &[TuplePart]) -> Bytes {
    let mut out = Vec::with_capacity(parts.len() * 9);
    for part in parts {
        encode_part(part, &mut out);
    }
    Bytes::from(out)
}

/// Decode a packed key back into its parts
///
/// Fails with [`Error::Codec`] on truncated or malformed input.
pub fn unpack(bytes: &[u8]) -> Result<Vec<TuplePart>> {
    let mut parts = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (part, next) = decode_part(bytes, pos)?;
        parts.push(part);
        pos = next;
    }
    Ok(parts)
}

fn encode_part(part: &TuplePart, out: &mut Vec<u8>) {
    match part {
        TuplePart::Null => out.push(TAG_NULL),
        TuplePart::Bool(false) => out.push(TAG_FALSE),
        TuplePart::Bool(true) => out.push(TAG_TRUE),
        TuplePart::Number(n) => {
            out.push(TAG_NUMBER);
            out.extend_from_slice(&order_bits_f64(*n).to_be_bytes());
        }
        TuplePart::Timestamp(ts) => {
            out.push(TAG_TIMESTAMP);
            let offset = (ts.timestamp_micros() as u64) ^ SIGN_BIT;
            out.extend_from_slice(&offset.to_be_bytes());
        }
        TuplePart::Bytes(data) => {
            out.push(TAG_BYTES);
            encode_escaped(data, out);
        }
        TuplePart::Text(s) => {
            out.push(TAG_STRING);
            encode_escaped(s.as_bytes(), out);
        }
        TuplePart::Tuple(inner) => {
            out.push(TAG_TUPLE);
            for p in inner {
                encode_part(p, out);
            }
            out.push(TERMINATOR);
        }
        TuplePart::Undefined => out.push(TAG_UNDEFINED),
    }
}

fn decode_part(bytes: &[u8], pos: usize) -> Result<(TuplePart, usize)> {
    let tag = *bytes
        .get(pos)
        .ok_or_else(|| Error::Codec("truncated tuple: missing tag".into()))?;
    let pos = pos + 1;
    match tag {
        TAG_NULL => Ok((TuplePart::Null, pos)),
        TAG_FALSE => Ok((TuplePart::Bool(false), pos)),
        TAG_TRUE => Ok((TuplePart::Bool(true), pos)),
        TAG_NUMBER => {
            let raw = read_u64(bytes, pos)?;
            Ok((TuplePart::Number(unorder_bits_f64(raw)), pos + 8))
        }
        TAG_TIMESTAMP => {
            let raw = read_u64(bytes, pos)?;
            let micros = (raw ^ SIGN_BIT) as i64;
            let ts = DateTime::from_timestamp_micros(micros)
                .ok_or_else(|| Error::Codec(format!("timestamp out of range: {micros}")))?;
            Ok((TuplePart::Timestamp(ts), pos + 8))
        }
        TAG_BYTES => {
            let (data, next) = decode_escaped(bytes, pos)?;
            Ok((TuplePart::Bytes(Bytes::from(data)), next))
        }
        TAG_STRING => {
            let (data, next) = decode_escaped(bytes, pos)?;
            let s = String::from_utf8(data)
                .map_err(|e| Error::Codec(format!("invalid utf-8 in string part: {e}")))?;
            Ok((TuplePart::Text(s), next))
        }
        TAG_TUPLE => {
            let mut inner = Vec::new();
            let mut pos = pos;
            loop {
                match bytes.get(pos) {
                    Some(&TERMINATOR) => return Ok((TuplePart::Tuple(inner), pos + 1)),
                    Some(_) => {
                        let (part, next) = decode_part(bytes, pos)?;
                        inner.push(part);
                        pos = next;
                    }
                    None => return Err(Error::Codec("truncated tuple: unterminated nesting".into())),
                }
            }
        }
        TAG_UNDEFINED => Ok((TuplePart::Undefined, pos)),
        other => Err(Error::Codec(format!("unknown tuple tag 0x{other:02x}"))),
    }
}

fn read_u64(bytes: &[u8], pos: usize) -> Result<u64> {
    let slice = bytes
        .get(pos..pos + 8)
        .ok_or_else(|| Error::Codec("truncated tuple: short fixed-width part".into()))?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(slice);
    Ok(u64::from_be_bytes(arr))
}

/// Map f64 bits so that unsigned byte comparison matches IEEE total order.
fn order_bits_f64(f: f64) -> u64 {
    let bits = f.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    }
}

fn unorder_bits_f64(raw: u64) -> f64 {
    let bits = if raw & SIGN_BIT != 0 {
        raw ^ SIGN_BIT
    } else {
        !raw
    };
    f64::from_bits(bits)
}

fn encode_escaped(data: &[u8], out: &mut Vec<u8>) {
    for &b in data {
        out.push(b);
        if b == TERMINATOR {
            out.push(ESCAPE);
        }
    }
    out.push(TERMINATOR);
}

fn decode_escaped(bytes: &[u8], mut pos: usize) -> Result<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(&TERMINATOR) => {
                if bytes.get(pos + 1) == Some(&ESCAPE) {
                    out.push(TERMINATOR);
                    pos += 2;
                } else {
                    return Ok((out, pos + 1));
                }
            }
            Some(&b) => {
                out.push(b);
                pos += 1;
            }
            None => return Err(Error::Codec("truncated tuple: unterminated bytes".into())),
        }
    }
}
