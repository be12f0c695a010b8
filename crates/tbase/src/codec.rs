//! Binary encoding for keys and values.
//!
//! Keys must sort byte-wise in the same order as the timestamps they encode,
//! because every cursor walk in the store is ordered by raw key bytes.
//!
//! # Key Format
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  Timestamp key (12 bytes, big-endian)                      │
//! ├────────────────────────────────────────────────────────────┤
//! │  seconds ^ 1<<63: u64  (8 bytes) - Unix seconds, sign bit  │
//! │                                    flipped so negatives    │
//! │                                    sort first              │
//! │  nanos: u32            (4 bytes) - Subsecond nanoseconds   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Value Format
//!
//! One little-endian IEEE-754 `f64` per column, concatenated in column order.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Width of one encoded float.
pub const FLOAT_WIDTH: usize = 8;

/// Width of an encoded timestamp key.
pub const TIMESTAMP_KEY_LEN: usize = 12;

const SIGN_BIT: u64 = 1 << 63;

/// Encode a float as 8 little-endian bytes.
#[inline]
#[must_use]
pub fn encode_float(value: f64) -> [u8; FLOAT_WIDTH] {
    value.to_bits().to_le_bytes()
}

/// Decode a float from 8 little-endian bytes.
#[inline]
#[must_use]
pub fn decode_float(bytes: [u8; FLOAT_WIDTH]) -> f64 {
    f64::from_bits(u64::from_le_bytes(bytes))
}

/// Encode a row of floats.
#[must_use]
pub fn encode_float_vector(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * FLOAT_WIDTH);
    for &value in values {
        out.extend_from_slice(&encode_float(value));
    }
    out
}

/// Decode a row of floats.
///
/// # Errors
/// Returns [`Error::Corruption`] if the length is not a multiple of 8.
pub fn decode_float_vector(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % FLOAT_WIDTH != 0 {
        return Err(Error::corrupt(format!(
            "float vector of {} bytes is not a multiple of {FLOAT_WIDTH}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(FLOAT_WIDTH)
        .map(|chunk| {
            let mut arr = [0u8; FLOAT_WIDTH];
            arr.copy_from_slice(chunk);
            decode_float(arr)
        })
        .collect())
}

/// Encode a timestamp as an order-preserving key.
#[must_use]
pub fn encode_timestamp(ts: DateTime<Utc>) -> [u8; TIMESTAMP_KEY_LEN] {
    let secs = (ts.timestamp() as u64) ^ SIGN_BIT;
    let nanos = ts.timestamp_subsec_nanos();

    let mut out = [0u8; TIMESTAMP_KEY_LEN];
    out[..8].copy_from_slice(&secs.to_be_bytes());
    out[8..].copy_from_slice(&nanos.to_be_bytes());
    out
}

/// Decode a key produced by [`encode_timestamp`].
///
/// # Errors
/// Returns [`Error::Corruption`] on a wrong width or an unrepresentable time.
pub fn decode_timestamp(bytes: &[u8]) -> Result<DateTime<Utc>> {
    let Ok(arr) = <[u8; TIMESTAMP_KEY_LEN]>::try_from(bytes) else {
        return Err(Error::corrupt(format!(
            "timestamp key of {} bytes, expected {TIMESTAMP_KEY_LEN}",
            bytes.len()
        )));
    };

    let mut secs = [0u8; 8];
    secs.copy_from_slice(&arr[..8]);
    let mut nanos = [0u8; 4];
    nanos.copy_from_slice(&arr[8..]);

    let secs = (u64::from_be_bytes(secs) ^ SIGN_BIT) as i64;
    let nanos = u32::from_be_bytes(nanos);

    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| Error::corrupt(format!("timestamp {secs}s+{nanos}ns out of range")))
}
