//! Empirical bias audit: compares raw bits with their biased counterpart.

use crate::error::{Result, ensure_bits, ensure_len};

/// Number of positions where `raw` and `biased` differ.
pub fn flip_count(raw: &[u8], biased: &[u8]) -> Result<usize> {
    ensure_len("biased randomness", raw.len(), biased.len())?;
    ensure_bits("raw randomness", raw)?;
    ensure_bits("biased randomness", biased)?;
    Ok(raw.iter().zip(biased).filter(|(r, b)| r != b).count())
}

/// Fraction of flipped positions.
pub fn flip_rate(raw: &[u8], biased: &[u8]) -> Result<f64> {
    let flips = flip_count(raw, biased)?;
    if raw.is_empty() {
        return Ok(0.0);
    }
    Ok(flips as f64 / raw.len() as f64)
}

/// Reported average bias: twice the flipped fraction, comparable to `epsilon`.
pub fn average_bias(raw: &[u8], biased: &[u8]) -> Result<f64> {
    Ok(2.0 * flip_rate(raw, biased)?)
}
