//! CHSH scoring.
//!
//! A round is won when `a ⊕ b = x ∧ y`. With `w` the fraction of rounds won the
//! score is `8w - 4`, so it lies in `[-4, 4]`; local strategies are bounded by
//! `w ≤ 3/4`, i.e. a score of 2.

use serde::{Deserialize, Serialize};

use crate::error::{BellError, Result, ensure_bits, ensure_len};

/// Winning fraction of an optimal local-hidden-variable strategy.
pub const CLASSICAL_WIN_RATE: f64 = 0.75;

/// Score reached at [`CLASSICAL_WIN_RATE`].
pub const CLASSICAL_BOUND: f64 = 2.0;

/// Aggregated result of a CHSH evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChshReport {
    pub rounds: usize,
    pub wins: usize,
    /// Empirical winning probability `w`.
    pub win_rate: f64,
    /// `8w - 4`.
    pub score: f64,
}

impl ChshReport {
    /// Whether the observed score exceeds the local bound (before any
    /// statistical correction).
    pub fn violates_classical_bound(&self) -> bool {
        self.score > CLASSICAL_BOUND
    }
}

/// Score questions `x`, `y` and answers `a`, `b` of both parties.
///
/// All four sequences must share one non-zero length and hold only 0 or 1.
pub fn compute_chsh(x: &[u8], y: &[u8], a: &[u8], b: &[u8]) -> Result<ChshReport> {
    let n = x.len();
    ensure_len("Bob questions", n, y.len())?;
    ensure_len("Alice answers", n, a.len())?;
    ensure_len("Bob answers", n, b.len())?;
    if n == 0 {
        return Err(BellError::LengthMismatch {
            what: "CHSH inputs".to_string(),
            expected: 1,
            actual: 0,
        });
    }
    ensure_bits("Alice questions", x)?;
    ensure_bits("Bob questions", y)?;
    ensure_bits("Alice answers", a)?;
    ensure_bits("Bob answers", b)?;

    let wins = (0..n)
        .filter(|&j| (a[j] ^ b[j]) == (x[j] & y[j]))
        .count();
    let win_rate = wins as f64 / n as f64;
    let score = 8.0 * win_rate - 4.0;

    log::info!("CHSH: {wins}/{n} rounds won, score {score:.4}");

    Ok(ChshReport {
        rounds: n,
        wins,
        win_rate,
        score,
    })
}
