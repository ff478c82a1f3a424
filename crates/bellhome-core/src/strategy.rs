//! Deterministic local-hidden-variable strategy.
//!
//! Each round's answer is looked up in the party's [`StrategyTable`] by hidden
//! variable and setting, then XOR-ed with a shared flip bit. The flip layer is
//! common to both parties, so it cancels out of `a ⊕ b` and leaves the CHSH
//! score unchanged while making each party's marginal uniform.

use crate::error::{BellError, Result, ensure_bits, ensure_len};
use crate::party::StrategyTable;
use crate::stream::{ADDITIONAL_FLIPS_SEED, DeterministicStream};

/// The shared flip bits for a run of `rounds` rounds.
pub fn additional_flips(rounds: usize) -> Vec<u8> {
    DeterministicStream::new(ADDITIONAL_FLIPS_SEED).bits(rounds)
}

/// `outcome[j] = (table[λ[j]][x[j]] + flips[j]) mod 2`.
pub fn answer_questions(
    settings: &[u8],
    hidden_variable: &[u8],
    extra_flips: &[u8],
    table: &StrategyTable,
) -> Result<Vec<u8>> {
    let n = settings.len();
    ensure_len("hidden variable", n, hidden_variable.len())?;
    ensure_len("additional flips", n, extra_flips.len())?;
    ensure_bits("additional flips", extra_flips)?;

    settings
        .iter()
        .zip(hidden_variable)
        .zip(extra_flips)
        .enumerate()
        .map(|(j, ((&x, &lambda), &mu))| {
            let row = table.get(lambda as usize).ok_or_else(|| {
                BellError::InvalidConfig(format!("hidden variable {lambda} at round {j}"))
            })?;
            let answer = row.get(x as usize).ok_or_else(|| {
                BellError::InvalidConfig(format!("setting {x} at round {j}"))
            })?;
            Ok((answer + mu) % 2)
        })
        .collect()
}
