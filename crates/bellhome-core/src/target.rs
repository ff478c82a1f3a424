//! Target settings and the hidden variable derived from them.

use crate::error::{Result, ensure_bits, ensure_len};
use crate::party::Party;
use crate::stream::{DeterministicStream, SeedBook};

/// The `n` settings the bias injector steers `party` toward.
///
/// Drawn from the party's target seed. Both parties' seeds are public within
/// a run, so either device can reproduce the other's targets.
pub fn target_settings(seeds: &SeedBook, party: Party, rounds: usize) -> Vec<u8> {
    DeterministicStream::new(seeds.get(party).target).bits(rounds)
}

/// `λ[j] = targetA[j] + 2 * targetB[j]`, one value in `0..4` per round.
pub fn hidden_variable(target_alice: &[u8], target_bob: &[u8]) -> Result<Vec<u8>> {
    ensure_len("Bob target settings", target_alice.len(), target_bob.len())?;
    ensure_bits("Alice target settings", target_alice)?;
    ensure_bits("Bob target settings", target_bob)?;
    Ok(combine(target_alice, target_bob))
}

/// Hidden variable for a run, computed from both parties' target seeds.
pub fn hidden_variable_for(seeds: &SeedBook, rounds: usize) -> Vec<u8> {
    let alice = target_settings(seeds, Party::Alice, rounds);
    let bob = target_settings(seeds, Party::Bob, rounds);
    combine(&alice, &bob)
}

fn combine(target_alice: &[u8], target_bob: &[u8]) -> Vec<u8> {
    target_alice
        .iter()
        .zip(target_bob)
        .map(|(&a, &b)| a + 2 * b)
        .collect()
}
