//! Budget-bounded bias injection.
//!
//! Raw bits are consumed in groups of `k`, one group per round. A running
//! parity is carried across the *whole* run (it is never reset between rounds)
//! and each round's setting is the parity after its last bit. Whenever adding
//! the next raw bit would leave the parity different from the round's target,
//! one uniform draw is taken from the decision stream and the bit is flipped
//! with probability `epsilon`. Bits that already agree consume no draw.
//!
//! ```text
//! round j:  for i in 0..k
//!             if (parity + x[i,j]) % 2 != target[j] && u < epsilon { x[i,j] ^= 1 }
//!             parity = (parity + x[i,j]) % 2
//!           settings[j] = parity
//! ```
//!
//! The nudge is probabilistic: the target is not guaranteed within a round,
//! and no bit is flipped with probability above `epsilon`.

use crate::config::RunConfig;
use crate::error::{Result, ensure_bits, ensure_len};
use crate::stream::DeterministicStream;

/// Output of one injection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The raw bits after perturbation, `k * n` long.
    pub biased: Vec<u8>,
    /// Per-round settings ("questions"), `n` long.
    pub settings: Vec<u8>,
    /// Number of raw bits that were flipped.
    pub flips: usize,
    /// Number of decision draws consumed (bits that mismatched the target).
    pub draws: usize,
}

/// Nudges raw bit groups toward target settings.
#[derive(Debug, Clone, Copy)]
pub struct BiasInjector {
    rounds: usize,
    group_size: usize,
    epsilon: f64,
}

impl BiasInjector {
    /// Fails if `config` does not pass [`RunConfig::validate`].
    pub fn new(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rounds: config.rounds,
            group_size: config.group_size,
            epsilon: config.epsilon,
        })
    }

    /// Bias `raw` toward `targets`, drawing decisions from `decision_seed`.
    ///
    /// `raw` is left untouched; the perturbed copy is returned in
    /// [`Injection::biased`].
    pub fn compute_questions(
        &self,
        raw: &[u8],
        targets: &[u8],
        decision_seed: u64,
    ) -> Result<Injection> {
        let k = self.group_size;
        ensure_len("raw randomness", self.rounds * k, raw.len())?;
        ensure_len("target settings", self.rounds, targets.len())?;
        ensure_bits("raw randomness", raw)?;
        ensure_bits("target settings", targets)?;

        let mut decisions = DeterministicStream::new(decision_seed);
        let mut biased = raw.to_vec();
        let mut settings = Vec::with_capacity(self.rounds);
        let mut running: u8 = 0;
        let mut flips = 0;
        let mut draws = 0;

        for (group, &target) in biased.chunks_exact_mut(k).zip(targets) {
            for bit in group.iter_mut() {
                if (running + *bit) % 2 != target {
                    draws += 1;
                    if decisions.next_uniform() < self.epsilon {
                        *bit = 1 - *bit;
                        flips += 1;
                    }
                }
                running = (running + *bit) % 2;
            }
            settings.push(running);
        }

        log::debug!(
            "bias injection: {flips} flips over {draws} draws ({} raw bits, epsilon={})",
            raw.len(),
            self.epsilon
        );

        Ok(Injection {
            biased,
            settings,
            flips,
            draws,
        })
    }
}
