//! Per-party pipeline: raw randomness → biased questions → answers.
//!
//! A [`BellDevice`] plays one party. Its stages read and write sequences
//! through an [`ArtifactStore`] shared with the other party, so the CHSH score
//! can be computed from whatever both devices have persisted.

use crate::audit;
use crate::bias::{BiasInjector, Injection};
use crate::chsh::{self, ChshReport};
use crate::config::RunConfig;
use crate::error::{Result, ensure_len};
use crate::party::Party;
use crate::store::{Artifact, ArtifactKind, ArtifactStore};
use crate::strategy;
use crate::stream::{DeterministicStream, SeedBook};
use crate::target;

/// One Bell@Home device bound to a store.
pub struct BellDevice<'a, S: ArtifactStore> {
    config: RunConfig,
    party: Party,
    seeds: SeedBook,
    store: &'a mut S,
}

impl<'a, S: ArtifactStore> BellDevice<'a, S> {
    /// Create a device for `party`. Fails if `config` is out of range.
    pub fn new(config: RunConfig, party: Party, store: &'a mut S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            party,
            seeds: SeedBook::derive(),
            store,
        })
    }

    pub fn party(&self) -> Party {
        self.party
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn seeds(&self) -> &SeedBook {
        &self.seeds
    }

    fn artifact(&self, kind: ArtifactKind) -> Artifact {
        Artifact::new(self.party, kind)
    }

    /// Read a sequence and check it has `expected` bits.
    fn read_checked(&self, artifact: Artifact, expected: usize) -> Result<Vec<u8>> {
        let bits = self.store.read(artifact)?;
        ensure_len(&artifact.file_name(), expected, bits.len())?;
        Ok(bits)
    }

    /// Target settings of any party (both seed triples are known).
    pub fn target_settings(&self, party: Party) -> Vec<u8> {
        target::target_settings(&self.seeds, party, self.config.rounds)
    }

    pub fn hidden_variable(&self) -> Vec<u8> {
        target::hidden_variable_for(&self.seeds, self.config.rounds)
    }

    /// Draw `k * n` raw bits from this party's raw seed and persist them.
    pub fn generate_randomness(&mut self) -> Result<()> {
        let seed = self.seeds.get(self.party).raw;
        let bits = DeterministicStream::new(seed).bits(self.config.raw_len());
        let artifact = self.artifact(ArtifactKind::Randomness);
        self.store.write(artifact, &bits)?;
        log::info!("{}: generated {} raw bits", self.party, bits.len());
        Ok(())
    }

    /// Bias the stored raw bits toward this party's targets and persist the
    /// biased bits and the resulting questions. The raw sequence is kept.
    pub fn compute_questions(&mut self) -> Result<Injection> {
        let raw = self.read_checked(
            self.artifact(ArtifactKind::Randomness),
            self.config.raw_len(),
        )?;
        let targets = self.target_settings(self.party);
        let decision_seed = self.seeds.get(self.party).decision;

        let injection =
            BiasInjector::new(&self.config)?.compute_questions(&raw, &targets, decision_seed)?;

        let biased = self.artifact(ArtifactKind::BiasedRandomness);
        let questions = self.artifact(ArtifactKind::Questions);
        self.store.write(biased, &injection.biased)?;
        self.store.write(questions, &injection.settings)?;
        log::info!(
            "{}: computed {} questions ({} of {} raw bits flipped)",
            self.party,
            injection.settings.len(),
            injection.flips,
            injection.biased.len()
        );
        Ok(injection)
    }

    /// Answer the stored questions with this party's local strategy.
    pub fn answer_questions(&mut self) -> Result<Vec<u8>> {
        let questions =
            self.read_checked(self.artifact(ArtifactKind::Questions), self.config.rounds)?;
        let lambda = self.hidden_variable();
        let flips = strategy::additional_flips(self.config.rounds);

        let answers = strategy::answer_questions(
            &questions,
            &lambda,
            &flips,
            self.party.strategy_table(),
        )?;
        let artifact = self.artifact(ArtifactKind::Answers);
        self.store.write(artifact, &answers)?;
        log::info!("{}: answered {} questions", self.party, answers.len());
        Ok(answers)
    }

    /// Twice the fraction of raw bits flipped by bias injection.
    pub fn compute_average_bias(&self) -> Result<f64> {
        let expected = self.config.raw_len();
        let raw = self.read_checked(self.artifact(ArtifactKind::Randomness), expected)?;
        let biased =
            self.read_checked(self.artifact(ArtifactKind::BiasedRandomness), expected)?;
        let bias = audit::average_bias(&raw, &biased)?;

        let eps = self.config.epsilon;
        let tolerance = bias_tolerance(eps, expected);
        if bias > eps + tolerance {
            log::warn!(
                "{}: realised bias {bias:.4} exceeds epsilon {eps} (tolerance {tolerance:.4})",
                self.party
            );
        }
        Ok(bias)
    }

    /// Score the questions and answers both devices have stored.
    pub fn compute_chsh(&self) -> Result<ChshReport> {
        let n = self.config.rounds;
        let x = self.read_checked(Artifact::new(Party::Alice, ArtifactKind::Questions), n)?;
        let y = self.read_checked(Artifact::new(Party::Bob, ArtifactKind::Questions), n)?;
        let a = self.read_checked(Artifact::new(Party::Alice, ArtifactKind::Answers), n)?;
        let b = self.read_checked(Artifact::new(Party::Bob, ArtifactKind::Answers), n)?;
        chsh::compute_chsh(&x, &y, &a, &b)
    }

    /// Run this party's three stages in order.
    pub fn run(&mut self) -> Result<Injection> {
        self.generate_randomness()?;
        let injection = self.compute_questions()?;
        self.answer_questions()?;
        Ok(injection)
    }
}

/// Three standard deviations of the reported bias `2 * Binomial(N, eps/2) / N`,
/// i.e. `3 * 2 * sqrt(p(1 - p) / N)` with `p = eps / 2`.
fn bias_tolerance(epsilon: f64, raw_len: usize) -> f64 {
    let p = epsilon / 2.0;
    let sigma = 2.0 * (p * (1.0 - p) / raw_len as f64).sqrt();
    3.0 * sigma
}
