//! Statistical checks for Bell@Home runs.
//!
//! Bit-level randomness tests for raw and derived sequences, a binomial audit
//! of the bias budget, and a significance test of the CHSH score against the
//! classical bound. Each test returns a [`TestResult`] with a p-value (where
//! applicable), a pass/fail determination, and a letter grade (A through F).

use bellhome_core::{CLASSICAL_WIN_RATE, ChshReport};
use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, DiscreteCDF, Normal};
use statrs::function::erf::erfc;

/// Significance level for pass/fail.
pub const ALPHA: f64 = 0.01;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single statistical test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold.
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn from_p(name: &str, p: f64, statistic: f64, details: String) -> Self {
        TestResult {
            name: name.to_string(),
            passed: Self::pass_from_p(Some(p), ALPHA),
            p_value: Some(p),
            statistic,
            details,
            grade: Self::grade_from_p(Some(p)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

fn ones(bits: &[u8]) -> usize {
    bits.iter().filter(|&&b| b & 1 == 1).count()
}

/// P(X >= k) for X ~ Binomial(n, p).
fn binomial_upper_tail(dist: &Binomial, k: u64) -> f64 {
    if k == 0 { 1.0 } else { dist.sf(k - 1) }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. BIT-LEVEL TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Monobit frequency -- proportion of 1s vs 0s should be ~50%.
pub fn monobit_frequency(bits: &[u8]) -> TestResult {
    let name = "Monobit Frequency";
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let s = 2 * ones(bits) as i64 - n as i64;
    let s_obs = (s as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / 2.0_f64.sqrt());
    TestResult::from_p(name, p, s_obs, format!("S={s}, n={n}"))
}

/// Block frequency -- proportion of 1s within 128-bit blocks. Chi-squared test.
pub fn block_frequency(bits: &[u8]) -> TestResult {
    let name = "Block Frequency";
    let block_size: usize = 128;
    let n = bits.len();
    let num_blocks = n / block_size;
    if num_blocks < 10 {
        return insufficient(name, block_size * 10, n);
    }
    let chi2 = bits
        .chunks_exact(block_size)
        .map(|block| {
            let proportion = ones(block) as f64 / block_size as f64;
            (proportion - 0.5) * (proportion - 0.5)
        })
        .sum::<f64>()
        * 4.0
        * block_size as f64;
    let p = match ChiSquared::new(num_blocks as f64) {
        Ok(dist) => dist.sf(chi2),
        Err(_) => return insufficient(name, block_size * 10, n),
    };
    TestResult::from_p(name, p, chi2, format!("blocks={num_blocks}, M={block_size}"))
}

/// Runs test -- number of uninterrupted runs of identical bits.
pub fn runs_test(bits: &[u8]) -> TestResult {
    let name = "Runs Test";
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let prop = ones(bits) as f64 / n as f64;
    if (prop - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: format!("Pre-test failed: proportion={prop:.4}"),
            grade: 'F',
        };
    }
    let runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let expected = 2.0 * n as f64 * prop * (1.0 - prop) + 1.0;
    let std = 2.0 * (2.0 * n as f64).sqrt() * prop * (1.0 - prop);
    let z = (runs as f64 - expected).abs() / std;
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult::from_p(name, p, z, format!("runs={runs}, expected={expected:.0}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. BIAS AUDIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided binomial test that `flips` out of `draws` decision draws is
/// consistent with a flip probability of exactly `epsilon`.
pub fn flip_rate(flips: usize, draws: usize, epsilon: f64) -> TestResult {
    let name = "Flip Rate";
    if draws == 0 {
        return insufficient(name, 1, 0);
    }
    let observed = flips as f64 / draws as f64;
    let details = format!("flips={flips}, draws={draws}, rate={observed:.4}, epsilon={epsilon}");
    let dist = match Binomial::new(epsilon, draws as u64) {
        Ok(d) => d,
        Err(_) => return insufficient(name, 1, 0),
    };
    let k = flips as u64;
    let lower = dist.cdf(k);
    let upper = binomial_upper_tail(&dist, k);
    let p = (2.0 * lower.min(upper)).min(1.0);
    TestResult::from_p(name, p, observed, details)
}

/// One-sided binomial test that the fraction of flipped raw bits does not
/// exceed the budget `epsilon`.
pub fn bias_budget(raw: &[u8], biased: &[u8], epsilon: f64) -> TestResult {
    let name = "Bias Budget";
    let n = raw.len();
    if n == 0 || biased.len() != n {
        return insufficient(name, n.max(1), biased.len());
    }
    let flips = raw.iter().zip(biased).filter(|(r, b)| r != b).count();
    let rate = flips as f64 / n as f64;
    let dist = match Binomial::new(epsilon, n as u64) {
        Ok(d) => d,
        Err(_) => return insufficient(name, 1, 0),
    };
    let p = binomial_upper_tail(&dist, flips as u64);
    TestResult::from_p(
        name,
        p,
        rate,
        format!("flipped={flips}/{n}, rate={rate:.4}, epsilon={epsilon}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. CHSH
// ═══════════════════════════════════════════════════════════════════════════════

/// One-sided z-test of the winning fraction against the classical `3/4`.
///
/// Passes when the score is consistent with a fair local model; fails when it
/// exceeds the classical bound by more than sampling noise, which for a local
/// strategy means the settings were biased.
pub fn chsh_classical_bound(report: &ChshReport) -> TestResult {
    let name = "CHSH Classical Bound";
    let n = report.rounds;
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let q = CLASSICAL_WIN_RATE;
    let se = (q * (1.0 - q) / n as f64).sqrt();
    let z = (report.win_rate - q) / se;
    let p = match Normal::new(0.0, 1.0) {
        Ok(dist) => dist.sf(z),
        Err(_) => return insufficient(name, 100, n),
    };
    TestResult::from_p(
        name,
        p,
        z,
        format!(
            "score={:.4}, w={:.4}, rounds={n}",
            report.score, report.win_rate
        ),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Batteries
// ═══════════════════════════════════════════════════════════════════════════════

/// Sequences produced by one party.
#[derive(Debug, Clone, Copy)]
pub struct PartySequences<'a> {
    pub raw: &'a [u8],
    pub biased: &'a [u8],
    pub questions: &'a [u8],
    pub answers: &'a [u8],
}

/// All per-party tests: randomness of the raw and derived sequences plus the
/// bias budget.
pub fn run_party_tests(seqs: &PartySequences<'_>, epsilon: f64) -> Vec<TestResult> {
    let labelled = |label: &str, mut r: TestResult| {
        r.name = format!("{} ({label})", r.name);
        r
    };
    vec![
        labelled("raw", monobit_frequency(seqs.raw)),
        labelled("raw", runs_test(seqs.raw)),
        labelled("biased", monobit_frequency(seqs.biased)),
        labelled("questions", monobit_frequency(seqs.questions)),
        labelled("questions", block_frequency(seqs.questions)),
        labelled("answers", monobit_frequency(seqs.answers)),
        bias_budget(seqs.raw, seqs.biased, epsilon),
    ]
}

/// Mean grade of a set of results, 0–100.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellhome_core::DeterministicStream;

    fn random_bits(seed: u64, n: usize) -> Vec<u8> {
        DeterministicStream::new(seed).bits(n)
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_pass_from_p() {
        assert!(TestResult::pass_from_p(Some(0.05), 0.01));
        assert!(!TestResult::pass_from_p(Some(0.005), 0.01));
        assert!(!TestResult::pass_from_p(None, 0.01));
    }

    #[test]
    fn test_insufficient_data() {
        let result = monobit_frequency(&[0, 1, 1]);
        assert!(!result.passed);
        assert!(result.details.contains("Insufficient"));
    }

    #[test]
    fn test_monobit_random_passes() {
        let result = monobit_frequency(&random_bits(1, 10_000));
        assert!(result.p_value.is_some());
        assert!(result.p_value.unwrap() > 1e-4);
    }

    #[test]
    fn test_monobit_constant_fails() {
        let result = monobit_frequency(&vec![1u8; 1000]);
        assert!(!result.passed);
        assert_eq!(result.grade, 'F');
    }

    #[test]
    fn test_block_frequency_random() {
        let result = block_frequency(&random_bits(2, 12_800));
        assert!(result.p_value.unwrap() > 1e-4, "{}", result.details);
    }

    #[test]
    fn test_runs_alternating_fails() {
        let bits: Vec<u8> = (0..1000).map(|i| (i % 2) as u8).collect();
        let result = runs_test(&bits);
        assert!(!result.passed);
    }

    #[test]
    fn test_runs_random() {
        let result = runs_test(&random_bits(3, 10_000));
        assert!(result.p_value.unwrap() > 1e-4, "{}", result.details);
    }

    #[test]
    fn test_flip_rate_exact_expectation() {
        let result = flip_rate(200, 1000, 0.2);
        assert!(result.passed);
        assert!((result.p_value.unwrap() - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_flip_rate_too_many_flips() {
        let result = flip_rate(400, 1000, 0.2);
        assert!(!result.passed);
    }

    #[test]
    fn test_flip_rate_no_draws() {
        assert!(!flip_rate(0, 0, 0.2).passed);
    }

    #[test]
    fn test_bias_budget_within() {
        let raw = random_bits(4, 10_000);
        let mut biased = raw.clone();
        for bit in biased.iter_mut().step_by(10) {
            *bit ^= 1;
        }
        // 10% flipped against a 20% budget.
        assert!(bias_budget(&raw, &biased, 0.2).passed);
    }

    #[test]
    fn test_bias_budget_exceeded() {
        let raw = random_bits(5, 10_000);
        let mut biased = raw.clone();
        for bit in biased.iter_mut().step_by(3) {
            *bit ^= 1;
        }
        // 33% flipped against a 20% budget.
        assert!(!bias_budget(&raw, &biased, 0.2).passed);
    }

    #[test]
    fn test_bias_budget_length_mismatch() {
        assert!(!bias_budget(&[0, 1], &[0], 0.2).passed);
    }

    fn report(rounds: usize, wins: usize) -> ChshReport {
        let win_rate = wins as f64 / rounds as f64;
        ChshReport {
            rounds,
            wins,
            win_rate,
            score: 8.0 * win_rate - 4.0,
        }
    }

    #[test]
    fn test_chsh_at_bound_passes() {
        let result = chsh_classical_bound(&report(10_000, 7_500));
        assert!(result.passed);
        assert!((result.p_value.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_chsh_above_bound_fails() {
        let result = chsh_classical_bound(&report(10_000, 8_500));
        assert!(!result.passed);
        assert!(result.statistic > 10.0);
    }

    #[test]
    fn test_chsh_too_few_rounds() {
        assert!(!chsh_classical_bound(&report(10, 8)).passed);
    }

    #[test]
    fn test_party_battery() {
        let raw = random_bits(6, 4_000);
        let biased = raw.clone();
        let questions = random_bits(7, 2_000);
        let answers = random_bits(8, 2_000);
        let seqs = PartySequences {
            raw: &raw,
            biased: &biased,
            questions: &questions,
            answers: &answers,
        };
        let results = run_party_tests(&seqs, 0.2);
        assert_eq!(results.len(), 7);
        assert!(results[0].name.ends_with("(raw)"));
        assert_eq!(results[6].name, "Bias Budget");
        assert!(results[6].passed);
    }

    #[test]
    fn test_quality_score() {
        let results = vec![
            TestResult {
                name: "A".into(),
                passed: true,
                p_value: Some(0.5),
                statistic: 0.0,
                details: String::new(),
                grade: 'A',
            },
            TestResult {
                name: "F".into(),
                passed: false,
                p_value: Some(0.0),
                statistic: 0.0,
                details: String::new(),
                grade: 'F',
            },
        ];
        let score = calculate_quality_score(&results);
        assert!((score - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_calculate_quality_score_empty() {
        assert_eq!(calculate_quality_score(&[]), 0.0);
    }
}
