use bellhome_core::error::ensure_len;
use bellhome_core::{Artifact, ArtifactKind, ArtifactStore, BellDevice, Party, RunConfig, Result};
use bellhome_tests::{
    PartySequences, TestResult, calculate_quality_score, chsh_classical_bound, run_party_tests,
};

pub fn run(config: RunConfig, dir: &str) -> Result<()> {
    let mut store = super::open_store(dir)?;
    let sections = collect(config, &mut store)?;

    println!(
        "Statistical report for {dir} (n={}, k={}, epsilon={})",
        config.rounds, config.group_size, config.epsilon
    );
    let mut all = Vec::new();
    for (title, results) in &sections {
        println!("\n{title}");
        print_results(results);
        all.extend(results.iter().cloned());
    }

    let passed = all.iter().filter(|r| r.passed).count();
    println!("\n{}", "=".repeat(72));
    println!(
        "Overall: {passed}/{} passed, quality score {:.0}/100",
        all.len(),
        calculate_quality_score(&all)
    );
    Ok(())
}

/// Run the per-party batteries and the CHSH test over a persisted run.
fn collect<S: ArtifactStore>(
    config: RunConfig,
    store: &mut S,
) -> Result<Vec<(String, Vec<TestResult>)>> {
    let mut sections = Vec::new();
    for party in Party::ALL {
        let read = |kind: ArtifactKind, expected: usize| -> Result<Vec<u8>> {
            let artifact = Artifact::new(party, kind);
            let bits = store.read(artifact)?;
            ensure_len(&artifact.file_name(), expected, bits.len())?;
            Ok(bits)
        };
        let raw = read(ArtifactKind::Randomness, config.raw_len())?;
        let biased = read(ArtifactKind::BiasedRandomness, config.raw_len())?;
        let questions = read(ArtifactKind::Questions, config.rounds)?;
        let answers = read(ArtifactKind::Answers, config.rounds)?;
        let seqs = PartySequences {
            raw: &raw,
            biased: &biased,
            questions: &questions,
            answers: &answers,
        };
        sections.push((party.to_string(), run_party_tests(&seqs, config.epsilon)));
    }

    let chsh = BellDevice::new(config, Party::Alice, store)?.compute_chsh()?;
    sections.push(("CHSH".to_string(), vec![chsh_classical_bound(&chsh)]));
    Ok(sections)
}

fn print_results(results: &[TestResult]) {
    println!("  {:<34} {:>5} {:>10} {:>10}", "Test", "Grade", "p-value", "Statistic");
    println!("  {}", "-".repeat(64));
    for r in results {
        let status = if r.passed { "✓" } else { "✗" };
        let p = r
            .p_value
            .map(|p| format!("{p:.4}"))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{status} {:<34} {:>5} {:>10} {:>10.4}  {}",
            r.name, r.grade, p, r.statistic, r.details
        );
    }
}
