use std::path::Path;

use bellhome_core::{
    ArtifactStore, MemoryStore, RunConfig, RunManifest, Result, run_experiment, write_manifest,
};

pub fn run(config: RunConfig, dir: Option<&str>, output_path: Option<&str>) -> Result<()> {
    println!(
        "Running Bell@Home: n={}, k={}, epsilon={}\n",
        config.rounds, config.group_size, config.epsilon
    );

    let manifest = match dir {
        Some(dir) => {
            let mut store = super::open_store(dir)?;
            let manifest = execute(config, &mut store)?;
            let path = write_manifest(&manifest, Path::new(dir))?;
            println!("\nSequences and manifest saved to: {}", path.display());
            manifest
        }
        None => execute(config, &mut MemoryStore::new())?,
    };

    if let Some(path) = output_path {
        std::fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
        println!("Manifest written to: {path}");
    }
    Ok(())
}

fn execute<S: ArtifactStore>(config: RunConfig, store: &mut S) -> Result<RunManifest> {
    let manifest = run_experiment(config, store)?;
    print_summary(&manifest);
    Ok(manifest)
}

fn print_summary(manifest: &RunManifest) {
    println!("  {:<8} {:>10} {:>10} {:>14}", "Device", "Flips", "Draws", "Average bias");
    println!("  {}", "-".repeat(46));
    for report in &manifest.parties {
        println!(
            "  {:<8} {:>10} {:>10} {:>14.4}",
            report.party.to_string(),
            report.flips,
            report.draws,
            report.average_bias
        );
    }
    println!();
    for report in &manifest.parties {
        println!("Average bias of {} = {}", report.party, report.average_bias);
    }
    let chsh = &manifest.chsh;
    println!(
        "Observed CHSH score = {} ({}/{} rounds won)",
        chsh.score, chsh.wins, chsh.rounds
    );
    if chsh.violates_classical_bound() {
        println!("Score exceeds the classical bound of {}.", bellhome_core::CLASSICAL_BOUND);
    }
}
