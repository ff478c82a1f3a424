use bellhome_core::{BellDevice, Party, RunConfig, Result};

pub fn run(config: RunConfig, dir: &str) -> Result<()> {
    let mut store = super::open_store(dir)?;
    // Either device can score: both read the same four sequences.
    let report = BellDevice::new(config, Party::Bob, &mut store)?.compute_chsh()?;
    println!("Observed CHSH score = {}", report.score);
    println!(
        "  {}/{} rounds won (w = {:.4}, classical bound w = {})",
        report.wins,
        report.rounds,
        report.win_rate,
        bellhome_core::CLASSICAL_WIN_RATE
    );
    Ok(())
}
