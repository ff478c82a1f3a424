use bellhome_core::{BellDevice, RunConfig, Result};

/// A single step of one device's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Questions,
    Answers,
    Bias,
}

pub fn run(config: RunConfig, device: &str, dir: &str, stage: Stage) -> Result<()> {
    let party = super::parse_device(device)?;
    let mut store = super::open_store(dir)?;
    let mut device = BellDevice::new(config, party, &mut store)?;

    match stage {
        Stage::Generate => {
            device.generate_randomness()?;
            println!("{party}: wrote {} raw bits", config.raw_len());
        }
        Stage::Questions => {
            let injection = device.compute_questions()?;
            println!(
                "{party}: wrote {} questions ({} flips over {} draws)",
                injection.settings.len(),
                injection.flips,
                injection.draws
            );
        }
        Stage::Answers => {
            let answers = device.answer_questions()?;
            println!("{party}: wrote {} answers", answers.len());
        }
        Stage::Bias => {
            let bias = device.compute_average_bias()?;
            println!("Average bias of {party} = {bias}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellhome_core::BellError;

    #[test]
    fn test_stages_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let config = RunConfig::new(128, 1, 0.2).unwrap();
        for stage in [Stage::Generate, Stage::Questions, Stage::Answers, Stage::Bias] {
            run(config, "alice", dir, stage).unwrap();
        }
        assert!(tmp.path().join("answersAlice.dat").exists());
    }

    #[test]
    fn test_stage_out_of_order_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RunConfig::new(128, 1, 0.2).unwrap();
        let err = run(config, "bob", tmp.path().to_str().unwrap(), Stage::Answers).unwrap_err();
        assert!(matches!(err, BellError::MissingArtifact(_)));
    }

    #[test]
    fn test_unknown_device() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RunConfig::default();
        let err = run(config, "carol", tmp.path().to_str().unwrap(), Stage::Generate).unwrap_err();
        assert!(matches!(err, BellError::UnknownParty(_)));
    }
}
