//! Run parameters.

use serde::{Deserialize, Serialize};

use crate::error::{BellError, Result};

/// Default number of rounds.
pub const DEFAULT_ROUNDS: usize = 10_000;
/// Default maximum flip probability per raw bit.
pub const DEFAULT_EPSILON: f64 = 0.2;
/// Default number of raw bits per setting. One bit per round is the only
/// default; older docs that mention two are wrong.
pub const DEFAULT_GROUP_SIZE: usize = 1;

/// Parameters fixed for the lifetime of a run.
///
/// The fields are public for struct-update syntax; every pipeline entry point
/// calls [`RunConfig::validate`] before using them, and deserialization
/// validates too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRunConfig")]
pub struct RunConfig {
    /// Number of rounds `n`.
    pub rounds: usize,
    /// Raw bits combined into one setting per round, `k`.
    pub group_size: usize,
    /// Upper bound on the flip probability of any raw bit.
    pub epsilon: f64,
}

#[derive(Deserialize)]
struct RawRunConfig {
    rounds: usize,
    group_size: usize,
    epsilon: f64,
}

impl TryFrom<RawRunConfig> for RunConfig {
    type Error = BellError;

    fn try_from(raw: RawRunConfig) -> Result<Self> {
        Self::new(raw.rounds, raw.group_size, raw.epsilon)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            group_size: DEFAULT_GROUP_SIZE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl RunConfig {
    pub fn new(rounds: usize, group_size: usize, epsilon: f64) -> Result<Self> {
        let config = Self {
            rounds,
            group_size,
            epsilon,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject `n == 0`, `k == 0`, and `epsilon` outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(BellError::InvalidConfig(
                "round count must be positive".to_string(),
            ));
        }
        if self.group_size == 0 {
            return Err(BellError::InvalidConfig(
                "group size must be positive".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || !(0.0..=1.0).contains(&self.epsilon) {
            return Err(BellError::InvalidConfig(format!(
                "epsilon must lie in [0, 1], got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Length of a raw bit sequence, `k * n`.
    pub fn raw_len(&self) -> usize {
        self.rounds * self.group_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.rounds, 10_000);
        assert_eq!(config.group_size, 1);
        assert_eq!(config.epsilon, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_raw_len() {
        let config = RunConfig::new(100, 3, 0.1).unwrap();
        assert_eq!(config.raw_len(), 300);
    }

    #[test]
    fn test_rejects_zero_rounds() {
        assert!(matches!(
            RunConfig::new(0, 1, 0.2),
            Err(BellError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_group_size() {
        assert!(matches!(
            RunConfig::new(10, 0, 0.2),
            Err(BellError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_epsilon_bounds() {
        assert!(RunConfig::new(10, 1, 0.0).is_ok());
        assert!(RunConfig::new(10, 1, 1.0).is_ok());
        assert!(RunConfig::new(10, 1, -0.01).is_err());
        assert!(RunConfig::new(10, 1, 1.01).is_err());
        assert!(RunConfig::new(10, 1, f64::NAN).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RunConfig::new(64, 2, 0.3).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<RunConfig>(
            r#"{"rounds": 100, "group_size": 0, "epsilon": 0.2}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("group size must be positive"));
        assert!(
            serde_json::from_str::<RunConfig>(r#"{"rounds": 0, "group_size": 1, "epsilon": 0.2}"#)
                .is_err()
        );
    }

    #[test]
    fn test_struct_literal_caught_by_validate() {
        let config = RunConfig {
            group_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BellError::InvalidConfig(_))));
    }
}
