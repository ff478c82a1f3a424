//! The two parties of a Bell experiment and their fixed local strategies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BellError;

/// Rows are indexed by hidden-variable value (0..4), columns by setting (0..2).
pub type StrategyTable = [[u8; 2]; 4];

/// Outcome table for Alice: answers only depend on the setting when λ ≥ 2.
const ALICE_STRATEGY: StrategyTable = [[0, 0], [0, 0], [0, 1], [0, 1]];

/// Outcome table for Bob.
const BOB_STRATEGY: StrategyTable = [[0, 0], [0, 1], [0, 0], [1, 0]];

/// One of the two measurement devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Alice,
    Bob,
}

impl Party {
    /// Both parties, in pipeline order.
    pub const ALL: [Party; 2] = [Party::Alice, Party::Bob];

    /// Global seed from which this party's seed triple is derived.
    pub const fn global_seed(self) -> u64 {
        match self {
            Self::Alice => 0,
            Self::Bob => 1,
        }
    }

    /// The deterministic local strategy this party plays.
    pub const fn strategy_table(self) -> &'static StrategyTable {
        match self {
            Self::Alice => &ALICE_STRATEGY,
            Self::Bob => &BOB_STRATEGY,
        }
    }

    /// The opposite party.
    pub const fn other(self) -> Party {
        match self {
            Self::Alice => Self::Bob,
            Self::Bob => Self::Alice,
        }
    }

    /// Capitalised name used in artifact file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alice => "Alice",
            Self::Bob => "Bob",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Party {
    type Err = BellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alice" => Ok(Self::Alice),
            "bob" => Ok(Self::Bob),
            _ => Err(BellError::UnknownParty(s.to_string())),
        }
    }
}
