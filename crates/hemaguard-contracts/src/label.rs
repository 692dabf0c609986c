//! Ground-truth label and risk tier types used during dataset preparation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary anemia label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Healthy,
    Anemic,
}

impl Label {
    /// The 0/1 encoding written to the `Target` column.
    pub fn code(self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Anemic => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Healthy),
            1 => Some(Self::Anemic),
            _ => None,
        }
    }

    pub fn is_anemic(self) -> bool {
        self == Self::Anemic
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Anemic => write!(f, "Anemic"),
        }
    }
}

/// Ordinal risk for non-anemic records, derived from RDW.
///
/// Anemic records carry `NotApplicable`, written as the −1 sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    NotApplicable,
    Optimal,
    Medium,
    High,
}

impl RiskTier {
    /// The encoding written to the `Risk_Score` column.
    pub fn code(self) -> i8 {
        match self {
            Self::NotApplicable => -1,
            Self::Optimal => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// Everything training-time labeling emits for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelOutcome {
    pub label: Label,
    pub risk_tier: RiskTier,
    /// HGB below the emergency cutoff.
    pub emergency: bool,
}
