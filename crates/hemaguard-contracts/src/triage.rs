//! Live triage input and output types.
//!
//! A `TriageResult` is recomputed for every inference and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// Clinical severity tier assigned by the triage rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityTier {
    /// Anemic with HGB below the transfusion cutoff.
    SeverePriority1,
    /// Anemic, not severe.
    ModeratePriority2,
    /// Healthy but borderline values.
    RiskLevel3High,
    /// Healthy, slightly elevated RDW.
    RiskLevel2Guarded,
    /// Healthy, nothing to act on.
    RiskLevel1Optimal,
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SeverePriority1 => "Severe/Priority-1",
            Self::ModeratePriority2 => "Moderate/Priority-2",
            Self::RiskLevel3High => "Risk-Level-3/High",
            Self::RiskLevel2Guarded => "Risk-Level-2/Guarded",
            Self::RiskLevel1Optimal => "Risk-Level-1/Optimal",
        };
        f.write_str(s)
    }
}

/// Probable anemia etiology, from the Mentzer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestedCause {
    GeneticThalassemia,
    NutritionalIronDeficiency,
}

impl SuggestedCause {
    /// Short profile name used in explanations ("Genetic" / "Nutritional").
    pub fn profile(self) -> &'static str {
        match self {
            Self::GeneticThalassemia => "Genetic",
            Self::NutritionalIronDeficiency => "Nutritional",
        }
    }
}

impl fmt::Display for SuggestedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneticThalassemia => f.write_str("Genetic/Thalassemia"),
            Self::NutritionalIronDeficiency => f.write_str("Nutritional/Iron-Deficiency"),
        }
    }
}

/// The values the triage rules read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriageInput {
    pub hgb: f64,
    pub rdw: f64,
    pub mentzer_index: f64,
    /// The classifier's predicted label.
    pub label: Label,
    /// The classifier's probability of anemia.
    pub probability: f64,
}

/// The clinical output for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Id of the rule that fired.
    pub rule_id: String,
    /// HGB outside the physiologically plausible range.
    pub outlier_alert: bool,
    /// `None` only for outliers, which are not tiered.
    pub severity: Option<SeverityTier>,
    /// Set only for moderate anemia.
    pub suggested_cause: Option<SuggestedCause>,
    pub recommendation: String,
}
