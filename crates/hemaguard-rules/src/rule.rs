//! Rule configuration schema and the ordered triage rule list.
//!
//! A `RuleConfig` is deserialized from TOML. Every section and key is
//! optional: omitted values fall back to the clinical defaults below, so an
//! empty document is a valid configuration.
//!
//! The triage rules themselves are not configurable in order. `TRIAGE_ORDER`
//! is evaluated top-to-bottom and the first match wins; the outlier rule must
//! stay first so an implausible HGB overrides whatever the model predicted.

use serde::{Deserialize, Serialize};

use hemaguard_contracts::triage::TriageInput;

/// Thresholds for ground-truth labeling during dataset preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingThresholds {
    /// HGB below this is anemic for men and for records with unknown gender.
    pub male_hgb: f64,
    /// HGB below this is anemic for women.
    pub female_hgb: f64,
    /// Flat cutoff the batch normalizer uses when gender cannot be resolved.
    pub fallback_hgb: f64,
    /// HGB below this raises the emergency flag.
    pub emergency_hgb: f64,
    /// RDW at or above this (and at or below `medium_rdw_max`) is medium risk.
    pub medium_rdw_min: f64,
    /// RDW above this is high risk.
    pub medium_rdw_max: f64,
}

impl Default for LabelingThresholds {
    fn default() -> Self {
        Self {
            male_hgb: 13.0,
            female_hgb: 12.0,
            fallback_hgb: 12.5,
            emergency_hgb: 7.0,
            medium_rdw_min: 14.0,
            medium_rdw_max: 15.5,
        }
    }
}

/// Thresholds for the live triage rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageThresholds {
    pub outlier_hgb_min: f64,
    pub outlier_hgb_max: f64,
    pub severe_hgb: f64,
    /// Mentzer index below this points to thalassemia.
    pub thalassemia_mentzer: f64,
    pub high_risk_rdw: f64,
    pub high_risk_hgb: f64,
    /// Lower, exclusive bound of the guarded RDW band; `high_risk_rdw` is the
    /// inclusive upper bound.
    pub guarded_rdw: f64,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            outlier_hgb_min: 3.0,
            outlier_hgb_max: 22.0,
            severe_hgb: 7.0,
            thalassemia_mentzer: 13.0,
            high_risk_rdw: 15.0,
            high_risk_hgb: 12.5,
            guarded_rdw: 14.0,
        }
    }
}

/// Recommendation texts, one per triage rule.
///
/// `moderate` is a template: `{cause}` and `{mentzer}` are substituted with
/// the suggested cause and the Mentzer index to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageMessages {
    pub outlier: String,
    pub severe: String,
    pub moderate: String,
    pub high_risk: String,
    pub guarded: String,
    pub optimal: String,
}

impl Default for TriageMessages {
    fn default() -> Self {
        Self {
            outlier: "The hemoglobin value is outside the physiological range for a living \
                      patient. Please verify the lab sample or sensor calibration."
                .to_string(),
            severe: "Urgent action required: consult a physician immediately for a blood \
                     transfusion. This level of anemia is critical for organ oxygenation."
                .to_string(),
            moderate: "Potential type: {cause} (based on Mentzer Index of {mentzer}). Schedule a \
                       hematology consultation for an iron profile and B12 test."
                .to_string(),
            high_risk: "Prevention plan: borderline values detected. Increase iron-rich food \
                        intake and re-test in 3 months."
                .to_string(),
            guarded: "Prevention plan: maintain balanced nutrition. Watch for fatigue symptoms."
                .to_string(),
            optimal: "All blood markers are within safe clinical ranges. No intervention required."
                .to_string(),
        }
    }
}

/// The top-level structure deserialized from a TOML rule file.
///
/// Example:
/// ```toml
/// [triage]
/// severe_hgb = 7.0
///
/// [messages]
/// optimal = "No intervention required."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub labeling: LabelingThresholds,
    pub triage: TriageThresholds,
    pub messages: TriageMessages,
}

/// One row of the triage decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriageRule {
    Outlier,
    SevereAnemia,
    ModerateAnemia,
    HighRisk,
    Guarded,
    Optimal,
}

/// Evaluation order. First match wins; `Optimal` always matches.
pub const TRIAGE_ORDER: [TriageRule; 6] = [
    TriageRule::Outlier,
    TriageRule::SevereAnemia,
    TriageRule::ModerateAnemia,
    TriageRule::HighRisk,
    TriageRule::Guarded,
    TriageRule::Optimal,
];

impl TriageRule {
    /// Stable identifier, used in logs and `TriageResult::rule_id`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Outlier => "outlier",
            Self::SevereAnemia => "severe-anemia",
            Self::ModerateAnemia => "moderate-anemia",
            Self::HighRisk => "high-risk",
            Self::Guarded => "guarded",
            Self::Optimal => "optimal",
        }
    }

    /// Return true if this rule's condition holds for `input`.
    ///
    /// Label-based rules check the label themselves, so each row reads
    /// correctly on its own; the table order still decides ties.
    pub fn matches(self, input: &TriageInput, t: &TriageThresholds) -> bool {
        let anemic = input.label.is_anemic();
        match self {
            Self::Outlier => input.hgb < t.outlier_hgb_min || input.hgb > t.outlier_hgb_max,
            Self::SevereAnemia => anemic && input.hgb < t.severe_hgb,
            Self::ModerateAnemia => anemic,
            Self::HighRisk => !anemic && (input.rdw > t.high_risk_rdw || input.hgb < t.high_risk_hgb),
            Self::Guarded => {
                !anemic && input.rdw > t.guarded_rdw && input.rdw <= t.high_risk_rdw
            }
            Self::Optimal => true,
        }
    }
}
