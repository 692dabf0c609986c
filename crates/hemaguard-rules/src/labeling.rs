//! Ground-truth labeling for dataset preparation.
//!
//! Two threshold policies coexist here on purpose:
//!
//! - `label` (training data): female 12.0, everyone else 13.0.
//! - `batch_label` (external validation data): female 12.0, male 13.0, and a
//!   flat `fallback_hgb` (12.5) when gender cannot be resolved.
//!
//! They disagree for records without a usable gender. Both are kept as-is.

use hemaguard_contracts::{
    label::{Label, LabelOutcome, RiskTier},
    record::Gender,
};

use crate::rule::LabelingThresholds;

#[derive(Debug, Clone, Default)]
pub struct Labeler {
    thresholds: LabelingThresholds,
}

impl Labeler {
    pub fn new(thresholds: LabelingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &LabelingThresholds {
        &self.thresholds
    }

    /// The anemia cutoff for `gender`; unknown gender uses the male cutoff.
    pub fn anemia_threshold(&self, gender: Option<Gender>) -> f64 {
        match gender {
            Some(Gender::Female) => self.thresholds.female_hgb,
            _ => self.thresholds.male_hgb,
        }
    }

    /// RDW band for a healthy record.
    pub fn risk_tier(&self, rdw: f64) -> RiskTier {
        let t = &self.thresholds;
        if rdw < t.medium_rdw_min {
            RiskTier::Optimal
        } else if rdw <= t.medium_rdw_max {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Label, risk tier, and emergency flag for one training record.
    pub fn label(&self, hgb: f64, rdw: f64, gender: Option<Gender>) -> LabelOutcome {
        let label = if hgb < self.anemia_threshold(gender) {
            Label::Anemic
        } else {
            Label::Healthy
        };
        let risk_tier = match label {
            Label::Anemic => RiskTier::NotApplicable,
            Label::Healthy => self.risk_tier(rdw),
        };
        LabelOutcome {
            label,
            risk_tier,
            emergency: hgb < self.thresholds.emergency_hgb,
        }
    }

    /// Label for one row of an externally sourced batch.
    pub fn batch_label(&self, hgb: f64, gender: Option<Gender>) -> Label {
        let threshold = match gender {
            Some(Gender::Male) => self.thresholds.male_hgb,
            Some(Gender::Female) => self.thresholds.female_hgb,
            None => self.thresholds.fallback_hgb,
        };
        if hgb < threshold {
            Label::Anemic
        } else {
            Label::Healthy
        }
    }
}
