//! Classifier output and the per-inference report handed to presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::label::Label;
use crate::triage::TriageResult;

/// Raw classifier output for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of the anemic class, in [0, 1].
    pub probability: f64,
}

impl Prediction {
    /// Derive the label from a probability: anemic only when strictly above 0.5.
    pub fn from_probability(probability: f64) -> Self {
        let label = if probability > 0.5 { Label::Anemic } else { Label::Healthy };
        Self { label, probability }
    }

    /// Confidence in the predicted label: P(anemic) for anemic predictions,
    /// 1 − P(anemic) otherwise.
    pub fn confidence(&self) -> f64 {
        match self.label {
            Label::Anemic => self.probability,
            Label::Healthy => 1.0 - self.probability,
        }
    }
}

/// One feature and its model-wide importance weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// Everything the presentation layer needs for one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceReport {
    pub id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub prediction: Prediction,
    pub triage: TriageResult,
    pub mentzer_index: f64,
    /// The highest-weighted feature.
    pub primary_driver: String,
    /// All features, heaviest first.
    pub ranked_importances: Vec<FeatureWeight>,
    /// Human-readable "why this result" text.
    pub explanation: String,
}
