//! The inference orchestrator: one patient record in, one report out.
//!
//! Pipeline per call:
//!
//!   Record → FeatureEngineer → vector in model order → Classifier::predict
//!     → TriageEngine::triage → primary driver + explanation
//!
//! The orchestrator is built once at startup with the loaded model and rule
//! set and is only ever borrowed afterwards. `infer` takes `&self` and touches
//! no shared mutable state, so one instance can serve concurrent callers
//! behind an `Arc`.

use std::cmp::Ordering;

use chrono::Utc;
use tracing::{debug, info};

use hemaguard_contracts::{
    error::HemaResult,
    markers,
    record::PatientRecord,
    report::{FeatureWeight, InferenceReport, Prediction},
    triage::TriageInput,
};

use crate::features::FeatureEngineer;
use crate::traits::{Classifier, TriageEngine};

pub struct InferenceOrchestrator {
    engineer: FeatureEngineer,
    classifier: Box<dyn Classifier>,
    triage: Box<dyn TriageEngine>,
}

impl InferenceOrchestrator {
    /// Wire a loaded classifier and rule set together.
    pub fn new(classifier: Box<dyn Classifier>, triage: Box<dyn TriageEngine>) -> Self {
        Self {
            engineer: FeatureEngineer::new(),
            classifier,
            triage,
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Run the full pipeline for one record.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` when HGB, RBC, MCV, or RDW is missing; the first three
    /// feed the feature engineer and RDW feeds the triage rules. Classifier
    /// errors are propagated unchanged. A failure affects this record only.
    pub fn infer(&self, record: &PatientRecord) -> HemaResult<InferenceReport> {
        let features = self.engineer.engineer(record)?;
        let rdw = record.require(markers::RDW)?;

        let vector = features.vector(self.classifier.feature_order());
        let prediction = self.classifier.predict(&vector)?;

        debug!(
            label = %prediction.label,
            probability = prediction.probability,
            "classifier prediction"
        );

        let input = TriageInput {
            hgb: features.hgb(),
            rdw,
            mentzer_index: features.mentzer_index(),
            label: prediction.label,
            probability: prediction.probability,
        };
        let triage = self.triage.triage(&input);

        let ranked = rank_importances(self.classifier.feature_importances());
        let primary_driver = ranked
            .first()
            .map(|w| w.feature.clone())
            .unwrap_or_else(|| markers::HGB.to_string());

        let explanation = self.explain(&primary_driver, &prediction, input.mentzer_index);

        info!(
            rule_id = %triage.rule_id,
            outlier = triage.outlier_alert,
            primary_driver = %primary_driver,
            "inference complete"
        );

        Ok(InferenceReport {
            id: uuid::Uuid::new_v4(),
            created_at: Utc::now(),
            prediction,
            triage,
            mentzer_index: input.mentzer_index,
            primary_driver,
            ranked_importances: ranked,
            explanation,
        })
    }

    fn explain(&self, driver: &str, prediction: &Prediction, mentzer_index: f64) -> String {
        let mut text = format!(
            "The primary driver for this diagnosis is {driver}. In clinical terms, the {driver} \
             value deviates most significantly from the healthy baseline, pushing the model's \
             confidence to {:.1}%.",
            prediction.probability * 100.0
        );
        if prediction.label.is_anemic() {
            let profile = self.triage.mentzer_profile(mentzer_index).profile();
            text.push_str(&format!(
                " Expert note: the Mentzer Index ({mentzer_index:.2}) further supports a {profile} profile."
            ));
        }
        text
    }
}

/// Sort importances heaviest first. Ties keep model order.
pub fn rank_importances(weights: &[FeatureWeight]) -> Vec<FeatureWeight> {
    let mut ranked = weights.to_vec();
    ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    ranked
}

// ── Tests ────────────────────────────────────────────────────────────────────
