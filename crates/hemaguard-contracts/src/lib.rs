//! # hemaguard-contracts
//!
//! Shared types for the HemaGuard anemia triage pipeline.
//!
//! Every crate in the workspace imports from here. No clinical rules live in
//! this crate: it holds only the data model, marker names, and error types.

pub mod error;
pub mod features;
pub mod label;
pub mod markers;
pub mod record;
pub mod report;
pub mod triage;

pub use error::{HemaError, HemaResult};
pub use features::EngineeredFeatures;
pub use label::{Label, LabelOutcome, RiskTier};
pub use record::{Gender, PatientRecord};
pub use report::{FeatureWeight, InferenceReport, Prediction};
pub use triage::{SeverityTier, SuggestedCause, TriageInput, TriageResult};

#[cfg(test)]
mod tests {
    use super::*;

    // ── Gender ───────────────────────────────────────────────────────────────

    #[test]
    fn gender_parse_accepts_male_encodings() {
        for raw in ["m", "0", "Male", " MALE ", "M"] {
            assert_eq!(Gender::parse(raw), Some(Gender::Male), "input {raw:?}");
        }
    }

    #[test]
    fn gender_parse_accepts_female_encodings() {
        for raw in ["f", "1", "female", "FEMALE", " F "] {
            assert_eq!(Gender::parse(raw), Some(Gender::Female), "input {raw:?}");
        }
    }

    #[test]
    fn gender_parse_accepts_float_codes() {
        assert_eq!(Gender::parse("0.0"), Some(Gender::Male));
        assert_eq!(Gender::parse("1.0"), Some(Gender::Female));
    }

    #[test]
    fn gender_parse_rejects_unknown() {
        assert_eq!(Gender::parse(""), None);
        assert_eq!(Gender::parse("other"), None);
        assert_eq!(Gender::parse("2"), None);
        assert_eq!(Gender::parse("nan"), None);
    }

    // ── PatientRecord ────────────────────────────────────────────────────────

    #[test]
    fn record_drops_non_numeric_values() {
        let record = PatientRecord::new()
            .with_raw(markers::HGB, "12.4")
            .with_raw(markers::RBC, "n/a")
            .with_raw(markers::MCV, "")
            .with(markers::RDW, f64::NAN);

        assert_eq!(record.get(markers::HGB), Some(12.4));
        assert_eq!(record.get(markers::RBC), None);
        assert_eq!(record.get(markers::MCV), None);
        assert_eq!(record.get(markers::RDW), None);
    }

    #[test]
    fn record_require_reports_missing_marker() {
        let record = PatientRecord::new().with(markers::HGB, 13.0);
        let err = record.require(markers::RBC).unwrap_err();
        match err {
            HemaError::InvalidRecord { reason } => assert!(reason.contains("RBC")),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn record_from_raw_resolves_gender() {
        let record = PatientRecord::from_raw([
            ("HGB", "11.2"),
            (" Gender ", "F"),
            ("RBC", "4.1"),
        ]);
        assert_eq!(record.gender(), Some(Gender::Female));
        assert_eq!(record.get("HGB"), Some(11.2));
        assert_eq!(record.get("RBC"), Some(4.1));
        assert_eq!(record.markers().count(), 2);
    }

    // ── Label / RiskTier ─────────────────────────────────────────────────────

    #[test]
    fn label_codes_round_trip() {
        assert_eq!(Label::from_code(Label::Anemic.code()), Some(Label::Anemic));
        assert_eq!(Label::from_code(Label::Healthy.code()), Some(Label::Healthy));
        assert_eq!(Label::from_code(7), None);
    }

    #[test]
    fn risk_tier_codes() {
        assert_eq!(RiskTier::NotApplicable.code(), -1);
        assert_eq!(RiskTier::Optimal.code(), 0);
        assert_eq!(RiskTier::Medium.code(), 1);
        assert_eq!(RiskTier::High.code(), 2);
    }

    // ── Prediction ───────────────────────────────────────────────────────────

    #[test]
    fn prediction_label_threshold_is_strict() {
        assert_eq!(Prediction::from_probability(0.5).label, Label::Healthy);
        assert_eq!(Prediction::from_probability(0.51).label, Label::Anemic);
    }

    #[test]
    fn prediction_confidence_follows_label() {
        let anemic = Prediction::from_probability(0.8);
        assert!((anemic.confidence() - 0.8).abs() < 1e-12);

        let healthy = Prediction::from_probability(0.2);
        assert!((healthy.confidence() - 0.8).abs() < 1e-12);
    }

    // ── Display strings ──────────────────────────────────────────────────────

    #[test]
    fn severity_and_cause_display() {
        assert_eq!(SeverityTier::SeverePriority1.to_string(), "Severe/Priority-1");
        assert_eq!(SeverityTier::RiskLevel2Guarded.to_string(), "Risk-Level-2/Guarded");
        assert_eq!(
            SuggestedCause::NutritionalIronDeficiency.to_string(),
            "Nutritional/Iron-Deficiency"
        );
        assert_eq!(SuggestedCause::GeneticThalassemia.profile(), "Genetic");
    }

    // ── TriageResult serde round-trip ────────────────────────────────────────

    #[test]
    fn triage_result_round_trips() {
        let original = TriageResult {
            rule_id: "moderate-anemia".to_string(),
            outlier_alert: false,
            severity: Some(SeverityTier::ModeratePriority2),
            suggested_cause: Some(SuggestedCause::GeneticThalassemia),
            recommendation: "Schedule a hematology consultation.".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: TriageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    // ── EngineeredFeatures ───────────────────────────────────────────────────

    #[test]
    fn feature_vector_follows_order_and_zero_fills() {
        let mut values = std::collections::BTreeMap::new();
        values.insert("HGB".to_string(), 13.0);
        values.insert("RBC".to_string(), 4.5);
        let features = EngineeredFeatures::new(values, None);

        let v = features.vector(&["RBC", "LY%", "HGB"]);
        assert_eq!(v, vec![4.5, 0.0, 13.0]);
    }

    // ── HemaError display messages ───────────────────────────────────────────

    #[test]
    fn error_display_messages() {
        let msg = HemaError::model_load("features.json not found").to_string();
        assert!(msg.contains("model load failed"));
        assert!(msg.contains("features.json"));

        let msg = HemaError::dataset_schema("column 'HGB' absent").to_string();
        assert!(msg.contains("dataset schema error"));

        let msg = HemaError::ConfigError { reason: "bad toml".to_string() }.to_string();
        assert!(msg.contains("configuration error"));
    }
}
