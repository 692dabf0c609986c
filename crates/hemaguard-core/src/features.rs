//! Feature engineering: raw lab panel → engineered feature set.
//!
//! Every division adds `EPSILON` to its denominator so a zero count never
//! produces `inf`/`NaN`.
//!
//! Derivation order matters: HCT is estimated before MCHC, which divides by it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use hemaguard_contracts::{
    error::HemaResult,
    features::EngineeredFeatures,
    markers::{self, DEFAULTED_FEATURES},
    record::PatientRecord,
};

/// Denominator guard for every derived ratio.
pub const EPSILON: f64 = 1e-6;

/// `MCV / (RBC + ε)`. Below 13 suggests thalassemia trait, above suggests
/// iron deficiency.
pub fn mentzer_index(mcv: f64, rbc: f64) -> f64 {
    mcv / (rbc + EPSILON)
}

/// Hematocrit by the rule of three.
pub fn estimate_hct(hgb: f64) -> f64 {
    hgb * 3.0
}

/// Mean corpuscular hemoglobin (pg).
pub fn estimate_mch(hgb: f64, rbc: f64) -> f64 {
    (hgb / (rbc + EPSILON)) * 10.0
}

/// Mean corpuscular hemoglobin concentration (%).
pub fn estimate_mchc(hgb: f64, hct: f64) -> f64 {
    (hgb / (hct + EPSILON)) * 100.0
}

/// Form-entry ranges. Values outside them are logged, never rejected: an
/// implausible HGB must reach the outlier rule.
pub const SOFT_RANGES: [(&str, f64, f64); 5] = [
    (markers::HGB, 2.0, 25.0),
    (markers::RBC, 0.5, 10.0),
    (markers::MCV, 40.0, 150.0),
    (markers::MCH, 10.0, 50.0),
    (markers::RDW, 10.0, 30.0),
];

/// Names of the markers in `record` that fall outside `SOFT_RANGES`.
pub fn out_of_soft_range(record: &PatientRecord) -> Vec<&'static str> {
    SOFT_RANGES
        .iter()
        .filter(|(name, lo, hi)| record.get(name).is_some_and(|v| v < *lo || v > *hi))
        .map(|(name, _, _)| *name)
        .collect()
}

/// Turns a `PatientRecord` into `EngineeredFeatures`.
///
/// Stateless; one shared instance serves every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Engineer the full feature set for one record.
    ///
    /// Fails with `InvalidRecord` when HGB, RBC, or MCV is absent; those three
    /// are never defaulted. Measured HCT, MCH, and MCHC are kept; absent ones
    /// are estimated. Optional markers default to 0.0.
    pub fn engineer(&self, record: &PatientRecord) -> HemaResult<EngineeredFeatures> {
        let hgb = record.require(markers::HGB)?;
        let rbc = record.require(markers::RBC)?;
        let mcv = record.require(markers::MCV)?;

        for name in out_of_soft_range(record) {
            warn!(marker = name, value = ?record.get(name), "marker outside soft entry range");
        }

        let mut values: BTreeMap<String, f64> = record
            .markers()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        let hct = *values
            .entry(markers::HCT.to_string())
            .or_insert_with(|| estimate_hct(hgb));
        values
            .entry(markers::MCH.to_string())
            .or_insert_with(|| estimate_mch(hgb, rbc));
        values
            .entry(markers::MCHC.to_string())
            .or_insert_with(|| estimate_mchc(hgb, hct));

        for name in DEFAULTED_FEATURES {
            values.entry(name.to_string()).or_insert(0.0);
        }

        let mentzer = mentzer_index(mcv, rbc);
        values.insert(markers::MENTZER_INDEX.to_string(), mentzer);

        debug!(hgb, rbc, mcv, mentzer_index = mentzer, "features engineered");

        Ok(EngineeredFeatures::new(values, record.gender()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
