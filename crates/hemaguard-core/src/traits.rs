//! Core trait definitions for the HemaGuard inference pipeline.
//!
//! Two seams separate the deterministic pipeline from its collaborators:
//!
//! - `Classifier`: the externally trained model (black box)
//! - `TriageEngine`: the clinical rule set applied to the model's output
//!
//! The orchestrator wires them together. Both are loaded once at startup and
//! are read-only afterwards, so implementations must be `Send + Sync`.

use hemaguard_contracts::{
    error::HemaResult,
    report::{FeatureWeight, Prediction},
    triage::{SuggestedCause, TriageInput, TriageResult},
};

/// A trained binary classifier over a fixed, ordered feature vector.
///
/// Implementations are immutable after load. They never retrain or adjust
/// themselves in response to `predict` calls.
pub trait Classifier: Send + Sync {
    /// The feature names the model was trained on, in vector order.
    ///
    /// Callers must build every vector passed to `predict` in exactly this
    /// order.
    fn feature_order(&self) -> &[String];

    /// Predict the anemia label and probability for one vector.
    ///
    /// Returns `HemaError::InvalidRecord` when the vector width does not match
    /// `feature_order()`.
    fn predict(&self, vector: &[f64]) -> HemaResult<Prediction>;

    /// Model-wide importance per feature, in `feature_order()`.
    ///
    /// Weights are non-negative and sum to 1.0.
    fn feature_importances(&self) -> &[FeatureWeight];
}

/// The live triage rule set.
pub trait TriageEngine: Send + Sync {
    /// Assign severity, cause, and a recommendation to one prediction.
    ///
    /// Must be deterministic: the same input always yields the same result.
    fn triage(&self, input: &TriageInput) -> TriageResult;

    /// The etiology profile a Mentzer index points to.
    ///
    /// Used for the explanation even when the firing rule sets no cause.
    fn mentzer_profile(&self, mentzer_index: f64) -> SuggestedCause;
}
