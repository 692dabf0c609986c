//! # hemaguard-model
//!
//! The trained-model side of HemaGuard.
//!
//! [`ForestClassifier`] loads a tree-ensemble artifact from a model directory
//! and implements [`Classifier`](hemaguard_core::traits::Classifier). The
//! manifest pins the feature order and the SHA-256 of the model file; a
//! mismatch on either is a load error, never a silent misprediction.
//!
//! [`evaluate`](evaluate::evaluate) scores a classifier against a labeled
//! table.

pub mod artifact;
pub mod evaluate;
pub mod forest;

pub use artifact::{DecisionTree, ForestArtifact, ModelManifest, Node};
pub use evaluate::{evaluate, ValidationReport};
pub use forest::ForestClassifier;

// ── Tests ─────────────────────────────────────────────────────────────────────
