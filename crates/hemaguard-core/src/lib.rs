//! # hemaguard-core
//!
//! The deterministic per-patient pipeline for HemaGuard.
//!
//! This crate provides:
//! - The feature engineer (`features`) and its derived-index formulas
//! - The two collaborator traits (`Classifier`, `TriageEngine`)
//! - The `InferenceOrchestrator` that wires them together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hemaguard_core::InferenceOrchestrator;
//!
//! let orchestrator = InferenceOrchestrator::new(Box::new(model), Box::new(rules));
//! let report = orchestrator.infer(&record)?;
//! ```

pub mod features;
pub mod orchestrator;
pub mod traits;

pub use features::FeatureEngineer;
pub use orchestrator::InferenceOrchestrator;
pub use traits::{Classifier, TriageEngine};
