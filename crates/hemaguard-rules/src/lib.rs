//! # hemaguard-rules
//!
//! Clinical rule sets for HemaGuard.
//!
//! ## Overview
//!
//! This crate provides two independent rule sets sharing one TOML
//! configuration:
//!
//! - [`Labeler`]: ground-truth labels, RDW risk tiers, and the emergency flag
//!   used when preparing datasets.
//! - [`RuleTriageEngine`]: the live triage decision table, which implements
//!   the [`TriageEngine`](hemaguard_core::traits::TriageEngine) trait.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hemaguard_rules::RuleTriageEngine;
//!
//! let engine = RuleTriageEngine::builtin()?;
//! // Pass `engine` to `hemaguard_core::InferenceOrchestrator::new(...)`.
//! ```
//!
//! ## Rule order
//!
//! Triage rules are evaluated in a fixed order and the first match wins:
//! `outlier`, `severe-anemia`, `moderate-anemia`, `high-risk`, `guarded`,
//! `optimal`. Only thresholds and messages are configurable.

pub mod engine;
pub mod labeling;
pub mod rule;

pub use engine::RuleTriageEngine;
pub use labeling::Labeler;
pub use rule::{LabelingThresholds, RuleConfig, TriageMessages, TriageRule, TriageThresholds};

// ── Tests ─────────────────────────────────────────────────────────────────────
