//! TOML-configured triage engine implementation.
//!
//! `RuleTriageEngine` loads a `RuleConfig` from a TOML string or file and
//! implements the `TriageEngine` trait from hemaguard-core.
//!
//! Evaluation algorithm:
//!
//! 1. Iterate `TRIAGE_ORDER`.
//! 2. For the first rule whose condition matches, build the `TriageResult`
//!    from that rule's tier, cause, and message, and return.
//! 3. `Optimal` matches unconditionally, so evaluation always terminates with
//!    a result.

use std::path::Path;

use tracing::debug;

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    triage::{SeverityTier, SuggestedCause, TriageInput, TriageResult},
};
use hemaguard_core::traits::TriageEngine;

use crate::labeling::Labeler;
use crate::rule::{RuleConfig, TriageRule, TRIAGE_ORDER};

/// The rule file shipped with the crate.
const BUILTIN_RULES: &str = include_str!("../config/triage.toml");

/// A `TriageEngine` whose thresholds and messages come from TOML.
///
/// ```rust,ignore
/// use hemaguard_rules::RuleTriageEngine;
///
/// let engine = RuleTriageEngine::from_file(Path::new("config/triage.toml"))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleTriageEngine {
    config: RuleConfig,
}

impl RuleTriageEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// The engine configured from the crate's bundled `config/triage.toml`.
    pub fn builtin() -> HemaResult<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Parse `s` as TOML and build a `RuleTriageEngine`.
    ///
    /// Returns `HemaError::ConfigError` if the TOML is malformed or does not
    /// match the expected `RuleConfig` schema.
    pub fn from_toml_str(s: &str) -> HemaResult<Self> {
        let config: RuleConfig = toml::from_str(s).map_err(|e| HemaError::ConfigError {
            reason: format!("failed to parse rule TOML: {}", e),
        })?;
        Ok(Self { config })
    }

    /// Read the file at `path` and parse it as TOML rule configuration.
    pub fn from_file(path: &Path) -> HemaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HemaError::ConfigError {
            reason: format!("failed to read rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// A labeler sharing this engine's labeling thresholds.
    pub fn labeler(&self) -> Labeler {
        Labeler::new(self.config.labeling.clone())
    }

    /// Rule ids in evaluation order.
    pub fn rules(&self) -> Vec<&'static str> {
        TRIAGE_ORDER.iter().map(|r| r.id()).collect()
    }

    fn outcome(&self, rule: TriageRule, input: &TriageInput) -> TriageResult {
        let messages = &self.config.messages;
        let (severity, cause, recommendation) = match rule {
            TriageRule::Outlier => (None, None, messages.outlier.clone()),
            TriageRule::SevereAnemia => (
                Some(SeverityTier::SeverePriority1),
                None,
                messages.severe.clone(),
            ),
            TriageRule::ModerateAnemia => {
                let cause = self.mentzer_profile(input.mentzer_index);
                let text = messages
                    .moderate
                    .replace("{cause}", &cause.to_string())
                    .replace("{mentzer}", &format!("{:.1}", input.mentzer_index));
                (Some(SeverityTier::ModeratePriority2), Some(cause), text)
            }
            TriageRule::HighRisk => (
                Some(SeverityTier::RiskLevel3High),
                None,
                messages.high_risk.clone(),
            ),
            TriageRule::Guarded => (
                Some(SeverityTier::RiskLevel2Guarded),
                None,
                messages.guarded.clone(),
            ),
            TriageRule::Optimal => (
                Some(SeverityTier::RiskLevel1Optimal),
                None,
                messages.optimal.clone(),
            ),
        };

        TriageResult {
            rule_id: rule.id().to_string(),
            outlier_alert: rule == TriageRule::Outlier,
            severity,
            suggested_cause: cause,
            recommendation,
        }
    }
}

impl TriageEngine for RuleTriageEngine {
    /// Evaluate `input` against the ordered rule list.
    ///
    /// The outlier rule is tested first and short-circuits everything else,
    /// regardless of the predicted label.
    fn triage(&self, input: &TriageInput) -> TriageResult {
        debug!(
            hgb = input.hgb,
            rdw = input.rdw,
            label = %input.label,
            "evaluating triage rules"
        );

        let rule = TRIAGE_ORDER
            .iter()
            .copied()
            .find(|rule| rule.matches(input, &self.config.triage))
            .unwrap_or(TriageRule::Optimal);

        debug!(rule_id = rule.id(), "triage rule matched");
        self.outcome(rule, input)
    }

    fn mentzer_profile(&self, mentzer_index: f64) -> SuggestedCause {
        if mentzer_index < self.config.triage.thalassemia_mentzer {
            SuggestedCause::GeneticThalassemia
        } else {
            SuggestedCause::NutritionalIronDeficiency
        }
    }
}
