//! Row-by-row inference over a normalized table.

use tracing::{info, warn};

use hemaguard_core::InferenceOrchestrator;
use hemaguard_dataset::{Cell, Table};

pub const PREDICTION: &str = "Prediction";
pub const PROBABILITY: &str = "Probability";
pub const SEVERITY: &str = "Severity";
pub const SUGGESTED_CAUSE: &str = "Suggested_Cause";
pub const OUTLIER_ALERT: &str = "Outlier_Alert";
pub const RULE: &str = "Rule";

pub struct BatchOutcome {
    pub table: Table,
    pub processed: usize,
    pub failed: usize,
}

/// Infer every row of `table` and append the result columns.
///
/// A row that fails inference keeps blank result cells; the rest of the
/// batch is unaffected.
pub fn run_batch(orchestrator: &InferenceOrchestrator, mut table: Table) -> BatchOutcome {
    let rows = table.len();
    let mut prediction = Vec::with_capacity(rows);
    let mut probability = Vec::with_capacity(rows);
    let mut severity = Vec::with_capacity(rows);
    let mut cause = Vec::with_capacity(rows);
    let mut outlier = Vec::with_capacity(rows);
    let mut rule = Vec::with_capacity(rows);
    let mut failed = 0;

    for row in 0..rows {
        match orchestrator.infer(&table.record(row)) {
            Ok(report) => {
                prediction.push(Cell::Number(f64::from(report.prediction.label.code())));
                probability.push(Cell::Number(report.prediction.probability));
                severity.push(text_or_missing(report.triage.severity.map(|s| s.to_string())));
                cause.push(text_or_missing(report.triage.suggested_cause.map(|c| c.to_string())));
                outlier.push(Cell::Number(if report.triage.outlier_alert { 1.0 } else { 0.0 }));
                rule.push(Cell::Text(report.triage.rule_id));
            }
            Err(e) => {
                warn!(row, error = %e, "row skipped");
                failed += 1;
                for column in [
                    &mut prediction,
                    &mut probability,
                    &mut severity,
                    &mut cause,
                    &mut outlier,
                    &mut rule,
                ] {
                    column.push(Cell::Missing);
                }
            }
        }
    }

    table.set_column(PREDICTION, prediction);
    table.set_column(PROBABILITY, probability);
    table.set_column(SEVERITY, severity);
    table.set_column(SUGGESTED_CAUSE, cause);
    table.set_column(OUTLIER_ALERT, outlier);
    table.set_column(RULE, rule);

    info!(rows, failed, "batch inference complete");
    BatchOutcome {
        table,
        processed: rows - failed,
        failed,
    }
}

fn text_or_missing(value: Option<String>) -> Cell {
    value.map(Cell::Text).unwrap_or(Cell::Missing)
}

#[cfg(test)]
mod tests {
    use hemaguard_contracts::{
        error::HemaResult,
        label::Label,
        report::{FeatureWeight, Prediction},
    };
    use hemaguard_core::{traits::Classifier, InferenceOrchestrator};
    use hemaguard_rules::RuleTriageEngine;

    use super::*;

    /// Anemic whenever HGB is below 12.
    struct HgbClassifier {
        order: Vec<String>,
        weights: Vec<FeatureWeight>,
    }

    impl HgbClassifier {
        fn new() -> Self {
            Self {
                order: vec!["HGB".to_string()],
                weights: vec![FeatureWeight { feature: "HGB".to_string(), weight: 1.0 }],
            }
        }
    }

    impl Classifier for HgbClassifier {
        fn feature_order(&self) -> &[String] {
            &self.order
        }

        fn predict(&self, vector: &[f64]) -> HemaResult<Prediction> {
            Ok(Prediction::from_probability(if vector[0] < 12.0 { 0.9 } else { 0.1 }))
        }

        fn feature_importances(&self) -> &[FeatureWeight] {
            &self.weights
        }
    }

    fn orchestrator() -> InferenceOrchestrator {
        InferenceOrchestrator::new(Box::new(HgbClassifier::new()), Box::new(RuleTriageEngine::default()))
    }

    #[test]
    fn test_batch_appends_result_columns() {
        let table = Table::from_reader(
            "HGB,RBC,MCV,RDW\n11.0,4.2,70,16\n14.5,5.0,90,12\n".as_bytes(),
        )
        .unwrap();

        let outcome = run_batch(&orchestrator(), table);
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.failed, 0);

        let t = &outcome.table;
        assert_eq!(
            t.numeric(PREDICTION).unwrap(),
            vec![Some(f64::from(Label::Anemic.code())), Some(0.0)]
        );
        assert_eq!(t.column(RULE).unwrap()[0], Cell::Text("moderate-anemia".to_string()));
        assert_eq!(
            t.column(SEVERITY).unwrap()[1],
            Cell::Text("Risk-Level-1/Optimal".to_string())
        );
        assert_eq!(
            t.column(SUGGESTED_CAUSE).unwrap()[0],
            Cell::Text("Nutritional/Iron-Deficiency".to_string())
        );
        assert!(t.column(SUGGESTED_CAUSE).unwrap()[1].is_missing());
    }

    #[test]
    fn test_failing_row_does_not_abort_batch() {
        // Second row has no RDW.
        let table =
            Table::from_reader("HGB,RBC,MCV,RDW\n11.0,4.2,70,16\n14.5,5.0,90,\n".as_bytes())
                .unwrap();

        let outcome = run_batch(&orchestrator(), table);
        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.failed, 1);
        assert!(outcome.table.column(PREDICTION).unwrap()[1].is_missing());
        assert!(!outcome.table.column(PREDICTION).unwrap()[0].is_missing());
    }
}
