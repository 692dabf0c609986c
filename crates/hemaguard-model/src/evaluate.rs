//! Hold-out validation of a classifier against a labeled table.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    label::Label,
    markers,
};
use hemaguard_core::traits::Classifier;
use hemaguard_dataset::Table;

/// Probabilities are clipped to `[LOG_LOSS_EPSILON, 1 - LOG_LOSS_EPSILON]`.
pub const LOG_LOSS_EPSILON: f64 = 1e-15;

/// Source column used for `WBC` when the table has no `WBC` column.
const WBC_SOURCE: &str = "TLC";

/// Precision, recall and F1 for one class. Undefined ratios are 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub accuracy: f64,
    pub log_loss: f64,
    /// `confusion[actual][predicted]`, indexed by label code.
    pub confusion: [[usize; 2]; 2],
    pub classes: [ClassMetrics; 2],
}

impl ValidationReport {
    /// Unweighted mean of the per-class metrics as (precision, recall, F1).
    pub fn macro_average(&self) -> (f64, f64, f64) {
        let [a, b] = self.classes;
        (
            (a.precision + b.precision) / 2.0,
            (a.recall + b.recall) / 2.0,
            (a.f1 + b.f1) / 2.0,
        )
    }

    /// Support-weighted mean of the per-class metrics.
    pub fn weighted_average(&self) -> (f64, f64, f64) {
        let total = self.rows as f64;
        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        self.classes.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            let w = c.support as f64 / total;
            (acc.0 + w * c.precision, acc.1 + w * c.recall, acc.2 + w * c.f1)
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:  {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "Log loss:  {:.4}", self.log_loss)?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = actual, columns = predicted)")?;
        writeln!(f, "{:>12} {:>8} {:>8}", "", "healthy", "anemic")?;
        writeln!(
            f,
            "{:>12} {:>8} {:>8}",
            "healthy", self.confusion[0][0], self.confusion[0][1]
        )?;
        writeln!(
            f,
            "{:>12} {:>8} {:>8}",
            "anemic", self.confusion[1][0], self.confusion[1][1]
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label.to_string(),
                c.precision,
                c.recall,
                c.f1,
                c.support
            )?;
        }
        let (p, r, f1) = self.macro_average();
        writeln!(f, "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}", "macro avg", p, r, f1, self.rows)?;
        let (p, r, f1) = self.weighted_average();
        write!(f, "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}", "weighted avg", p, r, f1, self.rows)
    }
}

/// Build one feature vector per row in `features` order.
///
/// Absent columns and missing cells become 0.0. `WBC` falls back to `TLC`
/// when only the latter is present.
pub fn align_features(table: &Table, features: &[String]) -> Vec<Vec<f64>> {
    let columns: Vec<Option<Vec<Option<f64>>>> = features
        .iter()
        .map(|name| {
            let column = table.numeric(name).or_else(|| {
                if name == markers::WBC {
                    table.numeric(WBC_SOURCE)
                } else {
                    None
                }
            });
            if column.is_none() {
                warn!(feature = %name, "feature absent from table, using 0.0");
            }
            column
        })
        .collect();

    (0..table.len())
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    column
                        .as_ref()
                        .and_then(|values| values[row])
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect()
}

/// Predict every row of `table` and score against its `Target` column.
///
/// # Errors
///
/// `DatasetSchema` when the table is empty, lacks `Target`, or holds a
/// target that is not 0 or 1. Prediction errors are propagated.
pub fn evaluate(classifier: &dyn Classifier, table: &Table) -> HemaResult<ValidationReport> {
    if table.is_empty() {
        return Err(HemaError::dataset_schema("validation table has no rows"));
    }
    let targets = table.numeric(markers::TARGET).ok_or_else(|| {
        HemaError::dataset_schema(format!("validation table lacks a '{}' column", markers::TARGET))
    })?;
    let actual: Vec<Label> = targets
        .iter()
        .enumerate()
        .map(|(row, v)| match *v {
            Some(code) if code == 0.0 => Ok(Label::Healthy),
            Some(code) if code == 1.0 => Ok(Label::Anemic),
            _ => Err(HemaError::dataset_schema(format!(
                "row {} has target {:?}; expected 0 or 1",
                row, v
            ))),
        })
        .collect::<HemaResult<_>>()?;

    let vectors = align_features(table, classifier.feature_order());
    let mut probabilities = Vec::with_capacity(vectors.len());
    let mut predicted = Vec::with_capacity(vectors.len());
    for vector in &vectors {
        let prediction = classifier.predict(vector)?;
        probabilities.push(prediction.probability);
        predicted.push(prediction.label);
    }

    let report = score(&actual, &predicted, &probabilities);
    info!(
        rows = report.rows,
        accuracy = report.accuracy,
        log_loss = report.log_loss,
        "validation complete"
    );
    Ok(report)
}

/// Compute the metrics from aligned slices of actual labels, predicted
/// labels, and predicted P(anemic).
pub fn score(actual: &[Label], predicted: &[Label], probabilities: &[f64]) -> ValidationReport {
    let rows = actual.len();
    let mut confusion = [[0usize; 2]; 2];
    for (a, p) in actual.iter().zip(predicted) {
        confusion[a.code() as usize][p.code() as usize] += 1;
    }

    let correct = confusion[0][0] + confusion[1][1];
    let accuracy = if rows == 0 { 0.0 } else { correct as f64 / rows as f64 };

    let log_loss = if rows == 0 {
        0.0
    } else {
        let total: f64 = actual
            .iter()
            .zip(probabilities)
            .map(|(a, p)| {
                let p = p.clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON);
                if a.is_anemic() {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum();
        total / rows as f64
    };

    let classes = [Label::Healthy, Label::Anemic].map(|label| {
        let c = label.code() as usize;
        let tp = confusion[c][c];
        let predicted_c = confusion[0][c] + confusion[1][c];
        let support = confusion[c][0] + confusion[c][1];
        let precision = ratio(tp, predicted_c);
        let recall = ratio(tp, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        ClassMetrics {
            label,
            precision,
            recall,
            f1,
            support,
        }
    });

    ValidationReport {
        rows,
        accuracy,
        log_loss,
        confusion,
        classes,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
