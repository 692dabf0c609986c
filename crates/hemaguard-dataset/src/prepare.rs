//! Training-data preparation: cleaning, lifestyle signatures, and labels.

use rand::{rngs::StdRng, seq::index, SeedableRng};
use tracing::{debug, info, warn};

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    markers,
    record::Gender,
};
use hemaguard_core::features::mentzer_index;
use hemaguard_rules::Labeler;

use crate::normalize::zip_with;
use crate::table::{Cell, Table};

/// Row identifiers carried by common CBC exports. Never features.
pub const IDENTIFIER_COLUMNS: [&str; 5] = ["Patient_ID", "Index", "Unnamed: 0", "id", "ID"];

const PREPARATION_REQUIRED: [&str; 4] = [markers::HGB, markers::RBC, markers::MCV, markers::RDW];

#[derive(Debug, Clone)]
pub struct PreparationOptions {
    /// When false the signature columns are still emitted, all zero.
    pub inject_signatures: bool,
    pub smoker_fraction: f64,
    pub smoker_seed: u64,
    pub athlete_fraction: f64,
    pub athlete_seed: u64,
}

impl Default for PreparationOptions {
    fn default() -> Self {
        Self {
            inject_signatures: true,
            smoker_fraction: 0.10,
            smoker_seed: 42,
            athlete_fraction: 0.05,
            athlete_seed: 7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingPreparer {
    labeler: Labeler,
    options: PreparationOptions,
}

impl TrainingPreparer {
    pub fn new(labeler: Labeler, options: PreparationOptions) -> Self {
        Self { labeler, options }
    }

    pub fn options(&self) -> &PreparationOptions {
        &self.options
    }

    /// Turn a raw CBC table into a labeled training table.
    ///
    /// Adds `Mentzer_Index`, `is_smoker`, `is_athlete`, `Target`,
    /// `Risk_Score` and `Is_Emergency`. Text in HGB, RBC, MCV, RDW or WBC
    /// counts as missing and is median-filled. A blank `Gender` stays blank
    /// and labels with the male threshold.
    pub fn prepare(&self, mut table: Table) -> HemaResult<Table> {
        for name in IDENTIFIER_COLUMNS {
            if table.drop_column(name) {
                debug!(column = name, "dropped identifier column");
            }
        }

        for name in PREPARATION_REQUIRED {
            if !table.has(name) {
                return Err(HemaError::dataset_schema(format!(
                    "training data requires a '{}' column",
                    name
                )));
            }
        }

        for name in PREPARATION_REQUIRED.into_iter().chain([markers::WBC]) {
            if let Some(failed) = table.coerce_numeric(name) {
                if failed > 0 {
                    warn!(column = name, failed, "non-numeric cells treated as missing");
                }
            }
        }
        let filled = table.fill_missing_with_median();

        let mut hgb = complete_column(&table, markers::HGB)?;
        let rbc = complete_column(&table, markers::RBC)?;
        let mcv = complete_column(&table, markers::MCV)?;
        let rdw = complete_column(&table, markers::RDW)?;

        let mentzer = zip_with(&wrap(&mcv), &wrap(&rbc), mentzer_index);
        table.set_numeric(markers::MENTZER_INDEX, mentzer);

        // ── Lifestyle signatures ─────────────────────────────────────────────
        let rows = table.len();
        let mut is_smoker = vec![0.0; rows];
        let mut is_athlete = vec![0.0; rows];

        if self.options.inject_signatures {
            let mut wbc = table.numeric(markers::WBC);

            for row in sample_rows(rows, self.options.smoker_fraction, self.options.smoker_seed) {
                is_smoker[row] = 1.0;
                hgb[row] *= 1.05;
                if let Some(v) = wbc.as_mut().and_then(|w| w[row].as_mut()) {
                    *v *= 1.3;
                }
            }
            for row in sample_rows(rows, self.options.athlete_fraction, self.options.athlete_seed) {
                is_athlete[row] = 1.0;
                hgb[row] *= 0.95;
            }

            if let Some(wbc) = wbc {
                table.set_numeric(markers::WBC, wbc);
            }
            table.set_numeric(markers::HGB, wrap(&hgb));
            debug!(
                smokers = is_smoker.iter().filter(|v| **v == 1.0).count(),
                athletes = is_athlete.iter().filter(|v| **v == 1.0).count(),
                "lifestyle signatures injected"
            );
        }
        table.set_numeric(markers::IS_SMOKER, wrap(&is_smoker));
        table.set_numeric(markers::IS_ATHLETE, wrap(&is_athlete));

        // ── Labels ───────────────────────────────────────────────────────────
        let genders: Vec<Option<Gender>> = match table.column(markers::GENDER) {
            Some(cells) => cells.iter().map(|c| Gender::parse(&c.to_field())).collect(),
            None => vec![None; rows],
        };

        let mut target = Vec::with_capacity(rows);
        let mut risk = Vec::with_capacity(rows);
        let mut emergency = Vec::with_capacity(rows);
        for row in 0..rows {
            let outcome = self.labeler.label(hgb[row], rdw[row], genders[row]);
            target.push(Cell::Number(f64::from(outcome.label.code())));
            risk.push(Cell::Number(f64::from(outcome.risk_tier.code())));
            emergency.push(Cell::Number(if outcome.emergency { 1.0 } else { 0.0 }));
        }
        let anemic = target.iter().filter(|c| c.as_f64() == Some(1.0)).count();

        table.set_column(markers::TARGET, target);
        table.set_column(markers::RISK_SCORE, risk);
        table.set_column(markers::IS_EMERGENCY, emergency);

        info!(rows, anemic, filled, "training data prepared");
        Ok(table)
    }
}

/// Rows chosen for one signature: `round(fraction * rows)` distinct indices
/// drawn with a generator seeded from `seed`.
pub fn sample_rows(rows: usize, fraction: f64, seed: u64) -> Vec<usize> {
    let amount = ((rows as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, rows, amount.min(rows)).into_vec();
    picked.sort_unstable();
    picked
}

fn complete_column(table: &Table, name: &str) -> HemaResult<Vec<f64>> {
    let values = table
        .numeric(name)
        .ok_or_else(|| HemaError::dataset_schema(format!("column '{}' is absent", name)))?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                HemaError::dataset_schema(format!(
                    "column '{}' has no numeric value at row {} after filling",
                    name, row
                ))
            })
        })
        .collect()
}

fn wrap(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

#[cfg(test)]
mod tests {
    use hemaguard_contracts::{error::HemaError, markers};

    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    fn plain() -> TrainingPreparer {
        TrainingPreparer::new(
            Labeler::default(),
            PreparationOptions { inject_signatures: false, ..Default::default() },
        )
    }

    fn column(table: &Table, name: &str) -> Vec<f64> {
        table.numeric(name).unwrap().into_iter().map(|v| v.unwrap()).collect()
    }

    const CBC: &str = "\
Patient_ID,HGB,RBC,MCV,RDW,WBC,Gender
1,11.0,4.2,70,16,7.0,0
2,13.5,5.0,88,14.3,6.5,1
3,6.5,3.0,80,13,8.0,0
4,,4.5,90,15.8,7.2,1
5,14.2,4.9,89,,6.1,0
";

    #[test]
    fn test_identifier_columns_dropped() {
        let out = plain().prepare(table(CBC)).unwrap();
        assert!(!out.has("Patient_ID"));
        assert!(out.has(markers::HGB));
    }

    #[test]
    fn test_labels_risk_and_emergency() {
        let out = plain().prepare(table(CBC)).unwrap();

        assert_eq!(column(&out, markers::TARGET), vec![1.0, 0.0, 1.0, 0.0, 0.0]);
        // Row 3 HGB filled with median 12.25: female, not anemic, RDW 15.8.
        assert_eq!(column(&out, markers::RISK_SCORE), vec![-1.0, 1.0, -1.0, 2.0, 1.0]);
        assert_eq!(column(&out, markers::IS_EMERGENCY), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_median_fill_and_mentzer() {
        let out = plain().prepare(table(CBC)).unwrap();

        assert_eq!(column(&out, markers::HGB)[3], 12.25);
        // RDW median of 16, 14.3, 13, 15.8.
        assert!((column(&out, markers::RDW)[4] - 15.05).abs() < 1e-9);
        assert!((column(&out, markers::MENTZER_INDEX)[0] - 70.0 / 4.2).abs() < 1e-4);
    }

    #[test]
    fn test_signature_columns_zero_without_injection() {
        let out = plain().prepare(table(CBC)).unwrap();
        assert!(column(&out, markers::IS_SMOKER).iter().all(|v| *v == 0.0));
        assert!(column(&out, markers::IS_ATHLETE).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_missing_rdw_column_is_schema_error() {
        let csv = "HGB,RBC,MCV\n12.0,4.5,90\n";
        let err = plain().prepare(table(csv)).unwrap_err();
        match err {
            HemaError::DatasetSchema { reason } => assert!(reason.contains("RDW")),
            other => panic!("expected DatasetSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_text_cells_are_median_filled() {
        let csv = "HGB,RBC,MCV,RDW,WBC\n11.0,4.2,70,16,7.0\nn/a,4.5,?,15,high\n13.0,4.8,90,13,6.0\n";
        let out = plain().prepare(table(csv)).unwrap();

        assert_eq!(column(&out, markers::HGB)[1], 12.0);
        assert_eq!(column(&out, markers::MCV)[1], 80.0);
        assert_eq!(column(&out, markers::WBC)[1], 6.5);
        // 12.0 < 13.0 with no gender column.
        assert_eq!(column(&out, markers::TARGET)[1], 1.0);
    }

    #[test]
    fn test_blank_gender_is_not_median_filled() {
        let csv = "HGB,RBC,MCV,RDW,Gender\n12.5,4.2,80,13,0\n12.5,4.2,80,13,1\n12.5,4.2,80,13,\n";
        let out = plain().prepare(table(csv)).unwrap();

        assert!(out.column(markers::GENDER).unwrap()[2].is_missing());
        // Male 12.5 < 13.0, female 12.5 ≥ 12.0, unknown uses the male threshold.
        assert_eq!(column(&out, markers::TARGET), vec![1.0, 0.0, 1.0]);
    }

    // ── Signature injection ───────────────────────────────────────────────────

    fn large_table(rows: usize) -> Table {
        let mut csv = String::from("HGB,RBC,MCV,RDW,WBC\n");
        for _ in 0..rows {
            csv.push_str("14.0,5.0,90,13,7.0\n");
        }
        table(&csv)
    }

    #[test]
    fn test_signature_fractions() {
        let out = TrainingPreparer::default().prepare(large_table(200)).unwrap();

        let smokers = column(&out, markers::IS_SMOKER);
        let athletes = column(&out, markers::IS_ATHLETE);
        assert_eq!(smokers.iter().filter(|v| **v == 1.0).count(), 20);
        assert_eq!(athletes.iter().filter(|v| **v == 1.0).count(), 10);
    }

    #[test]
    fn test_signature_effects() {
        let out = TrainingPreparer::default().prepare(large_table(100)).unwrap();

        let smokers = column(&out, markers::IS_SMOKER);
        let athletes = column(&out, markers::IS_ATHLETE);
        let hgb = column(&out, markers::HGB);
        let wbc = column(&out, markers::WBC);

        for row in 0..100 {
            let mut expected_hgb = 14.0;
            let mut expected_wbc = 7.0;
            if smokers[row] == 1.0 {
                expected_hgb *= 1.05;
                expected_wbc *= 1.3;
            }
            if athletes[row] == 1.0 {
                expected_hgb *= 0.95;
            }
            assert!((hgb[row] - expected_hgb).abs() < 1e-9, "row {row}");
            assert!((wbc[row] - expected_wbc).abs() < 1e-9, "row {row}");
        }
    }

    #[test]
    fn test_injection_is_reproducible() {
        let a = TrainingPreparer::default().prepare(large_table(50)).unwrap();
        let b = TrainingPreparer::default().prepare(large_table(50)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_rows_bounds() {
        assert!(sample_rows(0, 0.1, 42).is_empty());
        assert_eq!(sample_rows(3, 1.0, 1), vec![0, 1, 2]);
        assert_eq!(sample_rows(10, 0.1, 42).len(), 1);
    }
}
