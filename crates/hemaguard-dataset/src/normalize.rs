//! Reconciles an externally sourced CBC dataset with the canonical schema.
//!
//! Steps run in a fixed order; several depend on earlier ones:
//!
//! 1. Trim column names.
//! 2. Coerce the known lab columns to numbers (failures become missing).
//! 3. Rename synonyms (`Sex`, `TLC`, `PCV`, `PLT /mm3`).
//! 4. Backfill HCT, MCH, and MCHC from HGB and RBC.
//! 5. Default absent optional feature columns to 0.0.
//! 6. Compute `Mentzer_Index`.
//! 7. Compute the `Target` label.
//! 8. Median-fill whatever is still missing.
//!
//! The median in step 8 is a batch statistic, so the whole table must be in
//! memory. A run either returns the full normalized table or an error.

use tracing::{debug, info, warn};

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    label::Label,
    markers::{self, DEFAULTED_FEATURES, REQUIRED_MARKERS},
    record::Gender,
};
use hemaguard_core::features::{estimate_hct, estimate_mch, estimate_mchc, mentzer_index};
use hemaguard_rules::Labeler;

use crate::table::{Cell, Table};

/// Source columns coerced to numbers before renaming.
pub const NUMERIC_SOURCE_COLUMNS: [&str; 9] =
    ["RBC", "MCV", "HGB", "PCV", "MCH", "MCHC", "RDW", "TLC", "PLT /mm3"];

/// `(source name, canonical name)` pairs.
pub const SYNONYMS: [(&str, &str); 4] = [
    ("Sex", markers::GENDER),
    ("TLC", markers::WBC),
    ("PCV", markers::HCT),
    ("PLT /mm3", markers::PLT),
];

#[derive(Debug, Clone, Default)]
pub struct NormalizerOptions {
    /// Keep a measured HCT column instead of replacing it with the
    /// rule-of-three estimate. Off by default: the estimate always wins.
    pub preserve_measured_hct: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetNormalizer {
    labeler: Labeler,
    options: NormalizerOptions,
}

impl DatasetNormalizer {
    pub fn new(labeler: Labeler, options: NormalizerOptions) -> Self {
        Self { labeler, options }
    }

    /// Normalize `table` into the canonical schema.
    ///
    /// # Errors
    ///
    /// `DatasetSchema` when HGB, RBC, or MCV is absent after synonym
    /// resolution; nothing downstream can be derived without them.
    pub fn normalize(&self, mut table: Table) -> HemaResult<Table> {
        // ── 1. Column names ──────────────────────────────────────────────────
        table.trim_names();
        debug!(columns = ?table.names(), "columns after trim");

        // ── 2. Numeric coercion ──────────────────────────────────────────────
        for name in NUMERIC_SOURCE_COLUMNS {
            if let Some(failed) = table.coerce_numeric(name) {
                if failed > 0 {
                    warn!(column = name, failed, "non-numeric cells treated as missing");
                }
            }
        }

        // ── 3. Synonyms ──────────────────────────────────────────────────────
        for (from, to) in SYNONYMS {
            if table.rename(from, to) {
                debug!(from, to, "renamed column");
            }
        }

        for name in REQUIRED_MARKERS {
            if !table.has(name) {
                return Err(HemaError::dataset_schema(format!(
                    "required column '{}' is absent and no synonym was found",
                    name
                )));
            }
        }

        let hgb = numeric(&table, markers::HGB)?;
        let rbc = numeric(&table, markers::RBC)?;
        let mcv = numeric(&table, markers::MCV)?;

        // ── 4. Derived indices ───────────────────────────────────────────────
        if !(self.options.preserve_measured_hct && table.has(markers::HCT)) {
            table.set_numeric(markers::HCT, hgb.iter().map(|h| h.map(estimate_hct)).collect());
        }
        let hct = numeric(&table, markers::HCT)?;

        table.set_numeric(markers::MCH, zip_with(&hgb, &rbc, estimate_mch));
        table.set_numeric(markers::MCHC, zip_with(&hgb, &hct, estimate_mchc));

        // ── 5. Optional feature defaults ─────────────────────────────────────
        for name in DEFAULTED_FEATURES {
            if table.ensure_constant(name, 0.0) {
                debug!(column = name, "absent feature defaulted to 0.0");
            }
        }

        // ── 6. Mentzer index ─────────────────────────────────────────────────
        table.set_numeric(markers::MENTZER_INDEX, zip_with(&mcv, &rbc, mentzer_index));

        // ── 7. Target label ──────────────────────────────────────────────────
        let genders: Vec<Option<Gender>> = match table.column(markers::GENDER) {
            Some(cells) => cells.iter().map(|c| Gender::parse(&c.to_field())).collect(),
            None => vec![None; table.len()],
        };
        let targets: Vec<Cell> = hgb
            .iter()
            .zip(&genders)
            .map(|(h, g)| {
                let label = match h {
                    Some(h) => self.labeler.batch_label(*h, *g),
                    None => Label::Healthy,
                };
                Cell::Number(f64::from(label.code()))
            })
            .collect();
        let anemic = targets.iter().filter(|c| c.as_f64() == Some(1.0)).count();
        table.set_column(markers::TARGET, targets);

        // ── 8. Median fill ───────────────────────────────────────────────────
        let filled = table.fill_missing_with_median();

        info!(rows = table.len(), anemic, filled, "dataset normalized");
        Ok(table)
    }
}

fn numeric(table: &Table, name: &str) -> HemaResult<Vec<Option<f64>>> {
    table
        .numeric(name)
        .ok_or_else(|| HemaError::dataset_schema(format!("column '{}' is absent", name)))
}

/// Apply `f` row-wise; a row is missing when either input is.
pub(crate) fn zip_with(
    a: &[Option<f64>],
    b: &[Option<f64>],
    f: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}
