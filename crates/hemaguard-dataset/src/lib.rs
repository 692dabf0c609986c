//! # hemaguard-dataset
//!
//! Batch-side data handling for HemaGuard.
//!
//! - [`Table`]: a column-oriented CSV table with explicit numeric coercion
//!   and median gap filling.
//! - [`DatasetNormalizer`]: maps an external CBC export onto the canonical
//!   schema and labels it.
//! - [`TrainingPreparer`]: cleans a CBC export for training, injects the
//!   seeded lifestyle signatures, and adds `Target`, `Risk_Score` and
//!   `Is_Emergency`.

pub mod normalize;
pub mod prepare;
pub mod stats;
pub mod table;

pub use normalize::{DatasetNormalizer, NormalizerOptions};
pub use prepare::{PreparationOptions, TrainingPreparer};
pub use table::{Cell, Table};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use hemaguard_contracts::{error::HemaError, markers, record::Gender};

    use crate::{Cell, Table};

    // ── 1. cell parsing ───────────────────────────────────────────────────────

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("12.5"), Cell::Number(12.5));
        assert_eq!(Cell::parse(" 7 "), Cell::Number(7.0));
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("   "), Cell::Missing);
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("inf"), Cell::Missing);
        assert_eq!(Cell::parse("M"), Cell::Text("M".to_string()));
    }

    // ── 2. table I/O ──────────────────────────────────────────────────────────

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_reader("A,B,C\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column("C").unwrap(), &[Cell::Missing]);
    }

    #[test]
    fn test_write_keeps_column_order_and_blanks() {
        let table = Table::from_reader("HGB,Sex,RDW\n12.5,F,\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        table.to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "HGB,Sex,RDW\n12.5,F,\n");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = Table::read_csv(std::path::Path::new("/nonexistent/cbc.csv"));
        assert!(matches!(result, Err(HemaError::Io { .. })));
    }

    // ── 3. column operations ──────────────────────────────────────────────────

    #[test]
    fn test_rename_replaces_existing_target() {
        let mut table = Table::from_reader("PCV,HCT,HGB\n40,1,13\n".as_bytes()).unwrap();
        assert!(table.rename("PCV", "HCT"));
        assert_eq!(table.names(), &["HCT".to_string(), "HGB".to_string()]);
        assert_eq!(table.numeric("HCT").unwrap(), vec![Some(40.0)]);
        assert!(!table.rename("TLC", "WBC"));
    }

    #[test]
    fn test_coerce_numeric_counts_failures() {
        let mut table = Table::from_reader("HGB,N\n12,1\nabc,2\n,3\n".as_bytes()).unwrap();
        assert_eq!(table.coerce_numeric("HGB"), Some(1));
        assert_eq!(table.numeric("HGB").unwrap(), vec![Some(12.0), None, None]);
        assert_eq!(table.coerce_numeric("RBC"), None);
    }

    #[test]
    fn test_median_fill_skips_text_columns() {
        let mut table = Table::from_reader("HGB,Sex\n10,M\n,\n14,F\n".as_bytes()).unwrap();
        assert_eq!(table.fill_missing_with_median(), 1);
        assert_eq!(table.numeric("HGB").unwrap(), vec![Some(10.0), Some(12.0), Some(14.0)]);
        assert!(table.column("Sex").unwrap()[1].is_missing());
    }

    #[test]
    fn test_median_fill_skips_numeric_gender() {
        let mut table = Table::from_reader("HGB,Gender\n10,0\n12,1\n14,\n".as_bytes()).unwrap();
        assert_eq!(table.fill_missing_with_median(), 0);
        assert!(table.column(markers::GENDER).unwrap()[2].is_missing());
    }

    #[test]
    fn test_ensure_constant_keeps_existing() {
        let mut table = Table::from_reader("RDW\n14\n".as_bytes()).unwrap();
        assert!(!table.ensure_constant(markers::RDW, 0.0));
        assert!(table.ensure_constant(markers::MPV, 0.0));
        assert_eq!(table.numeric(markers::RDW).unwrap(), vec![Some(14.0)]);
        assert_eq!(table.numeric(markers::MPV).unwrap(), vec![Some(0.0)]);
    }

    // ── 4. row records ────────────────────────────────────────────────────────

    #[test]
    fn test_record_from_row() {
        let table = Table::from_reader("HGB,RBC,Gender,Note\n11,4.2,F,x\n".as_bytes()).unwrap();
        let record = table.record(0);
        assert_eq!(record.get(markers::HGB), Some(11.0));
        assert_eq!(record.get(markers::RBC), Some(4.2));
        assert_eq!(record.get("Note"), None);
        assert_eq!(record.gender(), Some(Gender::Female));
    }
}
