//! A small column-oriented table loaded from CSV.
//!
//! Cells keep their raw kind: numbers parse on load, anything else stays text,
//! and empty cells are `Missing`. Numeric coercion is explicit
//! (`coerce_numeric`), so a text value in a numeric column becomes missing
//! only when a caller asks for it.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    markers,
    record::{Gender, PatientRecord},
};

use crate::stats::median;

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Classify one raw CSV field.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            Ok(_) => Self::Missing,
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Number(v),
            _ => Self::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The CSV representation. Missing cells are empty.
    pub fn to_field(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl Table {
    /// An empty table with `rows` rows and no columns.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows,
        }
    }

    /// Parse CSV with a header row from `reader`.
    ///
    /// Short rows are padded with `Missing`; extra fields are dropped.
    pub fn from_reader<R: Read>(reader: R) -> HemaResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let names: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
        let mut rows = 0;
        for result in reader.records() {
            let record = result.map_err(csv_error)?;
            for (i, column) in columns.iter_mut().enumerate() {
                column.push(record.get(i).map(Cell::parse).unwrap_or(Cell::Missing));
            }
            rows += 1;
        }

        debug!(rows, columns = names.len(), "csv table loaded");
        Ok(Self { names, columns, rows })
    }

    pub fn read_csv(path: &Path) -> HemaResult<Self> {
        let file = File::open(path).map_err(|e| HemaError::Io {
            reason: format!("failed to open '{}': {}", path.display(), e),
        })?;
        Self::from_reader(file)
    }

    /// Write the table as CSV with a header row.
    pub fn to_writer<W: Write>(&self, writer: W) -> HemaResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.names).map_err(csv_error)?;
        for row in 0..self.rows {
            writer
                .write_record(self.columns.iter().map(|c| c[row].to_field()))
                .map_err(csv_error)?;
        }
        writer.flush().map_err(|e| HemaError::Io { reason: e.to_string() })?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> HemaResult<()> {
        let file = File::create(path).map_err(|e| HemaError::Io {
            reason: format!("failed to create '{}': {}", path.display(), e),
        })?;
        self.to_writer(file)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.index_of(name).map(|i| self.columns[i].as_slice())
    }

    /// The column as numbers; text and missing cells are `None`.
    pub fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|cells| cells.iter().map(Cell::as_f64).collect())
    }

    /// Insert `cells` as `name`, replacing an existing column of that name.
    ///
    /// # Panics
    ///
    /// If `cells` does not have one entry per row.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.rows, "column '{}' has wrong length", name);
        match self.index_of(name) {
            Some(i) => self.columns[i] = cells,
            None => {
                self.names.push(name.to_string());
                self.columns.push(cells);
            }
        }
    }

    pub fn set_numeric(&mut self, name: &str, values: Vec<Option<f64>>) {
        self.set_column(name, values.into_iter().map(Cell::from_option).collect());
    }

    /// Add a column holding `value` in every row, unless `name` already exists.
    pub fn ensure_constant(&mut self, name: &str, value: f64) -> bool {
        if self.has(name) {
            return false;
        }
        self.set_column(name, vec![Cell::Number(value); self.rows]);
        true
    }

    /// Remove `name`. Returns false when it was not present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.names.remove(i);
                self.columns.remove(i);
                true
            }
            None => false,
        }
    }

    /// Rename `from` to `to`, replacing any existing `to` column.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if !self.has(from) {
            return false;
        }
        if from == to {
            return true;
        }
        if self.drop_column(to) {
            warn!(from, to, "rename target already exists; replacing it");
        }
        if let Some(i) = self.index_of(from) {
            self.names[i] = to.to_string();
        }
        true
    }

    pub fn trim_names(&mut self) {
        for name in &mut self.names {
            let trimmed = name.trim();
            if trimmed.len() != name.len() {
                *name = trimmed.to_string();
            }
        }
    }

    /// Turn every text cell of `name` into `Missing`. Returns how many cells
    /// failed coercion, or `None` when the column is absent.
    pub fn coerce_numeric(&mut self, name: &str) -> Option<usize> {
        let i = self.index_of(name)?;
        let mut failed = 0;
        for cell in &mut self.columns[i] {
            if let Cell::Text(_) = cell {
                *cell = Cell::Missing;
                failed += 1;
            }
        }
        Some(failed)
    }

    /// Replace missing cells in every numeric column with that column's
    /// median over the whole table. Columns with no values at all stay
    /// missing, and so does `Gender`, which is categorical even when encoded
    /// as 0/1. Returns the number of cells filled.
    pub fn fill_missing_with_median(&mut self) -> usize {
        let mut filled = 0;
        for (name, column) in self.names.iter().zip(self.columns.iter_mut()) {
            if name == markers::GENDER || column.iter().any(|c| matches!(c, Cell::Text(_))) {
                continue;
            }
            let values: Vec<f64> = column.iter().filter_map(Cell::as_f64).collect();
            let Some(m) = median(&values) else {
                continue;
            };
            let mut count = 0;
            for cell in column.iter_mut().filter(|c| c.is_missing()) {
                *cell = Cell::Number(m);
                count += 1;
            }
            if count > 0 {
                debug!(column = %name, median = m, count, "median fill");
            }
            filled += count;
        }
        filled
    }

    /// Build a `PatientRecord` from row `row`.
    ///
    /// Numeric cells become markers; a `Gender` cell is resolved through
    /// `Gender::parse`.
    pub fn record(&self, row: usize) -> PatientRecord {
        self.names
            .iter()
            .zip(&self.columns)
            .fold(PatientRecord::new(), |record, (name, column)| {
                let cell = &column[row];
                if name == markers::GENDER {
                    match Gender::parse(&cell.to_field()) {
                        Some(g) => record.with_gender(g),
                        None => record,
                    }
                } else {
                    match cell.as_f64() {
                        Some(v) => record.with(name.as_str(), v),
                        None => record,
                    }
                }
            })
    }
}

fn csv_error(e: csv::Error) -> HemaError {
    HemaError::Csv { reason: e.to_string() }
}
