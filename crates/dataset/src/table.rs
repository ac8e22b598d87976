//! CSV-backed column table
//!
//! A small typed frame: named columns over cells that are numbers, text, or
//! missing. Enough structure for the preprocessors to impute, encode, and
//! reshape heterogeneous housing datasets into the canonical form.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::DatasetError;

/// A single table cell
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Num(f64),
    Text(String),
    Null,
}

impl Cell {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Cell::Num(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed == "NA" || trimmed == "NaN" || trimmed == "null" {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Num(v),
            _ => Cell::Text(trimmed.to_string()),
        }
    }
}

/// Rectangular table with a header row
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Load a table from a CSV file with a header row
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() {
                return Err(DatasetError::RaggedRow {
                    row: row_idx + 1,
                    got: record.len(),
                    expected: columns.len(),
                });
            }
            rows.push(record.iter().map(Cell::parse).collect());
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        tracing::debug!(
            "read {} rows x {} columns from CSV",
            rows.len(),
            columns.len()
        );

        Ok(Self { columns, rows })
    }

    /// Write the table to a CSV file, creating parent directories
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            let fields: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Num(v) => format_num(*v),
                    Cell::Text(s) => s.clone(),
                    Cell::Null => String::new(),
                })
                .collect();
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of a column by index
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// True when every non-null cell in the column is numeric
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        self.column(idx)
            .all(|cell| !matches!(cell, Cell::Text(_)))
    }

    /// Median of the column's non-null numeric values
    pub fn column_median(&self, idx: usize) -> Option<f64> {
        let mut values: Vec<f64> = self.column(idx).filter_map(Cell::as_num).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }

    /// Impute nulls with the column median (numeric columns) or the literal
    /// "Unknown" (text columns), then label-encode text columns to integers.
    ///
    /// Encoding maps distinct strings in sorted order to 0..n; it is stable
    /// within a run but is not persisted.
    pub fn impute_and_encode(&mut self) {
        for idx in 0..self.n_cols() {
            if self.is_numeric_column(idx) {
                let median = self.column_median(idx).unwrap_or(0.0);
                for row in &mut self.rows {
                    if row[idx].is_null() {
                        row[idx] = Cell::Num(median);
                    }
                }
            } else {
                for row in &mut self.rows {
                    if row[idx].is_null() {
                        row[idx] = Cell::Text("Unknown".to_string());
                    }
                }

                let classes: BTreeSet<String> = self
                    .column(idx)
                    .map(|cell| match cell {
                        Cell::Text(s) => s.clone(),
                        Cell::Num(v) => format_num(*v),
                        Cell::Null => "Unknown".to_string(),
                    })
                    .collect();
                let classes: Vec<String> = classes.into_iter().collect();

                for row in &mut self.rows {
                    let key = match &row[idx] {
                        Cell::Text(s) => s.clone(),
                        Cell::Num(v) => format_num(*v),
                        Cell::Null => "Unknown".to_string(),
                    };
                    let code = classes.iter().position(|c| *c == key).unwrap_or(0);
                    row[idx] = Cell::Num(code as f64);
                }
            }
        }
    }

    /// Split into (features, targets, feature_names) with the last column as
    /// the target. All cells must already be numeric.
    pub fn split_target(&self) -> Result<(Vec<Vec<f64>>, Vec<f64>, Vec<String>), DatasetError> {
        if self.n_cols() < 2 {
            return Err(DatasetError::Empty);
        }

        let target_idx = self.n_cols() - 1;
        for (idx, name) in self.columns.iter().enumerate() {
            if !self.is_numeric_column(idx) || self.column(idx).any(Cell::is_null) {
                return Err(DatasetError::NotNumeric(name.clone()));
            }
        }

        let mut features = Vec::with_capacity(self.n_rows());
        let mut targets = Vec::with_capacity(self.n_rows());
        for row in &self.rows {
            let mut feature_row = Vec::with_capacity(target_idx);
            for (idx, cell) in row.iter().enumerate() {
                let value = cell.as_num().unwrap_or(0.0);
                if idx == target_idx {
                    targets.push(value);
                } else {
                    feature_row.push(value);
                }
            }
            features.push(feature_row);
        }

        let names = self.columns[..target_idx].to_vec();
        Ok((features, targets, names))
    }
}

fn format_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
