//! In-memory tables with optional, loosely typed columns.
//!
//! Input tables arrive from CSV, JSON or JSON-lines files, so a column may be
//! missing entirely and cell types are only known at read time. Accessors never
//! fail for a missing column: numeric reads yield zeros, text reads yield absent
//! values. Only a present monetary column holding a non-numeric token is an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{EngineError, EngineResult};

/// A single table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. `Ok(None)` means absent (null or blank text).
    /// `Err(())` means present but not a finite number.
    fn to_number(&self) -> Result<Option<f64>, ()> {
        match self {
            Cell::Null => Ok(None),
            Cell::Number(v) if v.is_finite() => Ok(Some(*v)),
            Cell::Number(_) => Err(()),
            Cell::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                match s.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Some(v)),
                    _ => Err(()),
                }
            }
        }
    }

    /// Text view of the cell, used for ids, codes and statuses.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Number(v) => Some(format_number(*v)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
        }
    }

    /// Timestamp view of the cell. Numbers, and text holding a number, are
    /// epoch seconds. Unparseable values are absent, never errors.
    pub fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Number(v) => epoch_seconds(*v),
            Cell::Text(s) => {
                let s = s.trim();
                parse_timestamp(s).or_else(|| s.parse::<f64>().ok().and_then(epoch_seconds))
            }
            _ => None,
        }
    }

    fn display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(v) => v.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Integral numbers render without a fractional part so that `1001` read from
/// JSON joins against `"1001"` read from CSV.
fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Parse the timestamp spellings seen in exported order/payment data.
///
/// Offset-less values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// A named table: ordered columns, ordered rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// An empty table with no columns. Stands in for an input that was not supplied.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Build a table from column names and rows.
    pub fn from_rows(
        name: impl Into<String>,
        columns: &[&str],
        rows: Vec<Vec<Cell>>,
    ) -> Self {
        let mut table = Self::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row. Short rows read as null in the trailing columns.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn cells(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Cell::Null))
    }

    /// Numeric column with absent cells read as zero. A missing column is an
    /// all-zero column.
    pub fn numeric_column(&self, column: &str) -> EngineResult<Vec<f64>> {
        let Some(idx) = self.column_index(column) else {
            return Ok(vec![0.0; self.len()]);
        };
        self.cells(idx)
            .enumerate()
            .map(|(row, cell)| {
                cell.to_number()
                    .map(|v| v.unwrap_or(0.0))
                    .map_err(|_| EngineError::DataCoercion {
                        table: self.name.clone(),
                        column: column.to_string(),
                        row,
                        value: cell.display(),
                    })
            })
            .collect()
    }

    /// Text column. A missing column is an all-absent column.
    pub fn text_column(&self, column: &str) -> Vec<Option<String>> {
        match self.column_index(column) {
            Some(idx) => self.cells(idx).map(Cell::to_text).collect(),
            None => vec![None; self.len()],
        }
    }

    /// Timestamp column, or `None` when the column does not exist.
    pub fn timestamp_column(&self, column: &str) -> Option<Vec<Option<DateTime<Utc>>>> {
        self.column_index(column)
            .map(|idx| self.cells(idx).map(Cell::to_timestamp).collect())
    }
}

fn epoch_seconds(v: f64) -> Option<DateTime<Utc>> {
    if !v.is_finite() {
        return None;
    }
    let secs = v.trunc() as i64;
    let nanos = ((v - v.trunc()) * 1e9).round() as u32;
    Utc.timestamp_opt(secs, nanos.min(999_999_999)).single()
}
