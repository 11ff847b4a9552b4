//! Time-series table: the uniform tabular result every data source produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Canonical field names.
pub mod fields {
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";

    pub const SALES: &str = "Sales";
    pub const CUSTOMERS: &str = "Customers";
    pub const REGION: &str = "Region";

    /// Schema of a daily market-data table.
    pub const OHLCV: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

    /// Schema of a synthetic sales table.
    pub const SALES_SCHEMA: [&str; 3] = [SALES, CUSTOMERS, REGION];
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Finite numeric value, `None` for text or NaN/inf gaps.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One observation: a date plus named field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub timestamp: NaiveDate,
    pub values: BTreeMap<String, FieldValue>,
}

impl TimeSeriesRow {
    pub fn new(timestamp: NaiveDate) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Finite numeric value of `field`, if present.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("duplicate field in schema: {0}")]
    DuplicateField(String),

    #[error("row for {date} does not match schema: {detail}")]
    SchemaMismatch { date: NaiveDate, detail: String },
}

/// Ordered sequence of rows sharing one schema, ascending by timestamp.
///
/// Immutable once built. An empty table is a valid, meaningful value and
/// still knows its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    schema: Vec<String>,
    rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesTable {
    /// Build a table, checking every row against the schema and sorting by date.
    ///
    /// The sort is stable, so rows sharing a date keep their input order.
    pub fn new(schema: &[&str], mut rows: Vec<TimeSeriesRow>) -> Result<Self, TableError> {
        let mut names: Vec<String> = Vec::with_capacity(schema.len());
        for field in schema {
            if names.iter().any(|n| n == field) {
                return Err(TableError::DuplicateField(field.to_string()));
            }
            names.push(field.to_string());
        }

        for row in &rows {
            if row.values.len() != names.len() {
                return Err(TableError::SchemaMismatch {
                    date: row.timestamp,
                    detail: format!(
                        "expected {} fields, found {}",
                        names.len(),
                        row.values.len()
                    ),
                });
            }
            if let Some(missing) = names.iter().find(|n| !row.values.contains_key(n.as_str())) {
                return Err(TableError::SchemaMismatch {
                    date: row.timestamp,
                    detail: format!("missing field '{missing}'"),
                });
            }
        }

        rows.sort_by_key(|r| r.timestamp);
        Ok(Self {
            schema: names,
            rows,
        })
    }

    /// An empty table with the given schema.
    pub fn empty(schema: &[&str]) -> Self {
        Self {
            schema: schema.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.schema.iter().any(|f| f == field)
    }

    pub fn rows(&self) -> &[TimeSeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&TimeSeriesRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&TimeSeriesRow> {
        self.rows.last()
    }

    /// Row before the last one.
    pub fn previous(&self) -> Option<&TimeSeriesRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }

    /// Finite values of a numeric column in row order, skipping gaps.
    ///
    /// `None` when the field is not part of the schema.
    pub fn numbers(&self, field: &str) -> Option<Vec<f64>> {
        if !self.has_field(field) {
            return None;
        }
        Some(self.rows.iter().filter_map(|r| r.number(field)).collect())
    }

    /// `(date, value)` pairs of a numeric column, skipping gaps.
    pub fn series(&self, field: &str) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.number(field).map(|v| (r.timestamp, v)))
            .collect()
    }

    /// New table restricted to `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            schema: self.schema.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.timestamp >= start && r.timestamp <= end)
                .cloned()
                .collect(),
        }
    }
}
