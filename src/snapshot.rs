//! In-memory copies of database tables.

use rusqlite::types::ValueRef;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::Utf8Error;

/// A single cell, one variant per SQLite storage class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Text cells must be valid UTF-8; they are never rewritten.
impl TryFrom<ValueRef<'_>> for Value {
    type Error = Utf8Error;

    fn try_from(value: ValueRef<'_>) -> Result<Self, Self::Error> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(std::str::from_utf8(t)?.to_string()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        })
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(t) => f.write_str(t),
            Value::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

/// Column type inferred from the values actually stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    /// Every value is NULL, or the table is empty
    Null,
    /// Values of incompatible storage classes
    Mixed,
}

impl ColumnType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnType::Null,
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
        }
    }

    /// Widen two observed types into one. Integers and reals widen to real.
    fn merge(self, other: ColumnType) -> Self {
        use ColumnType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Integer, Real) | (Real, Integer) => Real,
            _ => Mixed,
        }
    }

    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        values
            .into_iter()
            .fold(ColumnType::Null, |acc, v| acc.merge(ColumnType::of(v)))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
            ColumnType::Null => "null",
            ColumnType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Type as written in the table definition, if any
    pub decl_type: Option<String>,
    pub inferred_type: ColumnType,
}

static MISSING: Value = Value::Null;

/// Every row and column of one table, read by a single `SELECT *`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl TableSnapshot {
    /// Build a snapshot, inferring each column's type from `rows`
    pub fn new(
        name: impl Into<String>,
        columns: Vec<(String, Option<String>)>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(idx, (name, decl_type))| Column {
                name,
                decl_type,
                inferred_type: ColumnType::infer(rows.iter().filter_map(|row| row.get(idx))),
            })
            .collect();
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// All values of the named column, top to bottom. Rows too short to
    /// hold the column read as NULL.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&MISSING))
                .collect(),
        )
    }

    /// A copy holding only the first `n` rows
    pub fn head(&self, n: usize) -> TableSnapshot {
        TableSnapshot {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

impl fmt::Display for TableSnapshot {
    /// Plain-text grid: a row-number column, then one column per field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "Empty table\nColumns: []\nIndex: []");
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (col, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {:>width$}", col.name)?;
        }
        for (i, row) in cells.iter().enumerate() {
            write!(f, "\n{:<index_width$}", i)?;
            for (idx, width) in widths.iter().copied().enumerate() {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                write!(f, "  {:>width$}", cell)?;
            }
        }
        Ok(())
    }
}

/// Table name to snapshot, iterated in the order tables were loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    snapshots: Vec<TableSnapshot>,
    index: HashMap<String, usize>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snapshot under its own name, replacing any earlier one
    pub fn insert(&mut self, snapshot: TableSnapshot) {
        match self.index.get(&snapshot.name) {
            Some(&idx) => self.snapshots[idx] = snapshot,
            None => {
                self.index.insert(snapshot.name.clone(), self.snapshots.len());
                self.snapshots.push(snapshot);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TableSnapshot> {
        self.index.get(name).map(|&idx| &self.snapshots[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.snapshots.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl IntoIterator for Tables {
    type Item = TableSnapshot;
    type IntoIter = std::vec::IntoIter<TableSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}

impl Serialize for Tables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.snapshots.len()))?;
        for snapshot in &self.snapshots {
            map.serialize_entry(&snapshot.name, snapshot)?;
        }
        map.end()
    }
}
