// src/table/mod.rs
//! In-memory record table: loaded once, mutated by the merge session, written once.

pub mod columns;
pub mod loader;
pub mod writer;

use std::collections::HashMap;
use std::fmt;

pub use columns::{ColumnMap, ResolvedColumns};
pub use writer::TableWriter;

/// Stable identity of a record: its 0-based data-row position at load time.
/// Deleting other records never renumbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based data row, which is what a spreadsheet user sees below the header
        write!(f, "row {}", self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    Crlf,
    Lf,
}

impl LineTerminator {
    /// The terminator a raw record ends with, if any. Newlines quoted inside
    /// fields never reach the end of a record, so they do not count.
    pub fn of_record(raw: &[u8]) -> Option<Self> {
        if raw.ends_with(b"\r\n") {
            Some(LineTerminator::Crlf)
        } else if raw.ends_with(b"\n") {
            Some(LineTerminator::Lf)
        } else {
            None
        }
    }

    pub fn as_csv(&self) -> csv::Terminator {
        match self {
            LineTerminator::Crlf => csv::Terminator::CRLF,
            LineTerminator::Lf => csv::Terminator::Any(b'\n'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    values: Vec<String>,
    /// Source bytes of the row, including its line terminator. Cleared on the first edit.
    raw: Option<Vec<u8>>,
}

impl Record {
    pub fn new(id: RecordId, values: Vec<String>) -> Self {
        Self {
            id,
            values,
            raw: None,
        }
    }

    pub(crate) fn with_raw(id: RecordId, values: Vec<String>, raw: Vec<u8>) -> Self {
        Self {
            id,
            values,
            raw: Some(raw),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at a column index; out-of-range columns read as empty.
    pub fn get(&self, column: usize) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    /// True when the row has no source bytes to reuse: it was edited, or the
    /// table was not loaded from a file.
    pub fn is_modified(&self) -> bool {
        self.raw.is_none()
    }

    pub(crate) fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    /// Always sorted by id.
    records: Vec<Record>,
    header_raw: Option<Vec<u8>>,
    terminator: LineTerminator,
}

impl Table {
    /// Build a table from already-parsed values. Rows are numbered in the given order.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| Record::new(RecordId(i), values))
            .collect();
        Self::assemble(columns, records, None, LineTerminator::Crlf)
    }

    pub(crate) fn assemble(
        columns: Vec<String>,
        records: Vec<Record>,
        header_raw: Option<Vec<u8>>,
        terminator: LineTerminator,
    ) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            columns,
            column_index,
            records,
            header_raw,
            terminator,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn terminator(&self) -> LineTerminator {
        self.terminator
    }

    pub(crate) fn header_raw(&self) -> Option<&[u8]> {
        self.header_raw.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    fn position(&self, id: RecordId) -> Result<usize, usize> {
        self.records.binary_search_by_key(&id, |r| r.id)
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.position(id).ok().map(|pos| &self.records[pos])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_ok()
    }

    pub fn value(&self, id: RecordId, column: usize) -> Option<&str> {
        self.get(id).map(|r| r.get(column))
    }

    /// Overwrite one cell and return its previous value. A write of the same value
    /// leaves the record unmodified.
    pub fn set_value(&mut self, id: RecordId, column: usize, value: String) -> Option<String> {
        if column >= self.columns.len() {
            return None;
        }
        let pos = self.position(id).ok()?;
        let record = &mut self.records[pos];
        if record.values.len() < self.columns.len() {
            record.values.resize(self.columns.len(), String::new());
        }
        if record.values[column] == value {
            return Some(value);
        }
        record.raw = None;
        Some(std::mem::replace(&mut record.values[column], value))
    }

    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let pos = self.position(id).ok()?;
        Some(self.records.remove(pos))
    }

    /// Swap in a whole record with the same id, returning the one it replaced.
    pub fn replace(&mut self, record: Record) -> Option<Record> {
        let pos = self.position(record.id).ok()?;
        Some(std::mem::replace(&mut self.records[pos], record))
    }

    /// Put a previously removed record back at its original position.
    /// Returns false if a record with the same id is already present.
    pub fn restore(&mut self, record: Record) -> bool {
        match self.position(record.id) {
            Ok(_) => false,
            Err(pos) => {
                self.records.insert(pos, record);
                true
            }
        }
    }
}
