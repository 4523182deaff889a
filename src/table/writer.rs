// src/table/writer.rs
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{LineTerminator, Table};
use crate::errors::WriteError;

/// Writes a table back to CSV. The destination is replaced atomically, so a
/// failed write leaves whatever was there before.
#[derive(Debug, Clone)]
pub struct TableWriter {
    destination: PathBuf,
}

impl TableWriter {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn write(&self, table: &Table) -> Result<(), WriteError> {
        let bytes = table.to_csv_bytes().map_err(|source| WriteError::Csv {
            path: self.destination.clone(),
            source,
        })?;
        let io_err = |source: std::io::Error| WriteError::Io {
            path: self.destination.clone(),
            source,
        };

        let dir = match self.destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        // the temp file is created private; an existing destination keeps its mode
        if let Ok(metadata) = std::fs::metadata(&self.destination) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.destination)
            .map_err(|e| io_err(e.error))?;

        info!(
            "💾 Wrote {} records to {}",
            table.len(),
            self.destination.display()
        );
        Ok(())
    }
}

impl Table {
    /// Serialize the table: header, then the current records in order. Rows with
    /// source bytes are copied verbatim; the rest use minimal quoting.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut out = Vec::new();
        match self.header_raw() {
            Some(raw) => out.extend_from_slice(raw),
            None => out.extend(serialize_row(self.columns(), self.terminator())?),
        }
        for record in self.records() {
            ensure_line_break(&mut out, self.terminator());
            match record.raw() {
                Some(raw) => out.extend_from_slice(raw),
                None => out.extend(serialize_row(record.values(), self.terminator())?),
            }
        }
        Ok(out)
    }
}

fn serialize_row<S: AsRef<[u8]>>(
    values: &[S],
    terminator: LineTerminator,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(terminator.as_csv())
        .from_writer(Vec::new());
    writer.write_record(values)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// A source file without a trailing newline leaves its last row unterminated;
/// anything written after it needs a break first.
fn ensure_line_break(out: &mut Vec<u8>, terminator: LineTerminator) {
    if out.is_empty() || out.ends_with(b"\n") {
        return;
    }
    match terminator {
        LineTerminator::Crlf => out.extend_from_slice(b"\r\n"),
        LineTerminator::Lf => out.push(b'\n'),
    }
}
