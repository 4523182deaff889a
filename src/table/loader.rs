// src/table/loader.rs
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

use super::{LineTerminator, Record, RecordId, Table};
use crate::errors::FormatError;

const UTF8_BOM: char = '\u{feff}';

impl Table {
    /// Read a CSV file whose first row is the header.
    pub fn load(path: &Path) -> Result<Table, FormatError> {
        let bytes = std::fs::read(path).map_err(|source| FormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Table::from_bytes(&bytes)?;
        info!(
            "📂 Loaded {} records with {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse CSV bytes. Every row must have exactly as many fields as the header.
    /// The raw bytes of each row are kept so untouched rows can be written back verbatim.
    pub fn from_bytes(bytes: &[u8]) -> Result<Table, FormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut header = csv::StringRecord::new();
        if !reader.read_record(&mut header)? {
            return Err(FormatError::EmptyHeader);
        }
        let columns = parse_header(&header)?;

        let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            let (start, line) = record
                .position()
                .map(|p| (p.byte() as usize, p.line() as usize))
                .unwrap_or((bytes.len(), rows.len() + 2));
            if record.len() != columns.len() {
                return Err(FormatError::RowLength {
                    row: line,
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            rows.push((start, record.iter().map(str::to_string).collect()));
        }

        let header_end = rows.first().map(|(start, _)| *start).unwrap_or(bytes.len());
        let header_raw = bytes[..header_end].to_vec();
        let terminator = LineTerminator::of_record(&header_raw).unwrap_or(LineTerminator::Crlf);

        let mut records = Vec::with_capacity(rows.len());
        for i in 0..rows.len() {
            let start = rows[i].0;
            let end = rows.get(i + 1).map(|(next, _)| *next).unwrap_or(bytes.len());
            let values = std::mem::take(&mut rows[i].1);
            records.push(Record::with_raw(RecordId(i), values, bytes[start..end].to_vec()));
        }
        debug!(
            "Parsed {} data rows ({:?} line endings)",
            records.len(),
            terminator
        );

        Ok(Table::assemble(columns, records, Some(header_raw), terminator))
    }
}

fn parse_header(header: &csv::StringRecord) -> Result<Vec<String>, FormatError> {
    if header.is_empty() || header.iter().all(|h| h.trim().is_empty()) {
        return Err(FormatError::EmptyHeader);
    }
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
        let name = if i == 0 {
            name.trim_start_matches(UTF8_BOM)
        } else {
            name
        };
        if !seen.insert(name.to_string()) {
            return Err(FormatError::DuplicateColumn(name.to_string()));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_basic_table() {
        let data = b"id,name,city\r\n1,Smith Archive,Akron\r\n2,\"Jones, Library\",Dayton\r\n";
        let table = Table::from_bytes(data).unwrap();
        assert_eq!(table.columns(), &["id", "name", "city"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(RecordId(1), 1), Some("Jones, Library"));
        assert_eq!(table.terminator(), LineTerminator::Crlf);
        assert!(!table.get(RecordId(0)).unwrap().is_modified());
    }

    #[test]
    fn test_line_ending_comes_from_header_end() {
        let data = b"id,\"long\r\nname\"\n1,Smith Archive\n";
        let mut table = Table::from_bytes(data).unwrap();
        assert_eq!(table.columns()[1], "long\r\nname");
        assert_eq!(table.terminator(), LineTerminator::Lf);

        table.set_value(RecordId(0), 1, "Smith Archives".into());
        assert_eq!(
            table.to_csv_bytes().unwrap(),
            b"id,\"long\r\nname\"\n1,Smith Archives\n"
        );
    }

    #[test]
    fn test_row_length_mismatch_is_format_error() {
        let data = b"a,b,c\n1,2,3\n4,5\n";
        match Table::from_bytes(data) {
            Err(FormatError::RowLength { row, expected, found }) => {
                assert_eq!(row, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected RowLength, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_format_error() {
        assert!(matches!(Table::from_bytes(b""), Err(FormatError::EmptyHeader)));
    }

    #[test]
    fn test_duplicate_column_is_format_error() {
        assert!(matches!(
            Table::from_bytes(b"name,city,name\n"),
            Err(FormatError::DuplicateColumn(c)) if c == "name"
        ));
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::from_bytes(b"name,city\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_bom_is_stripped_from_first_column() {
        let table = Table::from_bytes("\u{feff}id,name\n1,x\n".as_bytes()).unwrap();
        assert_eq!(table.column_index("id"), Some(0));
    }

    #[test]
    fn test_raw_row_bytes_are_kept() {
        let data = b"a,b\n\"1\",2\n3,4";
        let table = Table::from_bytes(data).unwrap();
        assert_eq!(table.header_raw(), Some(&b"a,b\n"[..]));
        assert_eq!(table.get(RecordId(0)).unwrap().raw(), Some(&b"\"1\",2\n"[..]));
        assert_eq!(table.get(RecordId(1)).unwrap().raw(), Some(&b"3,4"[..]));
    }
}
