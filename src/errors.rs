// src/errors.rs
use std::path::PathBuf;
use thiserror::Error;

/// Malformed source data. Always fatal, raised before any mutation.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source has no header row")]
    EmptyHeader,

    #[error("column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    #[error("required column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("row {row} has {found} fields but the header has {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Invalid operator command. Reported and re-prompted, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperatorInputError {
    #[error("unrecognized command '{0}' (type h for help)")]
    UnknownCommand(String),

    #[error("there is no record {number} in this set (1-{size})")]
    RecordOutOfRange { number: usize, size: usize },

    #[error("record {0} has already been deleted")]
    RecordDeleted(usize),

    #[error("there is no property {number} (1-{size})")]
    PropertyOutOfRange { number: usize, size: usize },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("source and target are both record {0}")]
    SameRecord(usize),

    #[error("deleting every record in a set is not allowed; skip it instead")]
    WouldEmptySet,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("already at the first set")]
    NoPreviousSet,
}

/// The destination could not be written. Fatal; the destination is left untouched.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize row for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum DedupeError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    OperatorInput(#[from] OperatorInputError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DedupeError>;
