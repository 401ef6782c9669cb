use std::path::PathBuf;

use thiserror::Error;

use crate::chart::{ChartKind, Slot};
use crate::data::classify::ColumnKind;
use crate::data::loader::TextEncoding;

// ---------------------------------------------------------------------------
// Load-time errors (fatal at startup)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: row {row}, column {column} is not valid {encoding}", path.display())]
    Encoding {
        path: PathBuf,
        row: u64,
        column: u64,
        encoding: TextEncoding,
    },
    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: row {row} has {found} fields, the header has {expected}", path.display())]
    ExtraFields {
        path: PathBuf,
        row: u64,
        expected: usize,
        found: usize,
    },
    #[error("{}: {reason}", path.display())]
    Json { path: PathBuf, reason: String },
    #[error("{}: {reason}", path.display())]
    Parquet { path: PathBuf, reason: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("{}: no header row", .0.display())]
    Empty(PathBuf),
}

// ---------------------------------------------------------------------------
// Classification warnings (degraded, never fatal)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{column}' has no values; treated as categorical with an empty domain")]
pub struct ClassificationError {
    pub column: String,
}

// ---------------------------------------------------------------------------
// Widget input errors (recovered, last valid state kept)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("no filter for column '{0}'")]
    UnknownColumn(String),
    #[error("column '{column}' is {actual}, not {expected}")]
    KindMismatch {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
    #[error("{rejected:?} not in the observed values of '{column}'")]
    InvalidSelection {
        column: String,
        rejected: Vec<String>,
    },
    #[error("invalid range [{lo}, {hi}] for '{column}'")]
    InvalidRange { column: String, lo: f64, hi: f64 },
}

// ---------------------------------------------------------------------------
// Chart requests the registry cannot satisfy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedRequest {
    #[error("no chart builder registered for {0}")]
    Unregistered(ChartKind),
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("{kind} needs a {expected} column for {slot}, but '{column}' is {actual}")]
    WrongKind {
        kind: ChartKind,
        slot: Slot,
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
    #[error("{kind} needs {expected} column(s) for {slot}, got {got}")]
    Arity {
        kind: ChartKind,
        slot: Slot,
        expected: String,
        got: usize,
    },
    #[error("{kind} does not use a {slot} column")]
    UnexpectedSlot { kind: ChartKind, slot: Slot },
    #[error("nothing bound to {0}")]
    Unbound(Slot),
}
