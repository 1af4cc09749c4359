//! Error types for the decision table compiler.
//!
//! Every fatal kind named in the specification is a variant here; each
//! carries the file path and 1-based row/column where the specification
//! requires it, so `main` can format a `dtc: <path>:<row>: <message>`
//! diagnostic without re-deriving context.

use std::path::PathBuf;
use thiserror::Error;

/// A source location for diagnostics: file path and 1-based row.
pub type SourceLoc = (PathBuf, usize);

/// Why a table failed to parse as well-formed input.
#[derive(Debug, Clone, Error)]
pub enum MalformedTableKind {
    #[error("empty column name in header")]
    EmptyHeaderName,

    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),

    #[error("row has more cells than the header declares ({cells} > {columns})")]
    RowOverflow { cells: usize, columns: usize },

    #[error("row has a result value but no premises")]
    EmptyPremiseRow,

    #[error("duplicate inference: same result and premises as {0}:{1}")]
    DuplicateInference(PathBuf, usize),

    #[error("data row appears before any '@' header")]
    RowBeforeHeader,
}

/// All fatal compile errors (spec §7). The compile stops at the first one.
#[derive(Debug, Error)]
pub enum DtcError {
    #[error("{0}:{1}: CSV syntax error: {2}")]
    CsvSyntax(PathBuf, usize, #[source] csv::Error),

    #[error("{0}:{1}: {2}")]
    MalformedTable(PathBuf, usize, #[source] MalformedTableKind),

    #[error("name '{name}' has fewer than two values")]
    UnderSpecifiedName { name: String },

    #[error("no independent values: every name is determined by some inference")]
    NoIndependentValues,

    #[error("name '{name}' is partially independent: some of its values are search roots and others are not")]
    PartiallyIndependent { name: String },

    #[error(
        "contradiction: name '{name}' is assigned conflicting values by {row_a:?} and {row_b:?} on the same path"
    )]
    Contradiction {
        name: String,
        row_a: SourceLoc,
        row_b: SourceLoc,
    },

    #[error("out of memory")]
    Oom,

    #[error("I/O error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DtcError>;
