//! # Ingestor
//!
//! Drives the external CSV parser (the `csv` crate) record by record and
//! folds its cell events into a [`FactGraphBuilder`], exactly as spec.md
//! §4.2 describes: a first-column `#` starts a comment record (discarded);
//! a first-column `@` opens a header (result Name, then premise Names in
//! column order); every other record is a row of the *current* table.
//!
//! ```text
//! *.csv -> csv::Reader -> [Ingestor] -> FactGraph
//! ```
//!
//! Multiple files are folded into the same Fact Graph, in argument order
//! (spec.md §6), so a Name or Value introduced in one file is recognized in
//! a later one.

use crate::error::{DtcError, MalformedTableKind};
use crate::fact_graph::{FactGraph, FactGraphBuilder, NameId, Value};
use std::path::{Path, PathBuf};

/// State carried across records within one file: the active header's
/// column list (cleared on every header row) and the inference being
/// assembled from the current data row.
struct IngestState {
    header_cols: Vec<NameId>,
    pending: Option<PendingInference>,
}

struct PendingInference {
    result: Value,
    premises: Vec<Value>,
    row: usize,
}

/// Ingest one CSV file into `builder`. Rows before any `@` header are a
/// `RowBeforeHeader` error; malformed headers and rows are reported with
/// the offending 1-based row number.
pub fn ingest_file(builder: &mut FactGraphBuilder, path: &Path) -> Result<(), DtcError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DtcError::Io(path.to_path_buf(), to_io_error(e)))?;

    let mut state = IngestState {
        header_cols: Vec::new(),
        pending: None,
    };

    let mut row_num: usize = 0;
    for result in reader.records() {
        row_num += 1;
        let record = result.map_err(|e| DtcError::CsvSyntax(path.to_path_buf(), row_num, e))?;
        ingest_record(builder, &mut state, path, row_num, &record)?;
    }

    Ok(())
}

/// Ingest every file in `paths`, in order, into one shared Fact Graph.
pub fn ingest_files(paths: &[PathBuf]) -> Result<FactGraph, DtcError> {
    let mut builder = FactGraphBuilder::new();
    for path in paths {
        ingest_file(&mut builder, path)?;
    }
    builder.finish()
}

fn ingest_record(
    builder: &mut FactGraphBuilder,
    state: &mut IngestState,
    path: &Path,
    row_num: usize,
    record: &csv::StringRecord,
) -> Result<(), DtcError> {
    let first = record.get(0).unwrap_or("");

    if first.starts_with('#') {
        return Ok(());
    }

    if let Some(rest) = first.strip_prefix('@') {
        return ingest_header(builder, state, path, row_num, rest, record);
    }

    ingest_data_row(builder, state, path, row_num, record)
}

fn ingest_header(
    builder: &mut FactGraphBuilder,
    state: &mut IngestState,
    path: &Path,
    row_num: usize,
    result_name: &str,
    record: &csv::StringRecord,
) -> Result<(), DtcError> {
    if result_name.is_empty() {
        return Err(DtcError::MalformedTable(
            path.to_path_buf(),
            row_num,
            MalformedTableKind::EmptyHeaderName,
        ));
    }

    let mut cols = Vec::with_capacity(record.len());
    let mut seen = std::collections::HashSet::new();

    let result_sym = builder.intern(result_name.as_bytes());
    let result_name_id = builder.get_or_create_name(result_sym);
    cols.push(result_name_id);
    seen.insert(result_name.to_string());

    for field in record.iter().skip(1) {
        if field.is_empty() {
            return Err(DtcError::MalformedTable(
                path.to_path_buf(),
                row_num,
                MalformedTableKind::EmptyHeaderName,
            ));
        }
        if !seen.insert(field.to_string()) {
            return Err(DtcError::MalformedTable(
                path.to_path_buf(),
                row_num,
                MalformedTableKind::DuplicateColumn(field.to_string()),
            ));
        }
        let sym = builder.intern(field.as_bytes());
        let name_id = builder.get_or_create_name(sym);
        cols.push(name_id);
    }

    state.header_cols = cols;
    state.pending = None;
    Ok(())
}

fn ingest_data_row(
    builder: &mut FactGraphBuilder,
    state: &mut IngestState,
    path: &Path,
    row_num: usize,
    record: &csv::StringRecord,
) -> Result<(), DtcError> {
    if state.header_cols.is_empty() {
        return Err(DtcError::MalformedTable(
            path.to_path_buf(),
            row_num,
            MalformedTableKind::RowBeforeHeader,
        ));
    }
    if record.len() > state.header_cols.len() {
        return Err(DtcError::MalformedTable(
            path.to_path_buf(),
            row_num,
            MalformedTableKind::RowOverflow {
                cells: record.len(),
                columns: state.header_cols.len(),
            },
        ));
    }

    let mut premises = Vec::new();
    let mut result: Option<Value> = None;

    for (col, field) in record.iter().enumerate() {
        if field.is_empty() {
            // "don't care" — contributes nothing, not even to the result column.
            continue;
        }
        let name_id = state.header_cols[col];
        let sym = builder.intern(field.as_bytes());
        let value = builder.get_or_create_value(name_id, sym);
        if col == 0 {
            result = Some(value);
        } else {
            premises.push(value);
        }
    }

    let Some(result) = result else {
        // An empty first cell on a data row: nothing to resolve, nothing to
        // add. Not explicitly named as an error in spec.md; treated as a
        // no-op row rather than a synthesized `EmptyPremiseRow`.
        return Ok(());
    };

    if premises.is_empty() {
        return Err(DtcError::MalformedTable(
            path.to_path_buf(),
            row_num,
            MalformedTableKind::EmptyPremiseRow,
        ));
    }

    builder.add_inference(result, premises, (path.to_path_buf(), row_num))
}

fn to_io_error(e: csv::Error) -> std::io::Error {
    match e.into_kind() {
        csv::ErrorKind::Io(io_err) => io_err,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn ingests_headers_and_rows() {
        let f = write_csv("@proceed,signal\nyes,green\nno,red\n");
        let fg = ingest_files(&[f.path().to_path_buf()]).unwrap();
        assert_eq!(fg.names.len(), 2);
        assert_eq!(fg.inferences.len(), 2);
    }

    #[test]
    fn comment_rows_are_discarded() {
        let f = write_csv("#a comment\n@proceed,signal\nyes,green\nno,red\n");
        let fg = ingest_files(&[f.path().to_path_buf()]).unwrap();
        assert_eq!(fg.inferences.len(), 2);
    }

    #[test]
    fn empty_premise_row_is_fatal() {
        let f = write_csv("@proceed,signal\nyes,\n");
        let err = ingest_files(&[f.path().to_path_buf()]);
        assert!(matches!(
            err,
            Err(DtcError::MalformedTable(
                _,
                _,
                MalformedTableKind::EmptyPremiseRow
            ))
        ));
    }

    #[test]
    fn duplicate_header_column_is_fatal() {
        let f = write_csv("@proceed,signal,signal\n");
        let err = ingest_files(&[f.path().to_path_buf()]);
        assert!(matches!(
            err,
            Err(DtcError::MalformedTable(
                _,
                _,
                MalformedTableKind::DuplicateColumn(_)
            ))
        ));
    }

    #[test]
    fn row_overflow_is_fatal() {
        let f = write_csv("@proceed,signal\nyes,green,extra\n");
        let err = ingest_files(&[f.path().to_path_buf()]);
        assert!(matches!(
            err,
            Err(DtcError::MalformedTable(
                _,
                _,
                MalformedTableKind::RowOverflow { .. }
            ))
        ));
    }
}
