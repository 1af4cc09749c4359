//! Ingestor tests driven through files on disk, rather than the crate's own
//! unit tests which exercise `ingest_record` directly.

use dtc::error::{DtcError, MalformedTableKind};
use dtc::ingest::ingest_files;
use std::io::Write;
use std::path::PathBuf;

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn two_subtables_in_one_file_share_the_fact_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "t.csv",
        "@proceed,signal\nyes,green\nno,red\n@proceed,signal,canStop\nyes,yellow,no\nno,yellow,yes\n",
    );
    let fg = ingest_files(&[path]).unwrap();
    assert_eq!(fg.names.len(), 3);
    assert_eq!(fg.inferences.len(), 4);
}

#[test]
fn rows_span_multiple_files_in_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_csv(&dir, "a.csv", "@proceed,signal\nyes,green\n");
    let b = write_csv(&dir, "b.csv", "@proceed,signal\nno,red\n");
    let fg = ingest_files(&[a, b]).unwrap();
    assert_eq!(fg.inferences.len(), 2);
}

#[test]
fn quoted_cells_with_embedded_commas_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "@proceed,signal\n\"yes, please\",green\n\"no, thanks\",red\n");
    let fg = ingest_files(&[path]).unwrap();
    let proceed = fg.names.iter().find(|n| n.symbol.as_ref() == b"proceed").unwrap();
    let syms: Vec<String> = proceed.values.iter().map(|v| fg.value_symbol_str(v)).collect();
    assert!(syms.contains(&"yes, please".to_string()));
    assert!(syms.contains(&"no, thanks".to_string()));
}

#[test]
fn row_before_any_header_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "yes,green\n");
    let err = ingest_files(&[path]);
    assert!(matches!(
        err,
        Err(DtcError::MalformedTable(_, 1, MalformedTableKind::RowBeforeHeader))
    ));
}

#[test]
fn empty_header_name_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "@proceed,\nyes,green\n");
    let err = ingest_files(&[path]);
    assert!(matches!(
        err,
        Err(DtcError::MalformedTable(_, 1, MalformedTableKind::EmptyHeaderName))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = ingest_files(&[PathBuf::from("/nonexistent/path/does-not-exist.csv")]);
    assert!(matches!(err, Err(DtcError::Io(_, _))));
}

#[test]
fn under_specified_name_is_fatal_at_finish() {
    let dir = tempfile::tempdir().unwrap();
    // "signal" only ever takes the value "green" - fewer than two values.
    let path = write_csv(&dir, "t.csv", "@proceed,signal\nyes,green\n");
    let err = ingest_files(&[path]);
    assert!(matches!(err, Err(DtcError::UnderSpecifiedName { .. })));
}
