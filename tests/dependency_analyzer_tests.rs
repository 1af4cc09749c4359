//! Dependency Analyzer tests against Fact Graphs built straight from CSV
//! text, rather than the crate's own unit tests which build the graph by
//! hand through `FactGraphBuilder`.

use dtc::analyzer::analyze;
use dtc::error::DtcError;
use dtc::ingest::ingest_files;
use std::io::Write;
use std::path::PathBuf;

fn fg_from(contents: &str) -> dtc::fact_graph::FactGraph {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    ingest_files(&[PathBuf::from(path)]).unwrap()
}

#[test]
fn chained_inferences_widen_the_fire_closure() {
    // b is independent; b=x resolves a=1, which in turn resolves c=final.
    let fg = fg_from("@a,b\n1,x\n2,y\n@c,a\nfinal,1\nother,2\n");
    let analysis = analyze(&fg).unwrap();

    let b_name = fg.names.iter().position(|n| n.symbol.as_ref() == b"b").unwrap();
    let x = analysis
        .independent
        .iter()
        .find(|v| v.name.0 as usize == b_name && fg.value_symbol_str(v) == "x")
        .unwrap();

    let fire = analysis.fire(x);
    assert_eq!(fire.infs.len(), 2, "firing b=x should resolve both a=1 and c=final");
}

#[test]
fn fully_determined_table_has_no_independent_values() {
    // a's values are both determined by b-rows, and b's values are both
    // determined by a-rows in turn - no Value anywhere is left as a root.
    let fg = fg_from("@a,b\n1,x\n2,y\n@b,a\nx,1\ny,2\n");
    let err = analyze(&fg);
    assert!(matches!(err, Err(DtcError::NoIndependentValues)));
}

#[test]
fn partially_independent_name_is_rejected() {
    // "z" has three values; "p" and "q" are independent (never a result),
    // but "r" is itself a result of another row, making z inconsistent.
    let fg = fg_from("@a,z\n1,p\n2,q\n@z,a\nr,1\n");
    let err = analyze(&fg);
    assert!(matches!(err, Err(DtcError::PartiallyIndependent { .. })));
}
