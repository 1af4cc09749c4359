//! Property-based determinism tests (spec.md §8.1): two compiles of the
//! same input must produce byte-identical pseudocode, for any well-formed
//! single-level table, not just the hand-picked fixtures in the other
//! integration tests.

use dtc::driver::compile_files;
use dtc::Config;
use proptest::prelude::*;
use std::io::Write;
use std::path::PathBuf;

/// Build a well-formed one-table CSV: a root Name `flag` with
/// `assignment.len()` values, each mapped to one of the `verdict` values
/// named in `assignment[i]`.
fn table_csv(assignment: &[usize]) -> String {
    let mut out = String::from("@verdict,flag\n");
    for (i, &v) in assignment.iter().enumerate() {
        out.push_str(&format!("v{v},r{i}\n"));
    }
    out
}

fn compile(contents: &str) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv");
    std::fs::File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
    let cfg = Config::default();
    compile_files(&[PathBuf::from(path)], None, &cfg).unwrap()
}

proptest! {
    /// For any well-formed single-level table (root Name with 2-5 values,
    /// verdict Name with 2-3 values, every root value assigned a verdict),
    /// compiling twice yields byte-identical output.
    #[test]
    fn compile_is_deterministic_across_runs(
        root_card in 2usize..=5,
        verdict_card in 2usize..=3,
        seed in 0u64..997,
    ) {
        let assignment: Vec<usize> = (0..root_card)
            .map(|i| ((seed as usize).wrapping_add(i * 31)) % verdict_card)
            .collect();
        // Every verdict value must actually appear at least once, or the
        // result Name ends up with fewer than two values among those
        // assigned - not a property violation, just not a well-formed
        // input for this generator; skip it.
        let mut seen: Vec<bool> = vec![false; verdict_card];
        for &v in &assignment {
            seen[v] = true;
        }
        prop_assume!(seen.iter().all(|&s| s));

        let csv = table_csv(&assignment);
        let a = compile(&csv);
        let b = compile(&csv);
        prop_assert_eq!(a, b);
    }

    /// Quick mode is also deterministic on the same property of inputs.
    #[test]
    fn quick_mode_is_deterministic_across_runs(
        root_card in 2usize..=5,
        verdict_card in 2usize..=3,
        seed in 0u64..997,
    ) {
        let assignment: Vec<usize> = (0..root_card)
            .map(|i| ((seed as usize).wrapping_add(i * 17)) % verdict_card)
            .collect();
        let mut seen: Vec<bool> = vec![false; verdict_card];
        for &v in &assignment {
            seen[v] = true;
        }
        prop_assume!(seen.iter().all(|&s| s));

        let csv = table_csv(&assignment);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::File::create(&path).unwrap().write_all(csv.as_bytes()).unwrap();
        let mut cfg = Config::default();
        cfg.search.default_quick = true;
        let a = compile_files(&[path.clone()], None, &cfg).unwrap();
        let b = compile_files(&[path], None, &cfg).unwrap();
        prop_assert_eq!(a, b);
    }
}
