//! # dtc — Decision Table Compiler CLI
//!
//! ## Usage
//!
//! ```bash
//! dtc [-q] <table.csv> [more-tables.csv ...]
//! ```
//!
//! `-q` requests the quick search mode (first non-pruned candidate rather
//! than the exhaustive minimum-depth search); it overrides `search.default_quick`
//! from configuration for this run only. Compiled pseudocode is written to
//! stdout; diagnostics go to stderr prefixed `dtc:`.

use dtc::{compile_files, Config, DtcError};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let quick_requested = args.iter().any(|a| a == "-q");
    let paths: Vec<PathBuf> = args.iter().filter(|a| a.as_str() != "-q").map(PathBuf::from).collect();

    if paths.is_empty() {
        eprintln!("dtc: usage: dtc [-q] <table.csv> [more-tables.csv ...]");
        return ExitCode::FAILURE;
    }

    init_tracing();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load dtc.toml, using defaults");
        Config::default()
    });

    let quick = if quick_requested { Some(true) } else { None };

    match compile_files(&paths, quick, &config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Format a `DtcError` as `dtc: <path>:<row>: <message>` when it carries a
/// source location, or `dtc: <message>` otherwise.
fn report(err: &DtcError) {
    match err {
        DtcError::CsvSyntax(path, row, _) | DtcError::MalformedTable(path, row, _) => {
            eprintln!("dtc: {}:{}: {}", path.display(), row, err);
        }
        DtcError::Io(path, _) => {
            eprintln!("dtc: {}: {}", path.display(), err);
        }
        DtcError::Contradiction { row_a, row_b, .. } => {
            eprintln!("dtc: {err}");
            eprintln!("  first assigned at {}:{}", row_a.0.display(), row_a.1);
            eprintln!("  conflicts with    {}:{}", row_b.0.display(), row_b.1);
        }
        DtcError::UnderSpecifiedName { .. }
        | DtcError::NoIndependentValues
        | DtcError::PartiallyIndependent { .. }
        | DtcError::Oom => {
            eprintln!("dtc: {err}");
        }
    }
}
