//! # dtc — Decision Table Compiler
//!
//! Compiles RFC 4180 CSV decision tables, given in disjunctive normal form,
//! into a language-neutral pseudocode program. The compiler's job is an
//! optimization problem: among the many binary decision DAGs that correctly
//! classify every row of the input tables, find one of minimum worst-case
//! depth.
//!
//! ## Pipeline
//!
//! ```text
//! *.csv
//!   ↓
//! [Ingestor]              → Fact Graph (Names, Values, Inferences)
//!   ↓
//! [Dependency Analyzer]   → independent values + fire closures
//!   ↓
//! [DAG Builder]           → decision DAG (memoized branch-and-bound search)
//!   ↓
//! [Contradiction Check]   → soundness pass over the built DAG
//!   ↓
//! [Emitter]               → pseudocode (I/O/D/L/T/J/R CSV records)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dtc::{compile_files, Config};
//!
//! let config = Config::load().unwrap_or_default();
//! let output = dtc::compile_files(&[std::path::PathBuf::from("table.csv")], None, &config)?;
//! print!("{output}");
//! ```
//!
//! ## Module Organization
//!
//! | Module         | Purpose                                              |
//! |----------------|-------------------------------------------------------|
//! | `symbol`       | Byte-string interning, canonical ordering             |
//! | `error`        | Fatal error kinds (spec.md §7)                        |
//! | `fact_graph`   | Names, Values, Inferences — the normalized table form |
//! | `ingest`       | CSV parsing into a Fact Graph                         |
//! | `analyzer`     | Independent values and their fire closures             |
//! | `dag_builder`  | The branch-and-bound search (the optimizer)           |
//! | `emitter`      | Pseudocode CSV emission                               |
//! | `driver`       | Pipeline sequencing and the contradiction check        |
//! | `config`       | Hierarchical configuration (figment)                  |

pub mod analyzer;
pub mod config;
pub mod dag_builder;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod fact_graph;
pub mod ingest;
pub mod symbol;

pub use config::Config;
pub use driver::compile_files;
pub use error::DtcError;
