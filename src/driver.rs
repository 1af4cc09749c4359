//! # Driver
//!
//! Sequences the compile pipeline: Ingest -> validate -> analyze -> build ->
//! check -> emit. One [`tracing::info_span`] per phase so a `RUST_LOG=dtc=debug`
//! run shows where time and candidates went.
//!
//! ```text
//! *.csv -> [Ingestor] -> [Analyzer] -> [DAG Builder] -> [Contradiction Check] -> [Emitter] -> pseudocode
//! ```

use crate::analyzer::{self, Analysis};
use crate::config::Config;
use crate::dag_builder::{self, DagNode};
use crate::emitter;
use crate::error::DtcError;
use crate::fact_graph::{FactGraph, InferenceId, NameId};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info_span;

/// Run the full pipeline over `paths` and return the emitted pseudocode.
///
/// `quick` overrides `cfg.search.default_quick` when `Some`.
pub fn compile_files(paths: &[PathBuf], quick: Option<bool>, cfg: &Config) -> Result<String, DtcError> {
    let fg = {
        let _span = info_span!("ingest", files = paths.len()).entered();
        crate::ingest::ingest_files(paths)?
    };

    let analysis = {
        let _span = info_span!("analyze", names = fg.names.len(), inferences = fg.inferences.len()).entered();
        analyzer::analyze(&fg)?
    };

    let quick = quick.unwrap_or(cfg.search.default_quick);
    let dag = {
        let _span = info_span!("build", quick, roots = analysis.independent.len()).entered();
        dag_builder::build(&fg, &analysis, quick, &cfg.search)?
    };

    {
        let _span = info_span!("check").entered();
        check_contradictions(&fg, &dag)?;
    }

    let output = {
        let _span = info_span!("emit").entered();
        emitter::emit(&fg, &analysis, &dag).map_err(|e| DtcError::Io(PathBuf::from("<stdout>"), e))?
    };

    Ok(output)
}

/// Post-build soundness check (spec.md §4.6): no two inferences resolved
/// together on the same path may assign different values to the same
/// result Name. The DAG Builder's `infsSrpInfs` pruning is meant to prevent
/// this, but a violation means a malformed table slipped through analysis
/// (e.g. an inference pair the independent-value check didn't catch), so it
/// is still reported as a fatal, attributable error rather than asserted
/// away.
fn check_contradictions(fg: &FactGraph, dag: &Rc<DagNode>) -> Result<(), DtcError> {
    match dag.as_ref() {
        DagNode::Leaf { verdict } => check_group(fg, verdict),
        DagNode::Branch {
            true_child,
            false_child,
            infs_v,
            infs_o,
            ..
        } => {
            check_group(fg, infs_v)?;
            check_group(fg, infs_o)?;
            if let Some(child) = true_child {
                check_contradictions(fg, child)?;
            }
            if let Some(child) = false_child {
                check_contradictions(fg, child)?;
            }
            Ok(())
        }
    }
}

/// Within one group of inferences resolved together along a single edge,
/// no result Name may appear with two different result Values.
fn check_group(fg: &FactGraph, group: &[InferenceId]) -> Result<(), DtcError> {
    let mut by_name: std::collections::HashMap<NameId, InferenceId> = std::collections::HashMap::new();
    for &iid in group {
        let result = &fg.inference(iid).result;
        if let Some(&prior) = by_name.get(&result.name) {
            let prior_result = &fg.inference(prior).result;
            if prior_result.sym != result.sym {
                return Err(DtcError::Contradiction {
                    name: fg.name_symbol_str(result.name),
                    row_a: fg.inference(prior).source.clone(),
                    row_b: fg.inference(iid).source.clone(),
                });
            }
        } else {
            by_name.insert(result.name, iid);
        }
    }
    Ok(())
}
