//! # Dependency Analyzer
//!
//! Computes the two artifacts the [`crate::dag_builder`] search consumes:
//! the *independent values* (search roots — no inference has them as a
//! result) and, for each, its `fire` reachability closure (spec.md §4.3).
//!
//! ```text
//! Fact Graph -> [Dependency Analyzer] -> Analysis (roots + fire closures) -> DAG Builder
//! ```

use crate::error::DtcError;
use crate::fact_graph::{FactGraph, InferenceId, NameId, Value};
use std::collections::{HashMap, HashSet, VecDeque};

/// Per-independent-value reachability: the inferences reachable once the
/// value is known (`infs`), and the set of values that closure makes known
/// (`known` — the fixed-point seed, used by the DAG Builder's premise-subset
/// tests; it always contains the value itself).
#[derive(Debug, Clone, Default)]
pub struct Fire {
    pub infs: Vec<InferenceId>,
    pub known: HashSet<Value>,
}

/// The Dependency Analyzer's output: search roots and their fire closures.
#[derive(Debug)]
pub struct Analysis {
    /// Independent values, in canonical order — the DAG Builder's initial
    /// candidate set.
    pub independent: Vec<Value>,
    fire: HashMap<Value, Fire>,
}

impl Analysis {
    /// Fire closure for an independent value. Every candidate the DAG
    /// Builder ever tests is independent (by construction — candidates
    /// only ever shrink from `independent`), so this is always present.
    pub fn fire(&self, v: &Value) -> &Fire {
        self.fire
            .get(v)
            .expect("fire() queried for a value outside the independent set")
    }
}

/// Run the Dependency Analyzer over `fg`.
///
/// Fails with [`DtcError::NoIndependentValues`] if every Name is determined
/// by some inference, or [`DtcError::PartiallyIndependent`] if a Name has
/// some values independent and others not (spec.md §4.3's consistency
/// check — the emitted program cannot represent a partially-determined
/// Name).
pub fn analyze(fg: &FactGraph) -> Result<Analysis, DtcError> {
    let determined: HashSet<&Value> = fg.inferences.iter().map(|inf| &inf.result).collect();

    let mut independent_by_name: HashMap<NameId, Vec<Value>> = HashMap::new();
    for name in &fg.names {
        for value in &name.values {
            if !determined.contains(value) {
                independent_by_name.entry(value.name).or_default().push(value.clone());
            }
        }
    }

    for name in &fg.names {
        let independent_count = independent_by_name.get(&name.values[0].name).map_or(0, Vec::len);
        if independent_count > 0 && independent_count != name.values.len() {
            return Err(DtcError::PartiallyIndependent {
                name: String::from_utf8_lossy(&name.symbol).into_owned(),
            });
        }
    }

    let mut independent: Vec<Value> = independent_by_name.into_values().flatten().collect();
    independent.sort();

    if independent.is_empty() {
        return Err(DtcError::NoIndependentValues);
    }

    // Index: premise Value -> inferences that carry it as a premise, so the
    // fire closure's BFS doesn't rescan every inference at every step.
    let mut premise_index: HashMap<Value, Vec<InferenceId>> = HashMap::new();
    for (idx, inf) in fg.inferences.iter().enumerate() {
        for premise in &inf.premises {
            premise_index
                .entry(premise.clone())
                .or_default()
                .push(InferenceId(idx as u32));
        }
    }

    let mut fire = HashMap::new();
    for v in &independent {
        fire.insert(v.clone(), compute_fire(fg, &premise_index, v));
    }

    Ok(Analysis { independent, fire })
}

/// Seed with `{v}`; an inference is reachable when one of its premises is
/// in the seed; adding it adds its result Value to the seed; repeat to a
/// fixed point (spec.md §4.3, the pinned "transitive closure" reading of
/// the Open Question in spec.md §9).
fn compute_fire(fg: &FactGraph, premise_index: &HashMap<Value, Vec<InferenceId>>, v: &Value) -> Fire {
    let mut known: HashSet<Value> = HashSet::new();
    known.insert(v.clone());
    let mut infs_seen: HashSet<InferenceId> = HashSet::new();
    let mut infs: Vec<InferenceId> = Vec::new();
    let mut frontier: VecDeque<Value> = VecDeque::new();
    frontier.push_back(v.clone());

    while let Some(u) = frontier.pop_front() {
        let Some(candidates) = premise_index.get(&u) else {
            continue;
        };
        for &iid in candidates {
            if !infs_seen.insert(iid) {
                continue;
            }
            infs.push(iid);
            let result = fg.inference(iid).result.clone();
            if known.insert(result.clone()) {
                frontier.push_back(result);
            }
        }
    }

    infs.sort();
    Fire { infs, known }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact_graph::FactGraphBuilder;

    fn build_traffic_light() -> FactGraph {
        let mut b = FactGraphBuilder::new();
        let proceed = b.get_or_create_name(b.intern(b"proceed"));
        let signal = b.get_or_create_name(b.intern(b"signal"));
        let can_stop = b.get_or_create_name(b.intern(b"canStop"));

        let yes = b.get_or_create_value(proceed, b.intern(b"yes"));
        let no = b.get_or_create_value(proceed, b.intern(b"no"));
        let green = b.get_or_create_value(signal, b.intern(b"green"));
        let red = b.get_or_create_value(signal, b.intern(b"red"));
        let yellow = b.get_or_create_value(signal, b.intern(b"yellow"));
        let cs_yes = b.get_or_create_value(can_stop, b.intern(b"yes"));
        let cs_no = b.get_or_create_value(can_stop, b.intern(b"no"));

        b.add_inference(yes.clone(), vec![green], ("s1.csv".into(), 2)).unwrap();
        b.add_inference(no.clone(), vec![red], ("s1.csv".into(), 3)).unwrap();
        b.add_inference(yes, vec![yellow.clone(), cs_no], ("s1.csv".into(), 5)).unwrap();
        b.add_inference(no, vec![yellow, cs_yes], ("s1.csv".into(), 6)).unwrap();

        b.finish().unwrap()
    }

    #[test]
    fn independent_values_are_signal_and_can_stop() {
        let fg = build_traffic_light();
        let analysis = analyze(&fg).unwrap();
        // proceed is fully determined; signal and canStop are the roots.
        assert_eq!(analysis.independent.len(), 5);
        for v in &analysis.independent {
            assert_ne!(fg.name_symbol_str(v.name), "proceed");
        }
    }

    #[test]
    fn fire_closure_includes_transitive_consequences() {
        let fg = build_traffic_light();
        let analysis = analyze(&fg).unwrap();
        let green = analysis
            .independent
            .iter()
            .find(|v| fg.value_symbol_str(v) == "green")
            .unwrap();
        let fire = analysis.fire(green);
        assert_eq!(fire.infs.len(), 1);
    }
}
