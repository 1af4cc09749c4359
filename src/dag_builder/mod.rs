//! # DAG Builder (Optimizer)
//!
//! The heart of the compiler (spec.md §2, ~35% of the source): a
//! recursive, memoized branch-and-bound search that, given a current set
//! of candidate test-values and a set of undischarged inferences, chooses
//! the test-value yielding the shallowest two-branch decision DAG.
//!
//! ```text
//! Analysis (roots + fire closures) -> [DAG Builder] -> DagNode (shared decision DAG)
//! ```
//!
//! Two modes: full search keeps trying candidates for a strictly smaller
//! depth; quick mode (`-q`) takes the first candidate that doesn't get
//! pruned, trading optimality for a single pass per state.

use crate::analyzer::Analysis;
use crate::config::SearchConfig;
use crate::error::DtcError;
use crate::fact_graph::{FactGraph, InferenceId, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A node of the shared decision DAG (spec.md §3). `Leaf` terminates a
/// path with the inferences it resolves; `Branch` tests one Value.
#[derive(Debug)]
pub enum DagNode {
    Leaf {
        verdict: Vec<InferenceId>,
    },
    Branch {
        test: Value,
        true_child: Option<Rc<DagNode>>,
        false_child: Option<Rc<DagNode>>,
        infs_v: Vec<InferenceId>,
        infs_o: Vec<InferenceId>,
        depth: u32,
    },
}

impl DagNode {
    pub fn depth(&self) -> u32 {
        match self {
            DagNode::Leaf { .. } => 0,
            DagNode::Branch { depth, .. } => *depth,
        }
    }
}

/// A subproblem: the candidate test-values still available and the
/// inferences not yet determined along the current path. Both sorted and
/// deduplicated — this is the memoization key (structural equality).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BuildState {
    candidates: Vec<Value>,
    undischarged: Vec<InferenceId>,
}

/// Build cache: memoizes `(candidateValues, undischargedInferences) -> DagNode`
/// so structurally equal subproblems reached via distinct recursive paths
/// share the same node (spec.md §4.5 — this is why the output is a DAG).
#[derive(Default)]
struct BuildCache {
    table: HashMap<BuildState, Rc<DagNode>>,
}

/// Build the decision DAG for `fg` given the Dependency Analyzer's output.
/// `quick` selects the heuristic mode (spec.md §4.5 point 3). `cfg` bounds
/// the recursion (`max_depth`, `DtcError::Oom` beyond it) and optionally
/// logs each state the search visits (`log_candidate_stats`).
pub fn build(fg: &FactGraph, analysis: &Analysis, quick: bool, cfg: &SearchConfig) -> Result<Rc<DagNode>, DtcError> {
    let root = BuildState {
        candidates: analysis.independent.clone(),
        undischarged: (0..fg.inferences.len() as u32).map(InferenceId).collect(),
    };
    let cache = RefCell::new(BuildCache::default());
    build_state(fg, analysis, quick, cfg, &cache, root, 0)
}

#[allow(clippy::too_many_arguments)]
fn build_state(
    fg: &FactGraph,
    analysis: &Analysis,
    quick: bool,
    cfg: &SearchConfig,
    cache: &RefCell<BuildCache>,
    state: BuildState,
    call_depth: usize,
) -> Result<Rc<DagNode>, DtcError> {
    if call_depth > cfg.max_depth {
        return Err(DtcError::Oom);
    }

    if let Some(hit) = cache.borrow().table.get(&state) {
        return Ok(hit.clone());
    }

    if cfg.log_candidate_stats {
        tracing::debug!(
            call_depth,
            candidates = state.candidates.len(),
            undischarged = state.undischarged.len(),
            "dag_builder: visiting state"
        );
    }

    if state.undischarged.is_empty() {
        let leaf = Rc::new(DagNode::Leaf { verdict: Vec::new() });
        cache.borrow_mut().table.insert(state, leaf.clone());
        return Ok(leaf);
    }

    let mut ordered = state.candidates.clone();
    sort_candidates(&mut ordered, &state.candidates, analysis);

    struct Best {
        test: Value,
        infs_v: Vec<InferenceId>,
        infs_o: Vec<InferenceId>,
        true_child: Rc<DagNode>,
        false_child: Rc<DagNode>,
        depth: u32,
    }
    let mut best: Option<Best> = None;

    for v in ordered {
        // Peers are the other still-candidate values of v's Name, not the
        // Name's full global value list: a value already eliminated by an
        // enclosing test (e.g. retesting a Name deeper in the false branch)
        // must not re-enter this test's "other branch" fire union.
        let peers: Vec<Value> = state
            .candidates
            .iter()
            .filter(|p| p.name == v.name && **p != v)
            .cloned()
            .collect();

        let v_fire = analysis.fire(&v);
        let infs_v = resolved_by(&state.undischarged, &v_fire.known, fg);

        let mut peer_known: HashSet<Value> = HashSet::new();
        for p in &peers {
            peer_known.extend(analysis.fire(p).known.iter().cloned());
        }
        let infs_o = resolved_by(&state.undischarged, &peer_known, fg);

        let v_fire_set: HashSet<InferenceId> = v_fire.infs.iter().copied().collect();

        let undischarged_true: Vec<InferenceId> = state
            .undischarged
            .iter()
            .copied()
            .filter(|&i| !premises_intersect(fg, i, &peers))
            .collect();
        let undischarged_false: Vec<InferenceId> = state
            .undischarged
            .iter()
            .copied()
            .filter(|i| !v_fire_set.contains(i))
            .collect();

        let undischarged_true = prune_redundant(&undischarged_true, &infs_v, fg);
        let undischarged_false = prune_redundant(&undischarged_false, &infs_o, fg);

        let mut candidates_true: Vec<Value> = state
            .candidates
            .iter()
            .filter(|c| **c != v && !peers.contains(c))
            .cloned()
            .collect();
        candidates_true.retain(|c| is_referenced(c, &undischarged_true, fg));

        let mut candidates_false: Vec<Value> = state
            .candidates
            .iter()
            .filter(|c| **c != v)
            .cloned()
            .collect();
        candidates_false.retain(|c| is_referenced(c, &undischarged_false, fg));

        if (candidates_true.is_empty() && !undischarged_true.is_empty())
            || (candidates_false.is_empty() && !undischarged_false.is_empty())
        {
            continue;
        }

        let true_child = build_state(
            fg,
            analysis,
            quick,
            cfg,
            cache,
            BuildState {
                candidates: candidates_true,
                undischarged: undischarged_true,
            },
            call_depth + 1,
        )?;
        let false_child = build_state(
            fg,
            analysis,
            quick,
            cfg,
            cache,
            BuildState {
                candidates: candidates_false,
                undischarged: undischarged_false,
            },
            call_depth + 1,
        )?;

        let depth = 1 + true_child.depth().max(false_child.depth());

        let is_better = match &best {
            None => true,
            Some(b) => depth < b.depth,
        };
        if is_better {
            best = Some(Best {
                test: v,
                infs_v,
                infs_o,
                true_child,
                false_child,
                depth,
            });
            if quick {
                break;
            }
        }
    }

    let node = match best {
        Some(b) => Rc::new(DagNode::Branch {
            test: b.test,
            true_child: Some(b.true_child),
            false_child: Some(b.false_child),
            infs_v: b.infs_v,
            infs_o: b.infs_o,
            depth: b.depth,
        }),
        None => Rc::new(DagNode::Leaf {
            verdict: state.undischarged.clone(),
        }),
    };
    cache.borrow_mut().table.insert(state, node.clone());
    Ok(node)
}

/// Two-key candidate order (spec.md §4.4): minimize `|A - B|` where
/// `A = |fire(v)|` and `B` sums `|fire(v')|` over v's peers (balance); tie
/// by maximizing `min(A, B)` (delay); tie by canonical Value order.
fn sort_candidates(candidates: &mut [Value], universe: &[Value], analysis: &Analysis) {
    candidates.sort_by(|a, b| {
        let key_a = candidate_key(a, universe, analysis);
        let key_b = candidate_key(b, universe, analysis);
        key_a
            .0
            .cmp(&key_b.0)
            .then(key_b.1.cmp(&key_a.1))
            .then(a.cmp(b))
    });
}

/// `(|A - B|, min(A, B))` for the sort above. `B` sums over the peers still
/// present in `universe` (the current subproblem's candidates), matching the
/// "other branch" fire union the search itself uses for this state.
fn candidate_key(v: &Value, universe: &[Value], analysis: &Analysis) -> (usize, usize) {
    let a = analysis.fire(v).infs.len();
    let b: usize = universe
        .iter()
        .filter(|p| p.name == v.name && *p != v)
        .map(|p| analysis.fire(p).infs.len())
        .sum();
    (a.abs_diff(b), a.min(b))
}

/// Inferences in `undischarged` whose premises are entirely within `known`,
/// expanded by the single-dependency transitive closure: if `i` is in the
/// result and has result `u`, any `i'` in `undischarged` whose only premise
/// is `u` is added too, recursively (spec.md §4.5).
fn resolved_by(undischarged: &[InferenceId], known: &HashSet<Value>, fg: &FactGraph) -> Vec<InferenceId> {
    let mut resolved: HashSet<InferenceId> = undischarged
        .iter()
        .copied()
        .filter(|&i| fg.inference(i).premises.iter().all(|p| known.contains(p)))
        .collect();

    loop {
        let mut grew = false;
        for &i in &resolved.clone() {
            let u = &fg.inference(i).result;
            for &i2 in undischarged {
                if resolved.contains(&i2) {
                    continue;
                }
                let premises = &fg.inference(i2).premises;
                if premises.len() == 1 && &premises[0] == u {
                    resolved.insert(i2);
                    grew = true;
                }
            }
        }
        if !grew {
            break;
        }
    }

    let mut out: Vec<InferenceId> = resolved.into_iter().collect();
    out.sort();
    out
}

fn premises_intersect(fg: &FactGraph, i: InferenceId, peers: &[Value]) -> bool {
    fg.inference(i).premises.iter().any(|p| peers.contains(p))
}

/// `infsSrpInfs` pruning (spec.md §4.5): remove from a branch's residual
/// any inference whose result *Value* has already been chosen on that same
/// branch — it's a member of `resolved_here` (the set just directly
/// resolved along this same edge), or shares its exact result Value, so
/// resolving it again deeper in the DAG would only re-emit the same `R`.
///
/// This must key on the result Value, not merely the result Name, and on
/// the *same* edge's resolutions, not the opposite one: a Name can be
/// legitimately resolved to different Values under different, still-live
/// premise contexts on the very same branch (S1: `signal=red` resolves
/// `proceed=no`, while `signal=yellow, canStop=yes` resolves `proceed=no`
/// too, and `signal=yellow, canStop=no` resolves `proceed=yes` — pruning
/// by Name alone, or against the opposite edge, would drop the still-live
/// `canStop` distinction entirely).
fn prune_redundant(residual: &[InferenceId], resolved_here: &[InferenceId], fg: &FactGraph) -> Vec<InferenceId> {
    let resolved_values: HashSet<&Value> = resolved_here.iter().map(|&i| &fg.inference(i).result).collect();
    residual
        .iter()
        .copied()
        .filter(|&i| !resolved_values.contains(&fg.inference(i).result))
        .collect()
}

fn is_referenced(candidate: &Value, residual: &[InferenceId], fg: &FactGraph) -> bool {
    residual
        .iter()
        .any(|&i| fg.inference(i).premises.contains(candidate))
}
