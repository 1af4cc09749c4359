//! # Emitter
//!
//! Walks the decision DAG once, assigning labels lazily and deduplicating
//! identical `(inference set, DAG node)` pairs at branch targets, then
//! writes the pseudocode as CSV records (spec.md §4.7).
//!
//! ```text
//! DagNode -> [Emitter] -> pseudocode (I/O/D/L/T/J/R records) -> stdout
//! ```
//!
//! Values and names go through the same RFC 4180 quoting the `csv` crate
//! already gives the [`crate::ingest`] side, so a name or value containing
//! a comma or an embedded quote survives intern -> emit unchanged (spec.md
//! §8.6).

use crate::analyzer::Analysis;
use crate::dag_builder::DagNode;
use crate::fact_graph::{FactGraph, InferenceId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Lazily allocates labels for `(edge inference set, target node)` pairs
/// and tracks which have already had their body written, so a repeat
/// occurrence becomes a `J` jump instead of a second copy (spec.md §8.4).
struct LabelAllocator {
    ids: HashMap<(Vec<InferenceId>, usize), u32>,
    written: HashSet<u32>,
    next: u32,
}

impl LabelAllocator {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            written: HashSet::new(),
            next: 1, // 0 is reserved for the program exit (spec.md §4.7).
        }
    }

    fn id_for(&mut self, infs: &[InferenceId], node: &Rc<DagNode>) -> u32 {
        let key = (infs.to_vec(), Rc::as_ptr(node) as *const () as usize);
        *self.ids.entry(key).or_insert_with(|| {
            let id = self.next;
            self.next += 1;
            id
        })
    }

    fn mark_written(&mut self, id: u32) -> bool {
        self.written.insert(id)
    }

    fn is_written(&self, id: u32) -> bool {
        self.written.contains(&id)
    }
}

struct Emitter<'a> {
    fg: &'a FactGraph,
    labels: LabelAllocator,
    records: Vec<Vec<Vec<u8>>>,
}

impl<'a> Emitter<'a> {
    fn push(&mut self, fields: Vec<Vec<u8>>) {
        self.records.push(fields);
    }

    fn field(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    fn emit_universe(&mut self, op: &str, analysis: &Analysis) {
        // Input universe: every independent Name's values.
        let mut seen_names = HashSet::new();
        for v in &analysis.independent {
            if seen_names.insert(v.name) {
                for value in &self.fg.name(v.name).values {
                    self.push(vec![
                        Self::field(op),
                        self.fg.name(v.name).symbol.to_vec(),
                        value.sym.to_vec(),
                    ]);
                }
            }
        }
    }

    fn emit_output_universe(&mut self) {
        // Output universe: every Name that is some inference's result.
        let mut result_names: Vec<_> = self
            .fg
            .inferences
            .iter()
            .map(|inf| inf.result.name)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        result_names.sort();
        for name_id in result_names {
            for value in &self.fg.name(name_id).values {
                self.push(vec![
                    Self::field("O"),
                    self.fg.name(name_id).symbol.to_vec(),
                    value.sym.to_vec(),
                ]);
            }
        }
    }

    fn emit_resolution(&mut self, iid: InferenceId) {
        let inf = self.fg.inference(iid);
        self.push(vec![
            Self::field("R"),
            self.fg.name(inf.result.name).symbol.to_vec(),
            inf.result.sym.to_vec(),
        ]);
    }

    fn emit_resolutions_then_node(&mut self, infs: &[InferenceId], node: &Rc<DagNode>) {
        let mut sorted = infs.to_vec();
        sorted.sort();
        for iid in sorted {
            self.emit_resolution(iid);
        }
        match node.as_ref() {
            DagNode::Leaf { verdict } => {
                let mut verdict = verdict.clone();
                verdict.sort();
                for iid in verdict {
                    self.emit_resolution(iid);
                }
                self.push(vec![Self::field("J"), Self::field("0")]);
            }
            DagNode::Branch { .. } => self.emit_branch(node),
        }
    }

    fn emit_branch(&mut self, node: &Rc<DagNode>) {
        let DagNode::Branch {
            test,
            true_child,
            false_child,
            infs_v,
            infs_o,
            ..
        } = node.as_ref()
        else {
            unreachable!("emit_branch called on a Leaf");
        };
        let true_child = true_child.as_ref().expect("Branch true_child is never absent");
        let false_child = false_child
            .as_ref()
            .expect("Branch false_child is never absent");

        let true_label = self.labels.id_for(infs_v, true_child);
        self.push(vec![
            Self::field("T"),
            self.fg.name(test.name).symbol.to_vec(),
            test.sym.to_vec(),
            Self::field(&true_label.to_string()),
        ]);

        let false_label = self.labels.id_for(infs_o, false_child);
        if self.labels.is_written(false_label) {
            self.push(vec![Self::field("J"), Self::field(&false_label.to_string())]);
        } else {
            self.labels.mark_written(false_label);
            self.push(vec![Self::field("L"), Self::field(&false_label.to_string())]);
            let infs_o = infs_o.clone();
            self.emit_resolutions_then_node(&infs_o, false_child);
        }

        if !self.labels.is_written(true_label) {
            self.labels.mark_written(true_label);
            self.push(vec![Self::field("L"), Self::field(&true_label.to_string())]);
            let infs_v = infs_v.clone();
            self.emit_resolutions_then_node(&infs_v, true_child);
        }
    }
}

/// Emit the pseudocode program for `dag` over `fg`/`analysis` as CSV text.
pub fn emit(fg: &FactGraph, analysis: &Analysis, dag: &Rc<DagNode>) -> Result<String, std::io::Error> {
    let mut emitter = Emitter {
        fg,
        labels: LabelAllocator::new(),
        records: Vec::new(),
    };

    emitter.emit_universe("I", analysis);
    emitter.emit_output_universe();
    emitter.push(vec![
        Emitter::field("D"),
        Emitter::field(&(dag.depth() + 1).to_string()),
    ]);

    emitter.emit_resolutions_then_node(&[], dag);
    emitter.push(vec![Emitter::field("L"), Emitter::field("0")]);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in &emitter.records {
        writer.write_record(record.iter().map(|f| f.as_slice()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
