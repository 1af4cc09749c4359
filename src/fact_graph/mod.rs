//! # Fact Graph
//!
//! The normalized representation of every table the [`crate::ingest`] stage
//! reads: [`Name`]s (variables), [`Value`]s (name + symbol), and
//! [`Inference`]s (one row: a determined value plus its prerequisite
//! values). Owned by the driver for the whole compile; sorted-vector sets
//! throughout per the project's house style (binary-search insertion,
//! linear-merge set ops — no hash-based collections for these).
//!
//! ```text
//! CSV rows -> [Ingestor] -> Fact Graph -> [Dependency Analyzer] -> ...
//! ```

use crate::error::{DtcError, MalformedTableKind, SourceLoc};
use crate::symbol::{Symbol, SymbolPool};
use std::collections::HashMap;

/// Index of a [`Name`] in [`FactGraph::names`]. Doubles as the Name's
/// position in canonical Name order (assigned in first-sight order, which is
/// deterministic given argument order and row order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameId(pub u32);

/// Index of an [`Inference`] in [`FactGraph::inferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InferenceId(pub u32);

/// A variable and the ordered set of values it may take.
#[derive(Debug, Clone)]
pub struct Name {
    pub symbol: Symbol,
    pub values: Vec<Value>,
}

/// A (Name, Symbol) pair. `Ord` is `(name, sym)` — the canonical Value order
/// the rest of the compiler relies on for sorted-vector sets and for the
/// search heuristic's tie-break (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value {
    pub name: NameId,
    pub sym: Symbol,
}

/// One row of one subtable: a result [`Value`] plus the set of premise
/// [`Value`]s whose presence determines it.
///
/// Equality and ordering ignore `source` — two inferences are equal (and a
/// duplicate is a compile error) iff their result and premises are equal,
/// regardless of which file/row produced them.
#[derive(Debug, Clone)]
pub struct Inference {
    pub result: Value,
    pub premises: Vec<Value>,
    pub source: SourceLoc,
}

impl PartialEq for Inference {
    fn eq(&self, other: &Self) -> bool {
        self.result == other.result && self.premises == other.premises
    }
}
impl Eq for Inference {}

/// The tuple (Symbol Pool, Names, Inferences) — everything ingest produces
/// and everything later stages read. Immutable after [`FactGraphBuilder::finish`].
#[derive(Debug)]
pub struct FactGraph {
    pub pool: SymbolPool,
    pub names: Vec<Name>,
    pub inferences: Vec<Inference>,
}

impl FactGraph {
    pub fn name(&self, id: NameId) -> &Name {
        &self.names[id.0 as usize]
    }

    pub fn inference(&self, id: InferenceId) -> &Inference {
        &self.inferences[id.0 as usize]
    }

    pub fn name_symbol_str(&self, id: NameId) -> String {
        String::from_utf8_lossy(&self.name(id).symbol).into_owned()
    }

    pub fn value_symbol_str(&self, v: &Value) -> String {
        String::from_utf8_lossy(&v.sym).into_owned()
    }
}

/// Incrementally assembled by [`crate::ingest`], then frozen into a
/// [`FactGraph`]. Owns the mutable phase of the compile's shared state
/// (spec §5: append-only during ingest, no locking needed).
#[derive(Debug, Default)]
pub struct FactGraphBuilder {
    pool: SymbolPool,
    names: Vec<Name>,
    name_index: HashMap<Symbol, NameId>,
    inferences: Vec<Inference>,
    /// Dedup index: (result, premises) -> first source location, for
    /// reporting which earlier row a duplicate collides with.
    inference_index: HashMap<(Value, Vec<Value>), SourceLoc>,
}

impl FactGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `bytes` through the shared pool.
    pub fn intern(&mut self, bytes: &[u8]) -> Symbol {
        self.pool.intern(bytes)
    }

    /// Look up an existing Name by symbol, if any.
    pub fn find_name(&self, sym: &Symbol) -> Option<NameId> {
        self.name_index.get(sym).copied()
    }

    /// Get-or-create a Name for `sym`, in first-sight order.
    pub fn get_or_create_name(&mut self, sym: Symbol) -> NameId {
        if let Some(&id) = self.name_index.get(&sym) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(Name {
            symbol: sym.clone(),
            values: Vec::new(),
        });
        self.name_index.insert(sym, id);
        id
    }

    /// Get-or-create a Value of `name_id` with symbol `sym`, inserting it
    /// into the Name's value list at its canonical (sorted) position if new.
    pub fn get_or_create_value(&mut self, name_id: NameId, sym: Symbol) -> Value {
        let value = Value { name: name_id, sym };
        let values = &mut self.names[name_id.0 as usize].values;
        match values.binary_search(&value) {
            Ok(_) => value,
            Err(pos) => {
                values.insert(pos, value.clone());
                value
            }
        }
    }

    /// Add an inference, deduplicating by (result, premises). Returns an
    /// error naming the colliding row if this is an exact duplicate.
    pub fn add_inference(
        &mut self,
        mut result: Value,
        mut premises: Vec<Value>,
        source: SourceLoc,
    ) -> Result<(), DtcError> {
        premises.sort();
        premises.dedup();
        result = self.get_or_create_value(result.name, result.sym);

        let key = (result.clone(), premises.clone());
        if let Some(prior) = self.inference_index.get(&key) {
            return Err(DtcError::MalformedTable(
                source.0,
                source.1,
                MalformedTableKind::DuplicateInference(prior.0.clone(), prior.1),
            ));
        }
        self.inference_index.insert(key, source.clone());
        self.inferences.push(Inference {
            result,
            premises,
            source,
        });
        Ok(())
    }

    /// Freeze the builder into an immutable [`FactGraph`], checking the
    /// `Name has >= 2 values` invariant (`UnderSpecifiedName`).
    pub fn finish(self) -> Result<FactGraph, DtcError> {
        for name in &self.names {
            if name.values.len() < 2 {
                return Err(DtcError::UnderSpecifiedName {
                    name: String::from_utf8_lossy(&name.symbol).into_owned(),
                });
            }
        }
        Ok(FactGraph {
            pool: self.pool,
            names: self.names,
            inferences: self.inferences,
        })
    }
}
