//! # Symbol Pool
//!
//! Interns byte strings for the whole compile. Two equal byte strings seen
//! anywhere in the input — a Name, a cell value, a premise — become the same
//! [`Symbol`], so downstream comparisons are pointer-cheap instead of
//! byte-for-byte.
//!
//! ```text
//! CSV bytes -> [Symbol Pool] -> Symbol (shared, Ord by content)
//! ```

use std::collections::HashMap;
use std::rc::Rc;

/// An interned, immutable byte string.
///
/// `Ord` is lexicographic on bytes, then by length on an equal prefix —
/// `Rc<[u8]>` gives us this for free via slice comparison, which is also the
/// canonical order the rest of the compiler relies on (Names, Values,
/// Inferences all sort transitively through `Symbol`).
pub type Symbol = Rc<[u8]>;

/// Interns byte strings for the duration of one compile.
///
/// Re-interning an equal byte string returns the existing instance; the
/// pool never grows for a symbol already seen (§8.5 idempotence).
#[derive(Debug, Default)]
pub struct SymbolPool {
    table: HashMap<Rc<[u8]>, Symbol>,
}

impl SymbolPool {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Intern `bytes`, returning the shared [`Symbol`].
    pub fn intern(&mut self, bytes: &[u8]) -> Symbol {
        if let Some(existing) = self.table.get(bytes) {
            return existing.clone();
        }
        let sym: Symbol = Rc::from(bytes);
        self.table.insert(sym.clone(), sym.clone());
        sym
    }

    /// Number of distinct symbols interned so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut pool = SymbolPool::new();
        let a = pool.intern(b"green");
        let b = pool.intern(b"green");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn canonical_order_is_lexicographic_then_length() {
        let mut pool = SymbolPool::new();
        let short = pool.intern(b"a");
        let long = pool.intern(b"aa");
        let other = pool.intern(b"b");
        assert!(short < long);
        assert!(long < other);
    }
}
