//! String interner backing [`Name`] handles.
//!
//! Provides O(1) interning and lookup with thread-safe access via a single
//! read/write lock. Interned strings are leaked so lookups can hand out
//! `&'static str` without holding the lock.

// Arc is needed for SharedInterner - the interner is shared between the
// lowering pass, the runtime, and the evaluator.
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw()`.
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        // Pre-intern the empty string at index 0 so Name::EMPTY is valid.
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        InternTable {
            map,
            strings: vec![empty],
        }
    }
}

/// Thread-safe string interner.
///
/// Wrap in [`SharedInterner`] to share across the compiler pipeline.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(InternTable::with_empty()),
        }
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.table.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Name::from_raw(idx);
        }

        // Leak to get 'static lifetime; interned strings live for the
        // process lifetime by design.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or(u32::MAX);
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up the string for a `Name`.
    ///
    /// Returns the empty string for a handle not produced by this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        guard
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`StringInterner`].
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a fresh shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    #[inline]
    fn deref(&self) -> &StringInterner {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("x");
        let c = interner.intern("y");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_lookup_round_trip() {
        let interner = StringInterner::new();
        let point = interner.intern("Point");
        assert_eq!(interner.lookup(point), "Point");
    }

    #[test]
    fn test_empty_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn test_shared_interner_clone_shares() {
        let shared = SharedInterner::new();
        let other = shared.clone();
        let a = shared.intern("shared");
        assert_eq!(other.lookup(a), "shared");
    }
}
