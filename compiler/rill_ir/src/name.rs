//! Interned string identifier.
//!
//! A `Name` is a compact 32-bit handle into the [`StringInterner`]. Two names
//! compare equal iff the strings they intern are identical, so symbol
//! comparison in the evaluator is a single `u32 == u32`.
//!
//! [`StringInterner`]: crate::StringInterner

use std::fmt;

/// Interned string identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from a raw u32 value.
    ///
    /// The value must have been produced by `raw()` on a name from the same
    /// interner; anything else yields a dangling handle.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_raw_round_trip() {
        let name = Name::from_raw(17);
        assert_eq!(name.raw(), 17);
    }

    #[test]
    fn test_name_empty_is_zero() {
        assert_eq!(Name::EMPTY.raw(), 0);
        assert_eq!(Name::default(), Name::EMPTY);
    }

    #[test]
    fn test_name_hash_dedups() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Name::from_raw(1));
        set.insert(Name::from_raw(1));
        set.insert(Name::from_raw(2));
        assert_eq!(set.len(), 2);
    }
}
