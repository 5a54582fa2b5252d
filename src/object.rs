//! String interning for compiled constants.
//!
//! String literals and global names are interned so every distinct content
//! is stored once and compared by handle.

use lasso::{Rodeo, Spur};
use log::trace;
use std::fmt;

/// Handle to an interned string.  Comparing two handles is an integer
/// comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InternedString(Spur);

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedString({:?})", self.0)
    }
}

/// Deduplicating string store owned by one compilation session.
#[derive(Default)]
pub struct StringInterner {
    rodeo: Rodeo,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Intern `s`, returning the existing handle if the content was seen
    /// before.
    #[inline]
    pub fn intern(&mut self, s: &str) -> InternedString {
        trace!("Interning {:?}", s);

        InternedString(self.rodeo.get_or_intern(s))
    }

    /// Look up an already-interned string without interning it if absent.
    #[inline]
    pub fn get(&self, s: &str) -> Option<InternedString> {
        self.rodeo.get(s).map(InternedString)
    }

    /// Resolve a handle back to its content.
    #[inline]
    pub fn resolve(&self, key: InternedString) -> &str {
        self.rodeo.resolve(&key.0)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates_by_content() {
        let mut interner = StringInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.resolve(a), "hello");
        assert_eq!(interner.resolve(c), "world");
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut interner = StringInterner::new();
        assert!(interner.get("hello").is_none());
        assert!(interner.is_empty());

        let a = interner.intern("hello");
        assert_eq!(interner.get("hello"), Some(a));
    }

    #[test]
    fn test_empty_string_is_internable() {
        let mut interner = StringInterner::new();
        let empty = interner.intern("");

        assert_eq!(interner.resolve(empty), "");
    }
}
