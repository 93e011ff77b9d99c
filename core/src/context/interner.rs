//! Process-wide string interner for skill names.
//!
//! Skill names repeat on every hit; ledgers key on the interned handle and
//! snapshots resolve it back to text.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

/// Interned string handle. Cheap to copy, hash and compare.
pub type IStr = Spur;

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Intern a string, returning its handle.
pub fn intern(s: &str) -> IStr {
    INTERNER.get_or_intern(s)
}

/// Resolve a handle back to its text.
pub fn resolve(key: IStr) -> &'static str {
    INTERNER.resolve(&key)
}

/// Handle for the empty string.
pub fn empty_istr() -> IStr {
    intern("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let a = intern("(dot) fire");
        let b = intern("(dot) fire");
        assert_eq!(a, b);
        assert_eq!(resolve(a), "(dot) fire");
        assert_ne!(a, empty_istr());
    }
}
