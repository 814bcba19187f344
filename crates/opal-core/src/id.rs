//! Hygienic name generation.
//!
//! Every generated scope label and binding identifier is minted from one
//! process-wide counter, so two generated names are never equal no matter
//! which pass invocation produced them. Labels are opaque indices rather
//! than strings: no parser output can ever collide with one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::Ident;

static HYGIENE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Only uniqueness matters, not ordering between threads.
fn next_index() -> u64 {
    HYGIENE_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A scope label for labeled blocks and label-breaks.
///
/// Values exist only through [`Label::fresh`]; the index is the identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Label(u64);

impl Label {
    /// Allocate a label distinct from every other label in this process.
    pub fn fresh() -> Label {
        Label(next_index())
    }

    pub fn index(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'__opal{}", self.0)
    }
}

/// Generate a binding identifier for a given namespace, i.e. "ok" or "err".
///
/// The `__opal_` prefix is reserved; the lexer rejects it in source, so
/// generated identifiers never shadow or collide with user-written ones.
pub fn fresh_ident(subject: &str) -> Ident {
    Ident::new(format!("__opal_{}{}", subject, next_index()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generates_fresh_labels() {
        let a = Label::fresh();
        let b = Label::fresh();
        let c = Label::fresh();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn generates_fresh_idents_per_subject() {
        let ok = fresh_ident("ok");
        let err = fresh_ident("err");
        let ok2 = fresh_ident("ok");

        assert_ne!(ok, err);
        assert_ne!(ok, ok2);
        assert!(ok.as_str().starts_with("__opal_ok"));
        assert!(err.as_str().starts_with("__opal_err"));
    }

    #[test]
    fn labels_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..64).map(|_| Label::fresh()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for label in handle.join().unwrap() {
                assert!(seen.insert(label), "duplicate label {label}");
            }
        }
        assert_eq!(seen.len(), 8 * 64);
    }
}
