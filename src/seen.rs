//! The set of fingerprints already emitted.

use crate::fingerprint::Fingerprint;
use rustc_hash::FxHashSet;

/// Grow-only set of emitted fingerprints.
///
/// Owned by the driver loop and never shared, so it carries no locking.
/// There is no removal: once a record has been emitted, every later
/// byte-identical record is suppressed for the rest of the run.
#[derive(Debug, Default)]
pub struct SeenSet {
    hashes: FxHashSet<Fingerprint>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a fingerprint has been recorded.
    #[inline]
    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.hashes.contains(fp)
    }

    /// Record a fingerprint. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, fp: Fingerprint) -> bool {
        self.hashes.insert(fp)
    }

    /// Number of distinct fingerprints recorded.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    #[test]
    fn test_insert_then_contains() {
        let mut seen = SeenSet::new();
        let fp = fingerprint(b"a\n");

        assert!(seen.is_empty());
        assert!(!seen.contains(&fp));
        assert!(seen.insert(fp));
        assert!(seen.contains(&fp));
        assert!(!seen.insert(fp));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_distinct_records() {
        let mut seen = SeenSet::new();
        seen.insert(fingerprint(b"a\n"));
        assert!(!seen.contains(&fingerprint(b"a")));
        assert!(!seen.contains(&fingerprint(b"b\n")));
    }
}
