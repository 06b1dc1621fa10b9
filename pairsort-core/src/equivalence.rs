/// Tie groups (union-find) and the memo of resolved comparisons.
///
/// Both structures are flat integer arrays indexed by registry position.
/// Cache keys always name live canonical roots: a merge rewrites every key
/// that pointed at the absorbed root.
use tracing::debug;

/// A memoized outcome between two canonical roots.
///
/// `outcome` is from `left`'s point of view: +1 means `left` is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheEntry {
    pub left: usize,
    pub right: usize,
    pub outcome: i8,
}

/// Ordered map from root pairs to signed outcomes.
///
/// Entries stay in insertion order; a rekeyed entry is removed and appended
/// again, so collisions during a merge resolve the same way on every run.
/// Ties are never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonCache {
    entries: Vec<CacheEntry>,
}

impl ComparisonCache {
    pub fn new() -> Self {
        ComparisonCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    fn position(&self, left: usize, right: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.left == left && e.right == right)
    }

    /// Outcome for `(a, b)`, flipping the sign when only `(b, a)` is stored.
    pub fn get(&self, a: usize, b: usize) -> Option<i8> {
        if let Some(pos) = self.position(a, b) {
            return Some(self.entries[pos].outcome);
        }
        self.position(b, a).map(|pos| -self.entries[pos].outcome)
    }

    /// Store an outcome, replacing an existing `(a, b)` entry in place.
    pub fn set(&mut self, a: usize, b: usize, outcome: i8) {
        debug_assert!(outcome == 1 || outcome == -1, "ties are never cached");
        match self.position(a, b) {
            Some(pos) => self.entries[pos].outcome = outcome,
            None => self.entries.push(CacheEntry { left: a, right: b, outcome }),
        }
    }

    /// Point every key that mentions `removed` at `canonical` instead.
    ///
    /// When a rewritten key already exists, the existing entry wins and the
    /// rewritten one is dropped.
    fn rekey(&mut self, removed: usize, canonical: usize) {
        let updates: Vec<(usize, CacheEntry)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.left == removed || e.right == removed)
            .map(|(pos, e)| {
                let moved = CacheEntry {
                    left: if e.left == removed { canonical } else { e.left },
                    right: if e.right == removed { canonical } else { e.right },
                    outcome: e.outcome,
                };
                (pos, moved)
            })
            .collect();

        if updates.is_empty() {
            return;
        }

        // Take out the stale keys first, then re-append in their original order.
        let mut pos_iter = updates.iter().map(|(pos, _)| *pos).peekable();
        let mut idx = 0;
        self.entries.retain(|_| {
            let keep = pos_iter.peek() != Some(&idx);
            if !keep {
                pos_iter.next();
            }
            idx += 1;
            keep
        });

        for (_, moved) in updates {
            if self.position(moved.left, moved.right).is_none() {
                self.entries.push(moved);
            }
        }
    }
}

/// Union-find forest over registry indices plus the comparison memo it keeps
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equivalence {
    parent: Vec<usize>,
    cache: ComparisonCache,
}

impl Equivalence {
    pub fn new(num_items: usize) -> Self {
        Equivalence {
            parent: (0..num_items).collect(),
            cache: ComparisonCache::new(),
        }
    }

    /// Canonical representative of `x`, compressing the path on the way.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Root of `x` without mutating the forest.
    pub fn root_of(&self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        root
    }

    /// Merge the groups of `a` and `b`. The smaller root index survives.
    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        let canonical = root_a.min(root_b);
        let removed = root_a.max(root_b);
        self.parent[removed] = canonical;
        self.cache.rekey(removed, canonical);

        debug!(canonical, removed, "merged tie group");
    }

    /// Outcome of `a` vs `b` if it can be answered without asking:
    /// 0 for the same group, otherwise the cached sign between their roots.
    pub fn known_outcome(&mut self, a: usize, b: usize) -> Option<i8> {
        let rep_a = self.find(a);
        let rep_b = self.find(b);
        if rep_a == rep_b {
            return Some(0);
        }
        self.cache.get(rep_a, rep_b)
    }

    /// Record a human outcome between two canonical roots.
    /// A tie merges the groups; a preference is memoized.
    pub fn record(&mut self, rep_a: usize, rep_b: usize, outcome: i8) {
        if outcome == 0 {
            self.union(rep_a, rep_b);
        } else {
            self.cache.set(rep_a, rep_b, outcome);
        }
    }

    pub fn parent(&self) -> &[usize] {
        &self.parent
    }

    pub fn cache(&self) -> &ComparisonCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_reflexive_initially() {
        let mut eq = Equivalence::new(4);
        for i in 0..4 {
            assert_eq!(eq.find(i), i);
            assert_eq!(eq.known_outcome(i, i), Some(0));
        }
    }

    #[test]
    fn test_union_keeps_smaller_root() {
        let mut eq = Equivalence::new(5);
        eq.union(4, 2);
        assert_eq!(eq.find(4), 2);
        eq.union(3, 4);
        assert_eq!(eq.find(3), 2);
        assert_eq!(eq.parent(), &[0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_tie_transitivity() {
        let mut eq = Equivalence::new(3);
        eq.record(0, 1, 0);
        eq.record(1, 2, 0);
        assert_eq!(eq.known_outcome(0, 2), Some(0));
        assert_eq!(eq.known_outcome(2, 0), Some(0));
        assert!(eq.cache().is_empty());
    }

    #[test]
    fn test_cache_sign_flip() {
        let mut eq = Equivalence::new(3);
        eq.record(0, 2, 1);
        assert_eq!(eq.known_outcome(0, 2), Some(1));
        assert_eq!(eq.known_outcome(2, 0), Some(-1));
        assert_eq!(eq.known_outcome(0, 1), None);
    }

    #[test]
    fn test_union_rekeys_removed_root() {
        let mut eq = Equivalence::new(4);
        eq.record(3, 0, 1); // 3 beats 0
        eq.record(1, 2, -1);
        eq.union(1, 3); // 3 is absorbed into 1

        let entries = eq.cache().entries();
        assert_eq!(entries.len(), 2);
        // The rekeyed entry moved to the end
        assert_eq!(entries[0], CacheEntry { left: 1, right: 2, outcome: -1 });
        assert_eq!(entries[1], CacheEntry { left: 1, right: 0, outcome: 1 });
        assert!(entries.iter().all(|e| e.left != 3 && e.right != 3));
        assert_eq!(eq.known_outcome(3, 0), Some(1));
    }

    #[test]
    fn test_union_collision_keeps_existing_entry() {
        let mut eq = Equivalence::new(6);
        eq.record(1, 5, -1);
        eq.record(2, 5, 1);
        eq.union(2, 1);

        // (2,5) would become (1,5), which already exists; the old value wins
        assert_eq!(
            eq.cache().entries(),
            &[CacheEntry { left: 1, right: 5, outcome: -1 }]
        );
        assert_eq!(eq.known_outcome(2, 5), Some(-1));
    }

    #[test]
    fn test_union_collision_between_rewritten_keys() {
        let mut eq = Equivalence::new(6);
        eq.record(4, 0, 1);
        eq.record(3, 0, -1);
        eq.union(3, 4);
        eq.union(0, 3);
        // After the second merge nothing is stored between distinct roots
        assert_eq!(eq.find(4), 0);
        assert_eq!(eq.known_outcome(4, 0), Some(0));
    }

    #[test]
    fn test_path_compression() {
        let mut eq = Equivalence::new(4);
        eq.union(2, 3);
        eq.union(1, 2);
        eq.union(0, 1);
        assert_eq!(eq.root_of(3), 0);
        eq.find(3);
        assert_eq!(eq.parent(), &[0, 0, 0, 0]);
    }
}
