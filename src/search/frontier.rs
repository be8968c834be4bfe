use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::PlannerError;

/// Index of a node in the per-run arena.
pub type NodeId = usize;

/// How repeated insertions of the same key are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Accept every push; skip closed keys when popping.
    #[default]
    LazyRemoval,
    /// Reject pushes that are not strictly cheaper than any seen so far.
    /// Closed keys are never accepted again.
    SemiDuplicateDetection,
    /// Reject pushes that are not strictly cheaper, but let a cheaper push
    /// reopen a closed key.
    Reexpansion,
}

impl FromStr for DuplicatePolicy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lazy" | "lazy_removal" => Ok(DuplicatePolicy::LazyRemoval),
            "sdd" | "semi_duplicate_detection" => Ok(DuplicatePolicy::SemiDuplicateDetection),
            "reexpansion" => Ok(DuplicatePolicy::Reexpansion),
            other => Err(PlannerError::InvalidValue(format!(
                "unknown duplicate policy {:?}, expected lazy, sdd or reexpansion",
                other
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicatePolicy::LazyRemoval => "lazy",
            DuplicatePolicy::SemiDuplicateDetection => "sdd",
            DuplicatePolicy::Reexpansion => "reexpansion",
        };
        write!(f, "{}", name)
    }
}

/// Lexicographic priority `(f, -g)`: lower `f`, then higher `g` comes first.
/// Remaining ties go to the earlier insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priority {
    pub f: f64,
    pub g: f64,
}

impl Priority {
    pub fn new(f: f64, g: f64) -> Self {
        Priority { f, g }
    }
}

#[derive(Debug)]
struct Entry<K> {
    priority: Priority,
    seq: u64,
    key: K,
    node: NodeId,
}

impl<K> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so the preferred entry compares greater.
        other
            .priority
            .f
            .total_cmp(&self.priority.f)
            .then_with(|| self.priority.g.total_cmp(&other.priority.g))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for Entry<K> {}

/// Open and closed sets of one search run.
pub struct SearchFrontier<K> {
    policy: DuplicatePolicy,
    open: BinaryHeap<Entry<K>>,
    closed: FxHashSet<K>,
    best_g: FxHashMap<K, f64>,
    seq: u64,
}

impl<K: Copy + Eq + Hash> SearchFrontier<K> {
    pub fn new(policy: DuplicatePolicy) -> Self {
        SearchFrontier {
            policy,
            open: BinaryHeap::new(),
            closed: FxHashSet::default(),
            best_g: FxHashMap::default(),
            seq: 0,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Offer a node. Returns whether the policy accepted it.
    pub fn push(&mut self, key: K, priority: Priority, node: NodeId) -> bool {
        match self.policy {
            DuplicatePolicy::LazyRemoval => {}
            DuplicatePolicy::SemiDuplicateDetection | DuplicatePolicy::Reexpansion => {
                if let Some(&best) = self.best_g.get(&key) {
                    if best <= priority.g {
                        return false;
                    }
                }
                self.best_g.insert(key, priority.g);
                if self.policy == DuplicatePolicy::Reexpansion {
                    self.closed.remove(&key);
                }
            }
        }
        self.insert(key, priority, node);
        true
    }

    /// Insert unconditionally, e.g. after a node's cost was corrected upward.
    pub fn reinsert(&mut self, key: K, priority: Priority, node: NodeId) {
        if self.policy != DuplicatePolicy::LazyRemoval {
            self.best_g.insert(key, priority.g);
        }
        self.insert(key, priority, node);
    }

    fn insert(&mut self, key: K, priority: Priority, node: NodeId) {
        self.seq += 1;
        self.open.push(Entry {
            priority,
            seq: self.seq,
            key,
            node,
        });
    }

    /// Best open node, skipping entries whose key has been closed since.
    pub fn pop_best(&mut self) -> Option<(K, NodeId)> {
        while let Some(entry) = self.open.pop() {
            if self.closed.contains(&entry.key) {
                continue;
            }
            return Some((entry.key, entry.node));
        }
        None
    }

    pub fn mark_closed(&mut self, key: K) {
        self.closed.insert(key);
        if self.policy == DuplicatePolicy::SemiDuplicateDetection {
            self.best_g.insert(key, f64::NEG_INFINITY);
        }
    }

    pub fn is_closed(&self, key: &K) -> bool {
        self.closed.contains(key)
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Open entries plus closed keys.
    pub fn size(&self) -> usize {
        self.open.len() + self.closed.len()
    }
}
