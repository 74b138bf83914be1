//! Directed dependency edges between variables and the reach computation
//! behind change propagation.
//!
//! The map records parent → dependent (child) edges. It is directed but not
//! necessarily acyclic: authoring surfaces happily wire `a → b → a`, and the
//! engine neutralizes cycles structurally instead of rejecting them.
//!
//! # Invariants
//!
//! 1. No duplicate child entries per parent; registration is idempotent.
//! 2. A missing key is equivalent to an empty dependent set.
//! 3. [`reachable_dependents`](DependencyMap::reachable_dependents) visits
//!    each reachable node at most once and terminates on any graph,
//!    including cyclic ones (explicit worklist + visited set, no recursion).
//! 4. The start node is not pre-seeded into the visited set, so a cycle
//!    back to it revisits it exactly once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unregister of absent edge | Stale caller | No-op |
//! | Edge to a deleted variable | `delete_variable` does not cascade | Edge kept; consumers skip missing targets |
//! | Cycle | Authoring wiring | Bounded single visit per node |

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

type Map<V> = HashMap<String, V, RandomState>;

/// Parent → dependents mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyMap {
    edges: Map<Vec<String>>,
}

impl DependencyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` depends on `parent`. Idempotent.
    pub fn register(&mut self, parent: &str, child: &str) {
        let children = self.edges.entry(parent.to_owned()).or_default();
        if !children.iter().any(|c| c == child) {
            children.push(child.to_owned());
        }
    }

    /// Remove the `parent → child` edge if present; absent edges are a no-op.
    pub fn unregister(&mut self, parent: &str, child: &str) {
        if let Some(children) = self.edges.get_mut(parent) {
            children.retain(|c| c != child);
            if children.is_empty() {
                self.edges.remove(parent);
            }
        }
    }

    /// Direct dependents of `parent`, in registration order.
    #[must_use]
    pub fn dependents_of(&self, parent: &str) -> &[String] {
        self.edges.get(parent).map_or(&[], Vec::as_slice)
    }

    /// Whether any edges are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of parents with at least one dependent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Iterate `(parent, dependents)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every dependent reachable from `start`, each visited exactly once,
    /// in breadth-first worklist order.
    ///
    /// `start` itself appears in the result only if an edge chain cycles
    /// back to it.
    #[must_use]
    pub fn reachable_dependents(&self, start: &str) -> Vec<String> {
        let mut visited: HashSet<String, RandomState> = HashSet::default();
        let mut order = Vec::new();
        let mut queue: VecDeque<String> =
            self.dependents_of(start).iter().cloned().collect();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            for child in self.dependents_of(&name) {
                if !visited.contains(child) {
                    queue.push_back(child.clone());
                }
            }
            order.push(name);
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── Edge bookkeeping ────────────────────────────────────────────

    #[test]
    fn register_is_idempotent() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("a", "b");
        assert_eq!(deps.dependents_of("a"), ["b"]);
    }

    #[test]
    fn register_preserves_order() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("a", "c");
        deps.register("a", "b");
        assert_eq!(deps.dependents_of("a"), ["b", "c"]);
    }

    #[test]
    fn unregister_removes_edge() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.unregister("a", "b");
        assert!(deps.dependents_of("a").is_empty());
        assert!(deps.is_empty());
    }

    #[test]
    fn unregister_absent_edge_is_noop() {
        let mut deps = DependencyMap::new();
        deps.unregister("a", "b");
        deps.register("a", "b");
        deps.unregister("a", "missing");
        assert_eq!(deps.dependents_of("a"), ["b"]);
    }

    #[test]
    fn missing_key_is_empty_set() {
        let deps = DependencyMap::new();
        assert!(deps.dependents_of("nobody").is_empty());
    }

    // ── Reachability ────────────────────────────────────────────────

    #[test]
    fn reach_covers_transitive_dependents() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("b", "c");
        deps.register("c", "d");
        assert_eq!(deps.reachable_dependents("a"), ["b", "c", "d"]);
    }

    #[test]
    fn two_node_cycle_visits_both_once() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("b", "a");
        let order = deps.reachable_dependents("a");
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn self_loop_visits_self_once() {
        let mut deps = DependencyMap::new();
        deps.register("a", "a");
        assert_eq!(deps.reachable_dependents("a"), ["a"]);
    }

    #[test]
    fn diamond_visits_shared_node_once() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("a", "c");
        deps.register("b", "d");
        deps.register("c", "d");
        assert_eq!(deps.reachable_dependents("a"), ["b", "c", "d"]);
    }

    #[test]
    fn serde_round_trip() {
        let mut deps = DependencyMap::new();
        deps.register("a", "b");
        deps.register("a", "c");
        let text = serde_json::to_string(&deps).unwrap();
        let back: DependencyMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back, deps);
    }

    // ── Properties ──────────────────────────────────────────────────

    proptest! {
        /// Reach terminates on arbitrary (cyclic) graphs and never visits
        /// a node twice.
        #[test]
        fn reach_terminates_without_duplicates(
            edges in proptest::collection::vec((0u8..12, 0u8..12), 0..60)
        ) {
            let mut deps = DependencyMap::new();
            for (p, c) in &edges {
                deps.register(&format!("v{p}"), &format!("v{c}"));
            }
            let order = deps.reachable_dependents("v0");
            let unique: std::collections::HashSet<_> = order.iter().collect();
            prop_assert_eq!(unique.len(), order.len());
            prop_assert!(order.len() <= 12);
        }
    }
}
