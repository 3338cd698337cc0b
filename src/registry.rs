use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::config::ExpandedTracking;
use crate::model::NodeId;
use crate::node::TreeNodeState;

/// Shared handle to one node's state. Owned by the mounted tree.
pub type NodeHandle = Rc<RefCell<TreeNodeState>>;

/// Central lookup from node identifier to node state, plus the expanded list.
///
/// The registry only holds weak references: dropping the mounted tree makes every
/// handle unreachable even if it was never unregistered.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    items: FxHashMap<NodeId, Weak<RefCell<TreeNodeState>>>,
    // Insertion order matters: bulk collapse walks it from the tail.
    expanded: Vec<NodeId>,
    // Members of `expanded`, kept only under `ExpandedTracking::Set`.
    expanded_set: FxHashSet<NodeId>,
    tracking: ExpandedTracking,
}

impl NodeRegistry {
    pub fn new(tracking: ExpandedTracking) -> Self {
        Self::with_capacity(0, tracking)
    }

    pub fn with_capacity(capacity: usize, tracking: ExpandedTracking) -> Self {
        Self {
            items: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            expanded: Vec::new(),
            expanded_set: FxHashSet::default(),
            tracking,
        }
    }

    pub const fn tracking(&self) -> ExpandedTracking {
        self.tracking
    }

    /// Registers a handle under `id`, replacing any previous entry.
    ///
    /// Returns `true` if a live handle was replaced, which means the payload
    /// contained a duplicate identifier.
    pub fn register(&mut self, id: NodeId, handle: &NodeHandle) -> bool {
        let replaced = self
            .items
            .get(&id)
            .is_some_and(|weak| weak.strong_count() > 0);
        if replaced {
            tracing::warn!(
                node_id = %id,
                "duplicate node identifier registered; previous node is no longer reachable"
            );
        }
        self.items.insert(id, Rc::downgrade(handle));
        replaced
    }

    /// Removes the entry for `id`. Returns `true` if there was one.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.items.remove(id).is_some()
    }

    /// Returns the live handle registered under `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<NodeHandle> {
        self.items.get(id).and_then(Weak::upgrade)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// Records `id` as expanded.
    pub fn record_expanded(&mut self, id: &NodeId) {
        match self.tracking {
            ExpandedTracking::Log => self.expanded.push(id.clone()),
            ExpandedTracking::Set => {
                if self.expanded_set.insert(id.clone()) {
                    self.expanded.push(id.clone());
                }
            }
        }
    }

    /// Removes every occurrence of `id` from the expanded list.
    pub fn forget_expanded(&mut self, id: &str) {
        match self.tracking {
            ExpandedTracking::Log => self.expanded.retain(|entry| entry.as_str() != id),
            ExpandedTracking::Set => {
                if self.expanded_set.remove(id)
                    && let Some(pos) = self.expanded.iter().position(|entry| entry.as_str() == id)
                {
                    self.expanded.remove(pos);
                }
            }
        }
    }

    pub fn clear_expanded(&mut self) {
        self.expanded.clear();
        self.expanded_set.clear();
    }

    /// Expanded identifiers in the order they were recorded.
    pub fn expanded_identifiers(&self) -> &[NodeId] {
        &self.expanded
    }

    /// Drops entries whose node state no longer exists. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|_, weak| weak.strong_count() > 0);
        before - self.items.len()
    }

    /// Number of entries, including ones whose node has been dropped.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: &str) -> NodeHandle {
        Rc::new(RefCell::new(TreeNodeState::new(NodeId::from(id), None, 0)))
    }

    #[test]
    fn lookup_of_unknown_identifier_is_absent() {
        let registry = NodeRegistry::default();

        assert!(registry.lookup("commodity:0101").is_none());
        assert!(!registry.contains("root"));
    }

    #[test]
    fn register_overwrites_and_reports_live_duplicates() {
        let mut registry = NodeRegistry::default();
        let first = handle("a");
        let second = handle("a");

        assert!(!registry.register(NodeId::from("a"), &first));
        assert!(registry.register(NodeId::from("a"), &second));

        let found = registry.lookup("a").unwrap();
        assert!(Rc::ptr_eq(&found, &second));
    }

    #[test]
    fn dropped_handles_are_not_found_and_get_pruned() {
        let mut registry = NodeRegistry::default();
        let kept = handle("kept");
        registry.register(NodeId::from("kept"), &kept);
        {
            let gone = handle("gone");
            registry.register(NodeId::from("gone"), &gone);
        }

        assert!(registry.lookup("gone").is_none());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("kept"));
    }

    #[test]
    fn unregister_removes_entry() {
        let mut registry = NodeRegistry::default();
        let node = handle("a");
        registry.register(NodeId::from("a"), &node);

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(registry.lookup("a").is_none());
    }

    #[test]
    fn log_tracking_keeps_duplicates_in_order() {
        let mut registry = NodeRegistry::new(ExpandedTracking::Log);
        for id in ["root", "a", "a1", "a1"] {
            registry.record_expanded(&NodeId::from(id));
        }

        let ids: Vec<_> = registry
            .expanded_identifiers()
            .iter()
            .map(NodeId::as_str)
            .collect();
        assert_eq!(ids, vec!["root", "a", "a1", "a1"]);
    }

    #[test]
    fn set_tracking_ignores_duplicates() {
        let mut registry = NodeRegistry::new(ExpandedTracking::Set);
        for id in ["root", "a", "root"] {
            registry.record_expanded(&NodeId::from(id));
        }
        registry.forget_expanded("a");

        assert_eq!(registry.expanded_identifiers(), &[NodeId::root()]);
    }

    #[test]
    fn set_tracking_readds_forgotten_identifier_at_tail() {
        let mut registry = NodeRegistry::new(ExpandedTracking::Set);
        for id in ["root", "a", "b"] {
            registry.record_expanded(&NodeId::from(id));
        }
        registry.forget_expanded("a");
        registry.forget_expanded("missing");
        registry.record_expanded(&NodeId::from("a"));
        registry.record_expanded(&NodeId::from("b"));

        let ids: Vec<_> = registry
            .expanded_identifiers()
            .iter()
            .map(NodeId::as_str)
            .collect();
        assert_eq!(ids, vec!["root", "b", "a"]);

        registry.clear_expanded();
        registry.record_expanded(&NodeId::from("b"));
        assert_eq!(registry.expanded_identifiers(), &[NodeId::from("b")]);
    }
}
