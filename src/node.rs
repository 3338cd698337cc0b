use crate::config::ExpandedTracking;
use crate::model::NodeId;
use crate::registry::NodeRegistry;

/// Open/closed state of one mounted node.
///
/// Every mutation goes through the shared [`NodeRegistry`] so that opening a node
/// is recorded for bulk collapse, and so ancestor expansion can reach nodes this
/// one does not own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNodeState {
    id: NodeId,
    parent: Option<NodeId>,
    child_count: usize,
    open: bool,
}

impl TreeNodeState {
    /// Creates a closed node state.
    pub const fn new(id: NodeId, parent: Option<NodeId>, child_count: usize) -> Self {
        Self {
            id,
            parent,
            child_count,
            open: false,
        }
    }

    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Parent identifier; `None` only for the root.
    pub const fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub const fn child_count(&self) -> usize {
        self.child_count
    }

    #[inline]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Folder nodes have children and can be toggled.
    #[inline]
    pub const fn is_folder(&self) -> bool {
        self.child_count > 0
    }

    /// Flips the open flag of a folder node. Leaves are left untouched.
    ///
    /// Returns `true` if the state changed.
    pub fn toggle(&mut self, registry: &mut NodeRegistry) -> bool {
        if !self.is_folder() {
            return false;
        }
        if self.open {
            self.collapse(registry);
        } else {
            self.expand(registry);
        }
        true
    }

    /// Closes the node.
    ///
    /// With [`ExpandedTracking::Log`] the identifier stays in the expanded list.
    pub fn collapse(&mut self, registry: &mut NodeRegistry) {
        self.open = false;
        if registry.tracking() == ExpandedTracking::Set {
            registry.forget_expanded(self.id.as_str());
        }
        tracing::trace!(node_id = %self.id, "node collapsed");
    }

    /// Opens the node and records it as expanded.
    pub fn expand(&mut self, registry: &mut NodeRegistry) {
        self.open = true;
        registry.record_expanded(&self.id);
        tracing::trace!(node_id = %self.id, "node expanded");
    }

    /// Opens this node and every registered ancestor up to the root.
    ///
    /// The walk stops silently at the first ancestor that is not registered, and
    /// also when the parent chain loops back on itself. Returns the number of
    /// nodes opened.
    pub fn expand_ancestors(&mut self, registry: &mut NodeRegistry) -> usize {
        self.expand(registry);
        let mut opened = 1;
        let mut next = self.next_ancestor().cloned();
        let limit = registry.len();

        while let Some(parent_id) = next {
            if opened > limit {
                tracing::warn!(node_id = %self.id, "ancestor chain does not reach the root");
                break;
            }
            let Some(handle) = registry.lookup(parent_id.as_str()) else {
                tracing::debug!(
                    node_id = %self.id,
                    ancestor = %parent_id,
                    "ancestor not registered; expansion stopped"
                );
                break;
            };
            let Ok(mut ancestor) = handle.try_borrow_mut() else {
                tracing::warn!(ancestor = %parent_id, "ancestor chain loops back to its start");
                break;
            };
            ancestor.expand(registry);
            opened += 1;
            next = ancestor.next_ancestor().cloned();
        }

        opened
    }

    fn next_ancestor(&self) -> Option<&NodeId> {
        if self.id.is_root() {
            None
        } else {
            self.parent.as_ref()
        }
    }
}
