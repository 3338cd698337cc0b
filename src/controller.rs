use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{InitialOpen, TreeConfig};
use crate::error::LoadError;
use crate::model::{Node, NodeId, RejectedNode, TreePayload};
use crate::node::TreeNodeState;
use crate::registry::{NodeHandle, NodeRegistry};
use crate::source::{TreeRequest, TreeSource};

/// Result of an operation addressed to a node by identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerOutcome {
    /// The node was found and the operation ran.
    Applied,
    /// No live node is registered under the identifier; nothing changed.
    NotFound,
}

impl ControllerOutcome {
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Where the controller is in its load cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No payload yet; only the placeholder root is mounted.
    Pending,
    Loaded,
    /// The last fetch failed; whatever was mounted before is still shown.
    Failed,
}

/// A node as mounted for rendering: its state handle plus tree links by index.
#[derive(Debug)]
pub struct MountedNode {
    pub(crate) id: NodeId,
    pub(crate) href: Option<String>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) state: NodeHandle,
}

impl MountedNode {
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub const fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Owns the registry and the mounted tree, and exposes the page-level operations.
#[derive(Debug)]
pub struct TreeController {
    config: TreeConfig,
    registry: NodeRegistry,
    root: Node,
    // Preorder; index 0 is the root. Holds the only strong references to node state.
    mounted: Vec<MountedNode>,
    rejected: Vec<RejectedNode>,
    status: LoadStatus,
    last_error: Option<LoadError>,
}

impl Default for TreeController {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeController {
    /// Creates a controller showing only the placeholder root.
    pub fn new(config: TreeConfig) -> Self {
        let mut controller = Self {
            config,
            registry: NodeRegistry::new(config.tracking),
            root: Node::new(NodeId::root()),
            mounted: Vec::new(),
            rejected: Vec::new(),
            status: LoadStatus::Pending,
            last_error: None,
        };
        controller.mount();
        controller
    }

    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub const fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub const fn root(&self) -> &Node {
        &self.root
    }

    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    /// Returns `true` if the last fetch failed.
    pub const fn errored(&self) -> bool {
        matches!(self.status, LoadStatus::Failed)
    }

    pub const fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Payload nodes dropped for lacking an identifier.
    pub fn rejected(&self) -> &[RejectedNode] {
        &self.rejected
    }

    pub(crate) fn mounted(&self) -> &[MountedNode] {
        &self.mounted
    }

    pub(crate) fn mounted_index_of(&self, id: &str) -> Option<usize> {
        self.mounted.iter().position(|node| node.id.as_str() == id)
    }

    /// Replaces the tree with `payload` and remounts it.
    pub fn load(&mut self, payload: TreePayload) {
        self.root = payload.root;
        self.rejected = payload.rejected;
        self.status = LoadStatus::Loaded;
        self.last_error = None;
        self.mount();
        tracing::debug!(
            nodes = self.mounted.len(),
            rejected = self.rejected.len(),
            "tree loaded"
        );
    }

    /// Fetches a payload from `source` and loads it.
    ///
    /// On failure the error is logged and kept, and the mounted tree is left as it was.
    pub fn load_from<S: TreeSource + ?Sized>(
        &mut self,
        source: &S,
        request: &TreeRequest,
    ) -> LoadStatus {
        match source.fetch(request) {
            Ok(payload) => self.load(payload),
            Err(error) => {
                tracing::error!(request = %request, error = %error, "failed to load tree data");
                self.status = LoadStatus::Failed;
                self.last_error = Some(error);
            }
        }
        self.status
    }

    /// Returns the live state handle for `id`.
    pub fn lookup(&self, id: &str) -> Option<NodeHandle> {
        self.registry.lookup(id)
    }

    /// Returns whether `id` is open, or `None` if it is not registered.
    pub fn is_open(&self, id: &str) -> Option<bool> {
        self.lookup(id).map(|handle| handle.borrow().is_open())
    }

    /// Opens the commodity node for `code` and every node above it.
    pub fn expand_commodity(&mut self, code: &str) -> ControllerOutcome {
        self.expand_to(NodeId::commodity(code).as_str())
    }

    /// Opens `id` and every node above it.
    pub fn expand_to(&mut self, id: &str) -> ControllerOutcome {
        let Some(handle) = self.registry.lookup(id) else {
            tracing::debug!(node_id = id, "expand target not registered");
            return ControllerOutcome::NotFound;
        };
        let opened = handle.borrow_mut().expand_ancestors(&mut self.registry);
        tracing::debug!(node_id = id, opened, "expanded ancestor chain");
        ControllerOutcome::Applied
    }

    /// Toggles `id`. Leaves are found but not changed.
    pub fn expand_node(&mut self, id: &str) -> ControllerOutcome {
        let Some(handle) = self.registry.lookup(id) else {
            return ControllerOutcome::NotFound;
        };
        handle.borrow_mut().toggle(&mut self.registry);
        ControllerOutcome::Applied
    }

    /// Closes `id` without touching its ancestors or descendants.
    pub fn collapse_node(&mut self, id: &str) -> ControllerOutcome {
        let Some(handle) = self.registry.lookup(id) else {
            return ControllerOutcome::NotFound;
        };
        handle.borrow_mut().collapse(&mut self.registry);
        ControllerOutcome::Applied
    }

    /// Closes every node in the expanded list, walking it from the most recent entry.
    ///
    /// Entries that are no longer registered are skipped. Returns the number of nodes
    /// that were open and got closed.
    pub fn collapse_all(&mut self) -> usize {
        let expanded = self.registry.expanded_identifiers().to_vec();
        let mut closed = 0;
        for id in expanded.iter().rev() {
            let Some(handle) = self.registry.lookup(id.as_str()) else {
                continue;
            };
            let mut state = handle.borrow_mut();
            if state.is_open() {
                closed += 1;
            }
            state.collapse(&mut self.registry);
        }
        tracing::debug!(closed, "collapsed all expanded nodes");
        closed
    }

    fn mount(&mut self) {
        for node in self.mounted.drain(..) {
            self.registry.unregister(node.id.as_str());
        }
        self.registry.clear_expanded();

        let capacity = self.root.subtree_len();
        self.mounted.reserve(capacity);
        mount_node(&mut self.mounted, &mut self.registry, &self.root, None);

        let initial_open = self.config.initial_open;
        for (idx, node) in self.mounted.iter().enumerate() {
            let open = match initial_open {
                InitialOpen::Collapsed => false,
                InitialOpen::Root => idx == 0,
                InitialOpen::All => true,
            };
            if open && node.is_folder() {
                node.state.borrow_mut().expand(&mut self.registry);
            }
        }
    }
}

fn mount_node(
    mounted: &mut Vec<MountedNode>,
    registry: &mut NodeRegistry,
    node: &Node,
    parent: Option<usize>,
) -> usize {
    let parent_id = parent.map(|idx| mounted[idx].id.clone());
    let state = TreeNodeState::new(node.id().clone(), parent_id, node.children().len());
    let handle = Rc::new(RefCell::new(state));
    registry.register(node.id().clone(), &handle);

    let idx = mounted.len();
    mounted.push(MountedNode {
        id: node.id().clone(),
        href: node.href().map(str::to_owned),
        parent,
        children: Vec::with_capacity(node.children().len()),
        state: handle,
    });

    for child in node.children() {
        let child_idx = mount_node(mounted, registry, child, Some(idx));
        mounted[idx].children.push(child_idx);
    }
    idx
}
