use ratatui::widgets::TableState;
use smallvec::SmallVec;

use crate::action::{TreeAction, TreeEvent};
use crate::controller::{ControllerOutcome, TreeController};
use crate::model::NodeId;
use crate::style::TreeScrollPolicy;

#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

/// A visible row: a mounted node plus layout metadata.
#[derive(Clone, Debug)]
pub struct VisibleRow {
    pub(crate) id: NodeId,
    pub(crate) index: usize,
    pub(crate) level: u16,
    pub(crate) is_tail_stack: SmallVec<[bool; 8]>,
}

/// View state: selection, scroll offset, and the rows currently visible.
///
/// Open/closed state lives in the [`TreeController`]; rows are rebuilt from it
/// on every [`refresh`](Self::refresh).
pub struct TreeViewState {
    list_state: TableState,
    rows: Vec<VisibleRow>,
    draw_lines: bool,
    #[cfg(feature = "keymap")]
    keymap: TreeKeyBindings,
}

impl Default for TreeViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeViewState {
    pub fn new() -> Self {
        Self {
            list_state: TableState::default(),
            rows: Vec::new(),
            draw_lines: true,
            #[cfg(feature = "keymap")]
            keymap: TreeKeyBindings::new(),
        }
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut TreeKeyBindings {
        &mut self.keymap
    }

    pub(crate) const fn list_state(&self) -> &TableState {
        &self.list_state
    }

    pub(crate) const fn list_state_mut(&mut self) -> &mut TableState {
        &mut self.list_state
    }

    pub(crate) fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    #[inline]
    pub const fn draw_lines(&self) -> bool {
        self.draw_lines
    }

    pub const fn set_draw_lines(&mut self, draw: bool) {
        self.draw_lines = draw;
    }

    pub const fn visible_len(&self) -> usize {
        self.rows.len()
    }

    /// Identifiers of the visible rows, top to bottom.
    ///
    /// Rows whose node is no longer mounted are skipped until the next [`refresh`](Self::refresh).
    pub fn visible_ids<'a>(&'a self, controller: &TreeController) -> Vec<&'a NodeId> {
        self.rows
            .iter()
            .filter(|row| Self::resolve(controller, row).is_some())
            .map(|row| &row.id)
            .collect()
    }

    /// Rebuilds the visible rows from the controller's open/closed state.
    ///
    /// Selection follows the previously selected node, by identifier, when it is
    /// still visible. This holds across a reload of the controller's tree.
    pub fn refresh(&mut self, controller: &TreeController) {
        let selected = self
            .list_state
            .selected()
            .and_then(|row| self.rows.get(row))
            .map(|row| row.id.clone());
        self.rows.clear();
        let mounted = controller.mounted();
        if !mounted.is_empty() {
            let mut is_tail_stack: SmallVec<[bool; 8]> = SmallVec::new();
            self.build_rows(controller, 0, 0, &mut is_tail_stack);
        }
        if let Some(id) = selected
            && let Some(row) = self.rows.iter().position(|row| row.id == id)
        {
            self.list_state.select(Some(row));
        }
        self.clamp_selection();
    }

    fn build_rows(
        &mut self,
        controller: &TreeController,
        index: usize,
        level: u16,
        is_tail_stack: &mut SmallVec<[bool; 8]>,
    ) {
        let node = &controller.mounted()[index];
        self.rows.push(VisibleRow {
            id: node.id.clone(),
            index,
            level,
            is_tail_stack: is_tail_stack.clone(),
        });

        if !node.is_folder() || !node.is_open() {
            return;
        }
        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().copied().enumerate() {
            is_tail_stack.push(i == last);
            self.build_rows(controller, child, level + 1, is_tail_stack);
            is_tail_stack.pop();
        }
    }

    fn row_of(&self, index: usize) -> Option<usize> {
        self.rows.iter().position(|row| row.index == index)
    }

    // Mounted index of `row`, or None if its node is gone. Rows built before a
    // reload fall back to a lookup by identifier.
    fn resolve(controller: &TreeController, row: &VisibleRow) -> Option<usize> {
        match controller.mounted().get(row.index) {
            Some(node) if node.id == row.id => Some(row.index),
            _ => controller.mounted_index_of(row.id.as_str()),
        }
    }

    fn selected_index(&self, controller: &TreeController) -> Option<usize> {
        self.list_state
            .selected()
            .and_then(|row| self.rows.get(row))
            .and_then(|row| Self::resolve(controller, row))
    }

    /// Returns the identifier of the selected node, if it is still mounted.
    pub fn selected_id<'a>(&self, controller: &'a TreeController) -> Option<&'a NodeId> {
        self.selected_index(controller)
            .and_then(|index| controller.mounted().get(index))
            .map(|node| &node.id)
    }

    /// Expands the path to `id` and selects it. Returns `false` if `id` is unknown.
    pub fn select_by_id(&mut self, controller: &mut TreeController, id: &str) -> bool {
        if !controller.expand_to(id).is_applied() {
            return false;
        }
        self.refresh(controller);
        let Some(index) = controller.mounted_index_of(id) else {
            return false;
        };
        match self.row_of(index) {
            Some(row) => {
                self.list_state.select(Some(row));
                true
            }
            None => false,
        }
    }

    pub const fn select_first(&mut self) {
        self.list_state.select_first();
    }

    pub const fn select_last(&mut self) {
        self.list_state.select_last();
    }

    pub fn select_prev(&mut self) {
        if self.rows.is_empty() {
            self.list_state.select(None);
            return;
        }
        let selected = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(selected.saturating_sub(1)));
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            self.list_state.select(None);
            return;
        }
        let selected = self.list_state.selected().unwrap_or(0);
        let next = (selected + 1).min(self.rows.len().saturating_sub(1));
        self.list_state.select(Some(next));
    }

    fn select_parent(&mut self, controller: &TreeController) -> bool {
        let Some(parent) = self
            .selected_index(controller)
            .and_then(|index| controller.mounted().get(index))
            .and_then(|node| node.parent)
        else {
            return false;
        };
        match self.row_of(parent) {
            Some(row) => {
                self.list_state.select(Some(row));
                true
            }
            None => false,
        }
    }

    fn select_child(&mut self, controller: &mut TreeController) -> bool {
        let Some(node) = self
            .selected_index(controller)
            .and_then(|index| controller.mounted().get(index))
        else {
            return false;
        };
        if !node.is_folder() {
            return false;
        }
        if !node.is_open() {
            let id = node.id.clone();
            controller.expand_node(id.as_str());
            self.refresh(controller);
            return true;
        }
        let Some(&first_child) = node.children.first() else {
            return false;
        };
        match self.row_of(first_child) {
            Some(row) => {
                self.list_state.select(Some(row));
                true
            }
            None => false,
        }
    }

    /// Adjusts the scroll offset so the selection is inside the viewport.
    pub fn ensure_selection_visible(&mut self, viewport_height: usize) {
        self.clamp_selection();
        let Some(selected) = self.list_state.selected() else {
            return;
        };
        let viewport_height = viewport_height.max(1);
        let offset = self.list_state.offset();
        if selected < offset {
            *self.list_state.offset_mut() = selected;
        } else if selected >= offset + viewport_height {
            *self.list_state.offset_mut() = selected + 1 - viewport_height;
        }
    }

    pub fn ensure_selection_visible_with_policy(
        &mut self,
        viewport_height: usize,
        policy: TreeScrollPolicy,
    ) {
        match policy {
            TreeScrollPolicy::KeepInView => self.ensure_selection_visible(viewport_height),
            TreeScrollPolicy::CenterOnSelect => self.center_selection(viewport_height),
        }
    }

    fn center_selection(&mut self, viewport_height: usize) {
        self.clamp_selection();
        let Some(selected) = self.list_state.selected() else {
            return;
        };
        let viewport_height = viewport_height.max(1);
        let max_offset = self.rows.len().saturating_sub(viewport_height);
        let offset = selected.saturating_sub(viewport_height / 2).min(max_offset);
        *self.list_state.offset_mut() = offset;
    }

    const fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.list_state.select(None);
            return;
        }
        if let Some(selected) = self.list_state.selected()
            && selected >= self.rows.len()
        {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    /// Handles a tree action against `controller` and returns the resulting event.
    pub fn handle_action<C>(
        &mut self,
        controller: &mut TreeController,
        action: TreeAction<C>,
    ) -> TreeEvent<C> {
        self.refresh(controller);
        if matches!(&action, TreeAction::Custom(_)) {
            return TreeEvent::Action(action);
        }
        if self.rows.is_empty() {
            return TreeEvent::Unhandled;
        }

        let handled = match action {
            TreeAction::SelectPrev => {
                self.select_prev();
                true
            }
            TreeAction::SelectNext => {
                self.select_next();
                true
            }
            TreeAction::SelectFirst => {
                self.select_first();
                true
            }
            TreeAction::SelectLast => {
                self.select_last();
                true
            }
            TreeAction::SelectParent => self.select_parent(controller),
            TreeAction::SelectChild => self.select_child(controller),
            TreeAction::ToggleNode => {
                let Some(id) = self.selected_id(controller).cloned() else {
                    return TreeEvent::Unhandled;
                };
                let is_folder = controller
                    .lookup(id.as_str())
                    .is_some_and(|handle| handle.borrow().is_folder());
                is_folder && controller.expand_node(id.as_str()) == ControllerOutcome::Applied
            }
            TreeAction::CollapseAll => {
                controller.collapse_all();
                true
            }
            TreeAction::ToggleGuides => {
                self.draw_lines = !self.draw_lines;
                true
            }
            TreeAction::OpenLink | TreeAction::Custom(_) => return TreeEvent::Action(action),
        };

        if handled {
            self.refresh(controller);
            TreeEvent::Handled
        } else {
            TreeEvent::Unhandled
        }
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event into an action and handles it.
    pub fn handle_key(&mut self, controller: &mut TreeController, key: KeyEvent) -> TreeEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(controller, action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event with a custom mapping and handles it.
    pub fn handle_key_with<C, F>(
        &mut self,
        controller: &mut TreeController,
        key: KeyEvent,
        custom: F,
    ) -> TreeEvent<C>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(controller, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, TreePayload};

    fn controller() -> TreeController {
        let mut controller = TreeController::default();
        controller.load(TreePayload::new(Node::new(NodeId::root()).with_children(vec![
            Node::new("A").with_children(vec![Node::new("A1"), Node::new("A2")]),
            Node::new("B").with_href("/b"),
        ])));
        controller
    }

    fn ids(state: &TreeViewState, controller: &TreeController) -> Vec<String> {
        state
            .visible_ids(controller)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn closed_tree_shows_only_root() {
        let controller = controller();
        let mut state = TreeViewState::new();

        state.refresh(&controller);

        assert_eq!(ids(&state, &controller), vec!["root"]);
    }

    #[test]
    fn rows_follow_open_nodes() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        controller.expand_to("A1");

        state.refresh(&controller);

        assert_eq!(ids(&state, &controller), vec!["root", "A", "A1", "A2", "B"]);
        let levels: Vec<_> = state.rows().iter().map(|row| row.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 2, 1]);
        assert_eq!(state.rows()[4].is_tail_stack.as_slice(), &[true]);
    }

    #[test]
    fn toggle_action_opens_selected_folder() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        state.refresh(&controller);
        state.select_first();

        let event = state.handle_action::<()>(&mut controller, TreeAction::ToggleNode);

        assert_eq!(event, TreeEvent::Handled);
        assert_eq!(controller.is_open("root"), Some(true));
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn toggle_action_on_leaf_is_unhandled() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        assert!(state.select_by_id(&mut controller, "B"));
        let before = controller.is_open("B");

        let event = state.handle_action::<()>(&mut controller, TreeAction::ToggleNode);

        assert_eq!(event, TreeEvent::Unhandled);
        assert_eq!(controller.is_open("B"), before);
    }

    #[test]
    fn select_by_id_reveals_and_selects() {
        let mut controller = controller();
        let mut state = TreeViewState::new();

        assert!(state.select_by_id(&mut controller, "A2"));

        assert_eq!(
            state.selected_id(&controller).map(NodeId::as_str),
            Some("A2")
        );
        assert!(!state.select_by_id(&mut controller, "missing"));
    }

    #[test]
    fn collapse_all_action_keeps_selection_in_range() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        state.select_by_id(&mut controller, "A2");

        state.handle_action::<()>(&mut controller, TreeAction::CollapseAll);

        assert_eq!(state.visible_len(), 1);
        assert_eq!(state.list_state().selected(), Some(0));
    }

    #[test]
    fn parent_and_child_navigation() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        state.select_by_id(&mut controller, "A");
        controller.collapse_node("A");
        state.refresh(&controller);

        state.handle_action::<()>(&mut controller, TreeAction::SelectChild);
        assert_eq!(controller.is_open("A"), Some(true));
        state.handle_action::<()>(&mut controller, TreeAction::SelectChild);
        assert_eq!(state.selected_id(&controller).map(NodeId::as_str), Some("A1"));

        state.handle_action::<()>(&mut controller, TreeAction::SelectParent);
        assert_eq!(state.selected_id(&controller).map(NodeId::as_str), Some("A"));
    }

    #[test]
    fn open_link_is_forwarded() {
        let mut controller = controller();
        let mut state = TreeViewState::new();
        state.refresh(&controller);
        state.select_first();

        let event = state.handle_action::<()>(&mut controller, TreeAction::OpenLink);

        assert_eq!(event, TreeEvent::Action(TreeAction::OpenLink));
    }

    fn flat_tree(children: &[&str]) -> TreePayload {
        let nodes = children.iter().map(|id| Node::new(*id)).collect();
        TreePayload::new(Node::new(NodeId::root()).with_children(nodes))
    }

    #[test]
    fn reload_with_smaller_tree_drops_stale_selection() {
        let mut controller = TreeController::default();
        controller.load(flat_tree(&["A", "B", "C"]));
        let mut state = TreeViewState::new();
        assert!(state.select_by_id(&mut controller, "C"));

        controller.load(flat_tree(&[]));

        assert_eq!(state.selected_id(&controller), None);
        assert_eq!(ids(&state, &controller), vec!["root"]);

        state.refresh(&controller);
        assert_eq!(state.visible_len(), 1);
        assert_eq!(
            state.selected_id(&controller).map(NodeId::as_str),
            Some("root")
        );
    }

    #[test]
    fn reload_keeps_selection_on_same_identifier() {
        let mut controller = TreeController::default();
        controller.load(flat_tree(&["A", "B"]));
        let mut state = TreeViewState::new();
        assert!(state.select_by_id(&mut controller, "B"));

        controller.load(flat_tree(&["X", "Y", "B"]));
        assert_eq!(state.selected_id(&controller).map(NodeId::as_str), Some("B"));

        controller.expand_node("root");
        state.refresh(&controller);

        assert_eq!(ids(&state, &controller), vec!["root", "X", "Y", "B"]);
        assert_eq!(state.selected_id(&controller).map(NodeId::as_str), Some("B"));
        assert_eq!(state.list_state().selected(), Some(3));
    }

    #[test]
    fn select_prev_clears_selection_when_empty() {
        let mut state = TreeViewState::new();
        state.list_state.select(Some(0));

        state.select_prev();

        assert_eq!(state.list_state.selected(), None);
    }
}
