use ratatui::layout::{Constraint, Rect};
use ratatui::prelude::Buffer;
use ratatui::widgets::{
    Block, Borders, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Table,
};

use crate::context::TreeRowContext;
use crate::controller::TreeController;
use crate::glyphs::{IdLabels, TreeGlyphs, TreeLabelProvider, tree_name_cell};
use crate::state::{TreeViewState, VisibleRow};
use crate::style::TreeViewStyle;

/// Stateful widget rendering a [`TreeController`]'s mounted tree.
pub struct CommodityTreeView<'a, L = IdLabels>
where
    L: TreeLabelProvider,
{
    controller: &'a TreeController,
    labels: &'a L,
    style: TreeViewStyle<'a>,
    glyphs: TreeGlyphs<'a>,
}

impl<'a> CommodityTreeView<'a, IdLabels> {
    /// Creates a view labelling nodes by their identifiers.
    pub fn new(controller: &'a TreeController, style: TreeViewStyle<'a>) -> Self {
        Self::with_labels(controller, &IdLabels, style)
    }
}

impl<'a, L: TreeLabelProvider> CommodityTreeView<'a, L> {
    pub const fn with_labels(
        controller: &'a TreeController,
        labels: &'a L,
        style: TreeViewStyle<'a>,
    ) -> Self {
        Self {
            controller,
            labels,
            style,
            glyphs: TreeGlyphs::unicode(),
        }
    }

    #[must_use]
    pub const fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    fn build_rows(&self, rows: &[VisibleRow], draw_lines: bool) -> Vec<Row<'a>> {
        let controller: &'a TreeController = self.controller;
        let labels: &'a L = self.labels;
        let mounted = controller.mounted();
        rows.iter()
            .filter_map(|row| mounted.get(row.index).map(|node| (row, node)))
            .map(|(row, node)| {
                let ctx = TreeRowContext {
                    level: row.level,
                    is_tail_stack: row.is_tail_stack.as_slice(),
                    is_open: node.is_open(),
                    is_folder: node.is_folder(),
                    has_link: node.href().is_some(),
                    draw_lines,
                    line_style: self.style.line_style,
                    link_style: self.style.link_style,
                };
                let label = labels.label(node);
                Row::new([tree_name_cell(&ctx, label, &self.glyphs)])
            })
            .collect()
    }
}

impl<L: TreeLabelProvider> StatefulWidget for CommodityTreeView<'_, L> {
    type State = TreeViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.refresh(self.controller);

        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);

        let inner_height = block.inner(area).height as usize;
        state.ensure_selection_visible_with_policy(inner_height, self.style.scroll_policy);

        let total_rows = state.visible_len();
        let scroll_rows = total_rows.saturating_sub(inner_height);
        let rows = self.build_rows(state.rows(), state.draw_lines());

        let (table_area, scrollbar_area) = if scroll_rows > 0 && area.width > 1 {
            let table_area = Rect {
                width: area.width - 1,
                ..area
            };
            let scrollbar_area = Rect {
                x: area.x + area.width - 1,
                width: 1,
                ..area
            };
            let mut borders = self.style.borders;
            borders.remove(Borders::RIGHT);
            block = block.borders(borders);
            (table_area, Some(scrollbar_area))
        } else {
            (area, None)
        };

        let table = Table::new(rows, [Constraint::Percentage(100)])
            .style(self.style.block_style)
            .block(block)
            .row_highlight_style(self.style.highlight_style)
            .highlight_symbol(self.style.highlight_symbol);
        table.render(table_area, buf, state.list_state_mut());

        if let Some(scrollbar_area) = scrollbar_area {
            let scroll_len = scroll_rows + 1;
            let position = state.list_state().offset().min(scroll_rows);
            let mut scrollbar_state = ScrollbarState::new(scroll_len)
                .position(position)
                .viewport_content_length(inner_height);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .render(scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::model::{Node, NodeId, TreePayload};

    fn wide_controller(children: usize) -> TreeController {
        let nodes = (0..children)
            .map(|idx| Node::new(NodeId::commodity(&format!("0101.{idx:02}"))))
            .collect();
        let mut controller = TreeController::new(TreeConfig::heading());
        controller.load(TreePayload::new(Node::new(NodeId::root()).with_children(nodes)));
        controller
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn render_smoke_with_scrollbar() {
        let controller = wide_controller(12);
        let widget = CommodityTreeView::new(&controller, TreeViewStyle::default());
        let mut state = TreeViewState::new();

        let area = Rect::new(0, 0, 24, 6);
        let mut buffer = Buffer::empty(area);
        widget.render(area, &mut buffer, &mut state);

        assert_eq!(state.visible_len(), 13);
        assert!(buffer_text(&buffer).contains("0101.00"));
    }

    #[test]
    fn closed_root_renders_single_row() {
        let controller = TreeController::default();
        let widget = CommodityTreeView::new(&controller, TreeViewStyle::default())
            .glyphs(TreeGlyphs::ascii());
        let mut state = TreeViewState::new();

        let area = Rect::new(0, 0, 20, 4);
        let mut buffer = Buffer::empty(area);
        widget.render(area, &mut buffer, &mut state);

        assert_eq!(state.visible_len(), 1);
        assert!(buffer_text(&buffer).contains("root"));
    }
}
