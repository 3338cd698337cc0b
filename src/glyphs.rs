use std::borrow::Cow;

use ratatui::text::{Line, Span};
use ratatui::widgets::Cell;
use rustc_hash::FxHashMap;

use crate::context::TreeRowContext;
use crate::controller::MountedNode;
use crate::model::NodeId;

#[derive(Clone, Copy)]
pub struct TreeGlyphs<'a> {
    pub indent: &'a str,
    pub branch_last: &'a str,
    pub branch: &'a str,
    pub vert: &'a str,
    pub empty: &'a str,
    pub leaf: &'a str,
    pub open: &'a str,
    pub closed: &'a str,
    pub link: &'a str,
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "   ",
            branch_last: "└──",
            branch: "├──",
            vert: "│  ",
            empty: "   ",
            leaf: "•",
            open: "▼",
            closed: "▶",
            link: "↗",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "   ",
            branch_last: "`--",
            branch: "|--",
            vert: "|  ",
            empty: "   ",
            leaf: "*",
            open: "v",
            closed: ">",
            link: "->",
        }
    }
}

/// Text shown for one node: an optional code column and the name.
#[derive(Clone)]
pub struct TreeLabel<'a> {
    pub code: Option<Cow<'a, str>>,
    pub name: Cow<'a, str>,
}

/// Maps mounted nodes to the text shown in their row.
pub trait TreeLabelProvider {
    fn label<'a>(&'a self, node: &'a MountedNode) -> TreeLabel<'a>;
}

/// Shows the commodity code for commodity nodes and the raw identifier otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdLabels;

impl TreeLabelProvider for IdLabels {
    fn label<'a>(&'a self, node: &'a MountedNode) -> TreeLabel<'a> {
        let id = node.id();
        TreeLabel {
            code: None,
            name: Cow::Borrowed(id.commodity_code().unwrap_or_else(|| id.as_str())),
        }
    }
}

/// Looks node descriptions up by identifier, falling back to [`IdLabels`].
#[derive(Clone, Debug, Default)]
pub struct DescriptionLabels {
    descriptions: FxHashMap<NodeId, String>,
}

impl DescriptionLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<NodeId>, description: impl Into<String>) {
        self.descriptions.insert(id.into(), description.into());
    }
}

impl FromIterator<(NodeId, String)> for DescriptionLabels {
    fn from_iter<I: IntoIterator<Item = (NodeId, String)>>(iter: I) -> Self {
        Self {
            descriptions: iter.into_iter().collect(),
        }
    }
}

impl TreeLabelProvider for DescriptionLabels {
    fn label<'a>(&'a self, node: &'a MountedNode) -> TreeLabel<'a> {
        let Some(description) = self.descriptions.get(node.id()) else {
            return IdLabels.label(node);
        };
        TreeLabel {
            code: node.id().commodity_code().map(Cow::Borrowed),
            name: Cow::Borrowed(description.as_str()),
        }
    }
}

fn expander<'a>(ctx: &TreeRowContext<'_>, glyphs: &TreeGlyphs<'a>) -> &'a str {
    if ctx.is_folder {
        if ctx.is_open { glyphs.open } else { glyphs.closed }
    } else if ctx.level == 0 {
        ""
    } else {
        glyphs.leaf
    }
}

pub fn tree_label_line<'a>(
    ctx: &TreeRowContext<'_>,
    label: TreeLabel<'a>,
    glyphs: &TreeGlyphs<'a>,
) -> Line<'a> {
    let TreeLabel { code, name } = label;
    let code = code.filter(|value| !value.is_empty());
    let mut spans = Vec::with_capacity(ctx.level as usize + 7);

    if ctx.level > 0 && ctx.draw_lines {
        let last_level = ctx.level as usize - 1;
        for (l, is_last) in ctx.is_tail_stack.iter().copied().enumerate() {
            let part = match (l == last_level, is_last) {
                (true, true) => glyphs.branch_last,
                (true, false) => glyphs.branch,
                (false, true) => glyphs.indent,
                (false, false) => glyphs.vert,
            };
            spans.push(Span::styled(part, ctx.line_style));
        }
    } else {
        for _ in 0..ctx.level {
            spans.push(Span::raw(glyphs.empty));
        }
    }

    let expander = expander(ctx, glyphs);
    if !expander.is_empty() {
        spans.push(Span::raw(expander));
        spans.push(Span::raw(" "));
    }
    if let Some(code) = code {
        spans.push(Span::raw(code));
        spans.push(Span::raw(" "));
    }
    if ctx.has_link {
        spans.push(Span::styled(name, ctx.link_style));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(glyphs.link, ctx.link_style));
    } else {
        spans.push(Span::raw(name));
    }
    Line::from(spans)
}

pub fn tree_name_cell<'a>(
    ctx: &TreeRowContext<'_>,
    label: TreeLabel<'a>,
    glyphs: &TreeGlyphs<'a>,
) -> Cell<'a> {
    Cell::from(tree_label_line(ctx, label, glyphs))
}

#[cfg(test)]
mod tests {
    use ratatui::style::Style;

    use super::*;

    fn ctx(level: u16, tails: &[bool], is_folder: bool, is_open: bool) -> TreeRowContext<'_> {
        TreeRowContext {
            level,
            is_tail_stack: tails,
            is_open,
            is_folder,
            has_link: false,
            draw_lines: true,
            line_style: Style::default(),
            link_style: Style::default(),
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn root_row_shows_only_expander() {
        let label = TreeLabel {
            code: None,
            name: Cow::Borrowed("root"),
        };
        let line = tree_label_line(&ctx(0, &[], true, true), label, &TreeGlyphs::ascii());

        assert_eq!(text(&line), "v root");
    }

    #[test]
    fn nested_rows_draw_guides() {
        let label = TreeLabel {
            code: Some(Cow::Borrowed("8471.30")),
            name: Cow::Borrowed("Portable machines"),
        };
        let line = tree_label_line(
            &ctx(2, &[false, true], false, false),
            label,
            &TreeGlyphs::ascii(),
        );

        assert_eq!(text(&line), "|  `--* 8471.30 Portable machines");
    }
}
