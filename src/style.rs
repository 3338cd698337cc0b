use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Borders;

/// Scroll behavior when the selected row changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeScrollPolicy {
    KeepInView,
    CenterOnSelect,
}

/// Visual settings of the tree view.
#[derive(Clone)]
pub struct TreeViewStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    pub highlight_style: Style,
    pub line_style: Style,
    /// Style of nodes that carry a link.
    pub link_style: Style,
    pub highlight_symbol: &'a str,
    pub borders: Borders,
    pub scroll_policy: TreeScrollPolicy,
}

impl Default for TreeViewStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            highlight_style: Style::default(),
            line_style: Style::default(),
            link_style: Style::default(),
            highlight_symbol: ">> ",
            borders: Borders::ALL,
            scroll_policy: TreeScrollPolicy::KeepInView,
        }
    }
}

/// Visual settings of the data grid.
#[derive(Clone)]
pub struct GridStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    pub header_style: Style,
    /// Header style of the column currently sorted on.
    pub active_header_style: Style,
    pub highlight_style: Style,
    pub borders: Borders,
}

impl Default for GridStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            header_style: Style::default(),
            active_header_style: Style::default(),
            highlight_style: Style::default(),
            borders: Borders::ALL,
        }
    }
}
