use ratatui::style::Style;

/// Per-row facts handed to label renderers.
#[derive(Clone, Copy)]
pub struct TreeRowContext<'a> {
    pub level: u16,
    pub is_tail_stack: &'a [bool],
    pub is_open: bool,
    pub is_folder: bool,
    pub has_link: bool,
    pub draw_lines: bool,
    pub line_style: Style,
    pub link_style: Style,
}
