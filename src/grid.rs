use std::borrow::Cow;
use std::cmp::Ordering;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Row, StatefulWidget, Table, TableState};
use serde_json::{Map, Value};

use crate::columns::{GridColumns, UniformColumns};
use crate::error::LoadError;
use crate::style::GridStyle;

/// One grid row: column name to cell value.
pub type GridRow = Map<String, Value>;

/// Direction of the active sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Sortable, searchable table data.
///
/// Each column remembers its own sort order. Sorting on a column flips that
/// column's order first, so the first sort on a fresh column is descending.
#[derive(Clone, Debug, Default)]
pub struct DataGrid {
    columns: Vec<String>,
    rows: Vec<GridRow>,
    // Lowercased.
    filter_key: String,
    sort_key: Option<usize>,
    sort_orders: Vec<SortOrder>,
}

impl DataGrid {
    pub fn new(columns: Vec<String>, rows: Vec<GridRow>) -> Self {
        let sort_orders = vec![SortOrder::Ascending; columns.len()];
        Self {
            columns,
            rows,
            filter_key: String::new(),
            sort_key: None,
            sort_orders,
        }
    }

    /// Builds a grid from a JSON array of row objects.
    pub fn from_json(columns: Vec<String>, body: &str) -> Result<Self, LoadError> {
        let rows: Vec<GridRow> = serde_json::from_str(body)?;
        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sets the search text. Matching is a case-insensitive substring test on the
    /// display text of every cell, so a null cell never matches a non-empty filter.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter_key = filter.to_lowercase();
    }

    pub fn filter_key(&self) -> &str {
        &self.filter_key
    }

    /// Sorts on `column`, flipping its order. Returns `false` for unknown columns.
    pub fn sort_by(&mut self, column: &str) -> bool {
        let Some(idx) = self.columns.iter().position(|name| name == column) else {
            return false;
        };
        self.sort_key = Some(idx);
        self.sort_orders[idx] = self.sort_orders[idx].reversed();
        true
    }

    /// The column currently sorted on.
    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.map(|idx| self.columns[idx].as_str())
    }

    pub fn sort_order(&self, column: &str) -> Option<SortOrder> {
        let idx = self.columns.iter().position(|name| name == column)?;
        Some(self.sort_orders[idx])
    }

    /// Rows passing the filter, in sort order.
    pub fn visible_rows(&self) -> Vec<&GridRow> {
        let mut rows: Vec<&GridRow> = if self.filter_key.is_empty() {
            self.rows.iter().collect()
        } else {
            self.rows
                .iter()
                .filter(|row| {
                    row.values()
                        .any(|value| cell_text(value).to_lowercase().contains(&self.filter_key))
                })
                .collect()
        };

        if let Some(idx) = self.sort_key {
            let key = self.columns[idx].as_str();
            let order = self.sort_orders[idx];
            rows.sort_by(|a, b| {
                order.apply(compare_values(
                    a.get(key).unwrap_or(&Value::Null),
                    b.get(key).unwrap_or(&Value::Null),
                ))
            });
        }
        rows
    }
}

/// Display text of a cell: strings without quotes, everything else as JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (a, b) => cell_text(a).cmp(&cell_text(b)),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Stateful widget rendering a [`DataGrid`] as a table with a sortable header.
pub struct DataGridView<'a, C = UniformColumns>
where
    C: GridColumns,
{
    grid: &'a DataGrid,
    columns: &'a C,
    style: GridStyle<'a>,
}

impl<'a> DataGridView<'a, UniformColumns> {
    pub fn new(grid: &'a DataGrid, style: GridStyle<'a>) -> Self {
        Self::with_columns(grid, &UniformColumns, style)
    }
}

impl<'a, C: GridColumns> DataGridView<'a, C> {
    pub const fn with_columns(grid: &'a DataGrid, columns: &'a C, style: GridStyle<'a>) -> Self {
        Self {
            grid,
            columns,
            style,
        }
    }

    fn header(&self) -> Row<'a> {
        let grid = self.grid;
        let cells = grid.columns().iter().map(|name| {
            let title = capitalize(name);
            if grid.sort_key() == Some(name.as_str()) {
                let arrow = match grid.sort_order(name) {
                    Some(SortOrder::Descending) => " ▼",
                    _ => " ▲",
                };
                Cell::from(Line::from(vec![Span::raw(title), Span::raw(arrow)]))
                    .style(self.style.active_header_style)
            } else {
                Cell::from(title)
            }
        });
        Row::new(cells).style(self.style.header_style)
    }
}

impl<C: GridColumns> StatefulWidget for DataGridView<'_, C> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let mut block = Block::default()
            .borders(self.style.borders)
            .style(self.style.block_style)
            .border_style(self.style.border_style);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }

        let grid = self.grid;
        let visible = grid.visible_rows();
        if let Some(selected) = state.selected()
            && selected >= visible.len()
        {
            state.select(visible.len().checked_sub(1));
        }

        let rows = visible.into_iter().map(|row| {
            Row::new(grid.columns().iter().map(|name| {
                let text = row.get(name).map_or(Cow::Borrowed(""), cell_text);
                Cell::from(text.into_owned())
            }))
        });
        let constraints = self
            .columns
            .constraints_for_area(block.inner(area), grid.columns().len());

        let table = Table::new(rows, constraints)
            .header(self.header())
            .block(block)
            .row_highlight_style(self.style.highlight_style);
        table.render(area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: &str = r#"[
        { "code": "8471300000", "description": "Portable machines", "duty": 0 },
        { "code": "0101210000", "description": "Pure-bred horses", "duty": 11.5 },
        { "code": "8471410000", "description": "Other MACHINES", "duty": 2 }
    ]"#;

    fn grid() -> DataGrid {
        let columns = vec!["code".into(), "description".into(), "duty".into()];
        DataGrid::from_json(columns, ROWS).unwrap()
    }

    fn codes(grid: &DataGrid) -> Vec<&str> {
        grid.visible_rows()
            .into_iter()
            .map(|row| row["code"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn unsorted_unfiltered_keeps_input_order() {
        let grid = grid();

        assert_eq!(codes(&grid), vec!["8471300000", "0101210000", "8471410000"]);
    }

    #[test]
    fn filter_is_case_insensitive_across_cells() {
        let mut grid = grid();

        grid.set_filter("Machines");
        assert_eq!(codes(&grid), vec!["8471300000", "8471410000"]);

        grid.set_filter("11.5");
        assert_eq!(codes(&grid), vec!["0101210000"]);
    }

    #[test]
    fn null_cells_match_as_empty_text() {
        let columns = vec!["code".into(), "note".into()];
        let body = r#"[ { "code": "a", "note": null }, { "code": "b", "note": "null value" } ]"#;
        let mut grid = DataGrid::from_json(columns, body).unwrap();

        grid.set_filter("null");

        assert_eq!(codes(&grid), vec!["b"]);
    }

    #[test]
    fn first_sort_is_descending_and_repeats_flip() {
        let mut grid = grid();

        assert!(grid.sort_by("duty"));
        assert_eq!(grid.sort_order("duty"), Some(SortOrder::Descending));
        assert_eq!(codes(&grid), vec!["0101210000", "8471410000", "8471300000"]);

        assert!(grid.sort_by("duty"));
        assert_eq!(codes(&grid), vec!["8471300000", "8471410000", "0101210000"]);
    }

    #[test]
    fn columns_keep_independent_orders() {
        let mut grid = grid();
        grid.sort_by("duty");
        grid.sort_by("code");

        assert_eq!(grid.sort_key(), Some("code"));
        assert_eq!(grid.sort_order("duty"), Some(SortOrder::Descending));
        assert_eq!(codes(&grid), vec!["8471410000", "8471300000", "0101210000"]);
        assert!(!grid.sort_by("missing"));
    }

    #[test]
    fn missing_cells_sort_first_ascending() {
        let columns = vec!["code".into(), "note".into()];
        let body = r#"[ { "code": "a", "note": "x" }, { "code": "b" } ]"#;
        let mut grid = DataGrid::from_json(columns, body).unwrap();
        grid.sort_by("note");
        grid.sort_by("note");

        assert_eq!(codes(&grid), vec!["b", "a"]);
    }

    #[test]
    fn render_shows_capitalized_header_with_sort_arrow() {
        let mut grid = grid();
        grid.sort_by("code");
        let widget = DataGridView::new(&grid, GridStyle::default());
        let mut state = TableState::default();

        let area = Rect::new(0, 0, 60, 6);
        let mut buffer = Buffer::empty(area);
        widget.render(area, &mut buffer, &mut state);

        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Code ▼"));
        assert!(text.contains("Description"));
    }
}
