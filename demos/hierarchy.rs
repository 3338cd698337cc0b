// Hierarchy demo: a commodity tree next to a sortable grid.
//
// Keys: arrows/hjkl navigate, space toggles, c collapses all, e expands to a commodity,
// s cycles the grid sort, / types a grid filter (Enter/Esc to finish), q quits.
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::TableState;
use ratatui::{DefaultTerminal, Frame};
use tracing_subscriber::EnvFilter;

use tui_commodity_tree::{
    CommodityTreeView, DataGrid, DataGridView, DescriptionLabels, GridStyle, JsonSource, NodeId,
    TreeAction, TreeConfig, TreeController, TreeEvent, TreeRequest, TreeViewState, TreeViewStyle,
};

const TREE: &str = r#"{
  "treeData": {
    "node_id": "root", "href": false, "children": [
      { "node_id": "section:XVI", "href": false, "children": [
        { "node_id": "heading:8471", "href": "/heading/8471", "children": [
          { "node_id": "commodity:8471.30", "href": "/commodity/8471300000", "children": [] },
          { "node_id": "subheading:8471.4", "href": false, "children": [
            { "node_id": "commodity:8471.41", "href": "/commodity/8471410000", "children": [] },
            { "node_id": "commodity:8471.49", "href": "/commodity/8471490000", "children": [] }
          ]}
        ]}
      ]},
      { "node_id": "section:I", "href": false, "children": [
        { "node_id": "heading:0101", "href": "/heading/0101", "children": [
          { "node_id": "commodity:0101.21", "href": "/commodity/0101210000", "children": [] }
        ]}
      ]}
    ]
  }
}"#;

const GRID: &str = r#"[
  { "country": "France", "measure": "Third country duty", "duty": "0.00%" },
  { "country": "Japan", "measure": "Preferential tariff", "duty": "0.00%" },
  { "country": "Turkey", "measure": "Tariff preference", "duty": "1.70%" },
  { "country": "Canada", "measure": "Third country duty", "duty": "2.20%" }
]"#;

struct App {
    controller: TreeController,
    tree_state: TreeViewState,
    labels: DescriptionLabels,
    grid: DataGrid,
    grid_state: TableState,
    filter: Option<String>,
    sort_column: usize,
    message: String,
}

fn labels() -> DescriptionLabels {
    [
        ("section:XVI", "Machinery and mechanical appliances"),
        ("heading:8471", "Automatic data-processing machines"),
        ("commodity:8471.30", "Portable machines, weighing not more than 10 kg"),
        ("subheading:8471.4", "Other automatic data-processing machines"),
        ("commodity:8471.41", "Comprising in the same housing a CPU and I/O unit"),
        ("commodity:8471.49", "Other, presented in the form of systems"),
        ("section:I", "Live animals; animal products"),
        ("heading:0101", "Live horses, asses, mules and hinnies"),
        ("commodity:0101.21", "Pure-bred breeding animals"),
    ]
    .into_iter()
    .map(|(id, text)| (NodeId::from(id), text.to_owned()))
    .collect()
}

fn render(frame: &mut Frame, app: &mut App) {
    let [tree_area, grid_area, status_area] = Layout::vertical([
        Constraint::Percentage(60),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let mut style = TreeViewStyle::default();
    style.title = Some(Line::from("Commodity hierarchy"));
    style.border_style = Style::default().fg(Color::Rgb(92, 110, 140));
    style.line_style = Style::default().fg(Color::Rgb(86, 98, 120));
    style.link_style = Style::default().fg(Color::Rgb(136, 192, 208));
    style.highlight_style = Style::default()
        .bg(Color::Rgb(52, 66, 96))
        .add_modifier(Modifier::BOLD);
    let tree = CommodityTreeView::with_labels(&app.controller, &app.labels, style);
    frame.render_stateful_widget(tree, tree_area, &mut app.tree_state);

    let grid_style = GridStyle {
        title: Some(Line::from(format!("Measures [filter: {}]", app.grid.filter_key()))),
        header_style: Style::default().add_modifier(Modifier::BOLD),
        active_header_style: Style::default().fg(Color::Rgb(229, 201, 133)),
        ..GridStyle::default()
    };
    frame.render_stateful_widget(
        DataGridView::new(&app.grid, grid_style),
        grid_area,
        &mut app.grid_state,
    );

    frame.render_widget(Line::from(app.message.as_str()), status_area);
}

fn handle_filter_key(app: &mut App, code: KeyCode) {
    let Some(filter) = app.filter.as_mut() else {
        return;
    };
    match code {
        KeyCode::Enter | KeyCode::Esc => app.filter = None,
        KeyCode::Backspace => {
            filter.pop();
        }
        KeyCode::Char(ch) => filter.push(ch),
        _ => {}
    }
    let text = app.filter.clone().unwrap_or_default();
    app.grid.set_filter(&text);
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, &mut app))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.filter.is_some() {
            handle_filter_key(&mut app, key.code);
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('/') => app.filter = Some(String::new()),
            KeyCode::Char('s') => {
                let columns = app.grid.columns().to_vec();
                app.sort_column = (app.sort_column + 1) % columns.len();
                app.grid.sort_by(&columns[app.sort_column]);
            }
            KeyCode::Char('e') => {
                let outcome = app.controller.expand_commodity("8471.41");
                app.tree_state
                    .select_by_id(&mut app.controller, "commodity:8471.41");
                app.message = format!("expand commodity 8471.41: {outcome:?}");
            }
            _ => {
                let event = app.tree_state.handle_key(&mut app.controller, key);
                if let TreeEvent::Action(TreeAction::OpenLink) = event {
                    let link = app
                        .tree_state
                        .selected_id(&app.controller)
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    app.message = format!("open link for {link}");
                }
            }
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let source = JsonSource::new().with_body(TreeRequest::Hierarchy, TREE);
    let mut controller = TreeController::new(TreeConfig::hierarchy());
    controller.load_from(&source, &TreeRequest::Hierarchy);
    controller.expand_node("root");

    let columns = vec!["country".into(), "measure".into(), "duty".into()];
    let grid = DataGrid::from_json(columns, GRID).map_err(io::Error::other)?;

    let mut tree_state = TreeViewState::new();
    tree_state.refresh(&controller);
    tree_state.select_first();

    let app = App {
        controller,
        tree_state,
        labels: labels(),
        grid,
        grid_state: TableState::default(),
        filter: None,
        sort_column: 0,
        message: String::from("q quits, / filters the grid"),
    };

    let terminal = ratatui::init();
    let result = run_app(terminal, app);
    ratatui::restore();
    result
}
