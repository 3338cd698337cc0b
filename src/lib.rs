//! Commodity hierarchy widgets for ratatui.
//!
//! The core is [`TreeController`]: it mounts a category tree loaded from the
//! help-desk server, registers every node in a [`NodeRegistry`], and coordinates
//! open/closed state across nodes (ancestor expansion, bulk collapse).
//! [`CommodityTreeView`] renders it; [`DataGrid`] and [`DataGridView`] provide the
//! sortable, searchable table shown next to it.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `TreeViewState::handle_key*` helpers.
//! - `http`: blocking [`HttpSource`] for fetching tree payloads.

mod action;
mod columns;
mod config;
mod context;
mod controller;
mod error;
mod glyphs;
mod grid;
#[cfg(feature = "keymap")]
mod keymap;
mod model;
mod node;
pub mod prelude;
mod registry;
mod source;
mod state;
mod style;
mod widget;

pub use action::{TreeAction, TreeEvent};
pub use columns::{
    AdaptiveColumns, ColumnWidth, FixedColumns, GridColumns, UniformColumns, distribute_widths,
};
pub use config::{ExpandedTracking, InitialOpen, TreeConfig};
pub use context::TreeRowContext;
pub use controller::{ControllerOutcome, LoadStatus, MountedNode, TreeController};
pub use error::LoadError;
pub use glyphs::{
    DescriptionLabels, IdLabels, TreeGlyphs, TreeLabel, TreeLabelProvider, tree_label_line,
    tree_name_cell,
};
pub use grid::{DataGrid, DataGridView, GridRow, SortOrder, cell_text};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use model::{COMMODITY_PREFIX, Node, NodeId, ROOT_ID, RejectedNode, TreePayload};
pub use node::TreeNodeState;
pub use registry::{NodeHandle, NodeRegistry};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{JsonSource, TreeRequest, TreeSource, TreeSourceConfig};
pub use state::TreeViewState;
pub use style::{GridStyle, TreeScrollPolicy, TreeViewStyle};
pub use widget::CommodityTreeView;
