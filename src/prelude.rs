pub use crate::{
    CommodityTreeView, ControllerOutcome, DataGrid, DataGridView, ExpandedTracking, GridStyle,
    InitialOpen, LoadError, LoadStatus, Node, NodeId, TreeAction, TreeConfig, TreeController,
    TreeEvent, TreeGlyphs, TreeLabelProvider, TreePayload, TreeRequest, TreeSource,
    TreeViewState, TreeViewStyle,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};

#[cfg(feature = "http")]
pub use crate::HttpSource;
