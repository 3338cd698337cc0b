use serde::{Deserialize, Serialize};

/// How the registry keeps its list of expanded identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpandedTracking {
    /// Append on every expand; never prune on collapse. Duplicates are kept.
    #[default]
    Log,
    /// Insert only if absent and remove on collapse.
    Set,
}

/// Which nodes start open when a tree is mounted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialOpen {
    /// Every node starts closed.
    #[default]
    Collapsed,
    /// Only the root starts open.
    Root,
    /// Every folder starts open.
    All,
}

/// Expansion behavior of a [`TreeController`](crate::TreeController).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub tracking: ExpandedTracking,
    pub initial_open: InitialOpen,
}

impl TreeConfig {
    /// Full hierarchy page: everything collapsed, expanded list kept as a log.
    pub const fn hierarchy() -> Self {
        Self {
            tracking: ExpandedTracking::Log,
            initial_open: InitialOpen::Collapsed,
        }
    }

    /// Heading detail page: the whole heading starts unfolded.
    pub const fn heading() -> Self {
        Self {
            tracking: ExpandedTracking::Log,
            initial_open: InitialOpen::All,
        }
    }

    #[must_use]
    pub const fn with_tracking(mut self, tracking: ExpandedTracking) -> Self {
        self.tracking = tracking;
        self
    }

    #[must_use]
    pub const fn with_initial_open(mut self, initial_open: InitialOpen) -> Self {
        self.initial_open = initial_open;
        self
    }
}
