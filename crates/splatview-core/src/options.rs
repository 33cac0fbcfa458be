//! Configuration options for selection queries.

use serde::{Deserialize, Serialize};

/// Per-triangle matching strategy used by screen-space selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// The projected triangle centroid must lie inside the region.
    Centroid,
    /// Like [`SelectionMode::Centroid`], and the centroid must also be visible from the camera.
    CentroidVisible,
    /// Any overlap between the projected triangle and the region (vertex inside or edge crossing).
    #[default]
    Intersection,
}

impl SelectionMode {
    /// Returns true for both centroid-based modes.
    pub fn uses_centroid(self) -> bool {
        matches!(self, SelectionMode::Centroid | SelectionMode::CentroidVisible)
    }

    /// Returns the wire name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::Centroid => "centroid",
            SelectionMode::CentroidVisible => "centroid-visible",
            SelectionMode::Intersection => "intersection",
        }
    }
}

/// Options controlling a selection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// How individual triangles are matched against the region.
    pub mode: SelectionMode,

    /// Stop at the first matching triangle; the caller treats a hit as selecting the whole mesh.
    pub select_whole_model: bool,

    /// Prune subtrees with the BVH. When false every triangle is tested.
    pub use_bounds_tree: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Intersection,
            select_whole_model: false,
            use_bounds_tree: true,
        }
    }
}

impl SelectionOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the matching mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether the query stops on the first hit.
    #[must_use]
    pub fn with_select_whole_model(mut self, enabled: bool) -> Self {
        self.select_whole_model = enabled;
        self
    }

    /// Sets whether the BVH prunes the traversal.
    #[must_use]
    pub fn with_bounds_tree(mut self, enabled: bool) -> Self {
        self.use_bounds_tree = enabled;
        self
    }
}
