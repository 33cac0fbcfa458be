//! Reusable per-query working memory.

use glam::Vec2;
use serde::Serialize;
use splatview_core::Segment2;

/// Counters collected during one selection query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    /// BVH nodes whose bounds were classified.
    pub nodes_visited: usize,
    /// Triangles handed to the per-triangle test.
    pub triangles_tested: usize,
}

/// Buffers reused across selection queries.
///
/// `levels[d]` holds the region segments still relevant at tree depth `d`.
/// Traversal is depth-first, so when a node at depth `d` is classified its
/// parent's set at `d - 1` is always the one filtered for its own ancestor
/// chain; writing `levels[d]` only ever overwrites a finished sibling.
#[derive(Debug, Default)]
pub struct SelectionScratch {
    pub(crate) region_segments: Vec<Segment2>,
    pub(crate) levels: Vec<Vec<Segment2>>,
    pub(crate) projected: Vec<Vec2>,
    pub(crate) hull_sorted: Vec<Vec2>,
    pub(crate) hull: Vec<Vec2>,
    pub(crate) hull_segments: Vec<Segment2>,
    pub(crate) stats: SelectionStats,
}

impl SelectionStats {
    /// Returns true if the query never touched the tree.
    pub fn is_untouched(&self) -> bool {
        self.nodes_visited == 0 && self.triangles_tested == 0
    }
}

impl SelectionScratch {
    /// Creates empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of the last query run with this scratch.
    pub fn stats(&self) -> SelectionStats {
        self.stats
    }

    pub(crate) fn reset(&mut self) {
        self.region_segments.clear();
        self.stats = SelectionStats::default();
    }

    /// Filters the parent level (or the full region at the root) into
    /// `levels[depth]` and returns how many segments survived.
    pub(crate) fn filter_level(
        &mut self,
        depth: usize,
        keep: impl Fn(&Segment2) -> bool,
    ) -> usize {
        while self.levels.len() <= depth {
            self.levels.push(Vec::new());
        }

        let (parents, rest) = self.levels.split_at_mut(depth);
        let target = &mut rest[0];
        let source: &[Segment2] = match parents.last() {
            Some(parent) => parent,
            None => &self.region_segments,
        };

        target.clear();
        target.extend(source.iter().filter(|&s| keep(s)).copied());
        target.len()
    }
}
