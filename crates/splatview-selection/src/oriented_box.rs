//! Oriented 3D box selection.
//!
//! The selection box is the unit cube `[-0.5, 0.5]³` placed in the world by a
//! matrix. Node bounds and triangles are carried into the box's local frame
//! and classified against the unit cube, so the test never projects.

use glam::Mat4;
use splatview_core::{
    Aabb, Bvh, Containment, Result, SelectionMode, SelectionOptions, ShapecastVisitor,
    TraversalControl, Triangle, TriangleMesh,
};

use crate::scratch::SelectionScratch;

/// Box matrices with a smaller absolute determinant are treated as flat.
const MIN_BOX_DETERMINANT: f32 = 1e-12;

/// Cheap overlap pre-check between a selection box and a mesh.
///
/// Compares the box's world AABB, carried into mesh space, with the BVH root
/// bounds. A `false` answer guarantees [`compute_box_selected_triangles`]
/// would select nothing; `true` may still select nothing.
pub fn fast_box_hits_mesh(mesh: &TriangleMesh, bvh: &Bvh, box_world: &Mat4) -> bool {
    let root = bvh.bounds();
    if root.is_empty() {
        return false;
    }
    let world_bounds = Aabb::UNIT.transformed(box_world);
    let local_bounds = world_bounds.transformed(&mesh.world_matrix().inverse());
    local_bounds.intersects_box(&root)
}

/// Selects the triangles of `mesh` inside or touching the oriented box `box_world`.
///
/// Intersection mode keeps any triangle touching the box; the centroid modes
/// keep triangles whose centroid lies in the box. Occlusion has no meaning
/// without a viewpoint, so centroid-visible behaves like centroid here.
pub fn compute_box_selected_triangles(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    box_world: &Mat4,
    options: &SelectionOptions,
    scratch: &mut SelectionScratch,
) -> Result<Vec<u32>> {
    bvh.check_mesh(mesh)?;
    scratch.reset();

    if box_world.determinant().abs() < MIN_BOX_DETERMINANT {
        log::debug!("selection box is degenerate, nothing selected");
        return Ok(Vec::new());
    }

    let mut visitor = BoxVisitor {
        to_box: box_world.inverse() * mesh.world_matrix(),
        options: *options,
        scratch,
    };
    let mut indices = Vec::new();
    bvh.shapecast(mesh, &mut visitor, &mut indices);

    let stats = visitor.scratch.stats;
    log::debug!(
        "box selection: {} triangles selected, {} nodes visited",
        indices.len() / 3,
        stats.nodes_visited
    );
    Ok(indices)
}

struct BoxVisitor<'a> {
    to_box: Mat4,
    options: SelectionOptions,
    scratch: &'a mut SelectionScratch,
}

impl ShapecastVisitor for BoxVisitor<'_> {
    type Accumulator = Vec<u32>;

    fn intersects_bounds(&mut self, bounds: &Aabb, _is_leaf: bool, _depth: usize) -> Containment {
        self.scratch.stats.nodes_visited += 1;
        if !self.options.use_bounds_tree {
            return Containment::Intersected;
        }
        Aabb::UNIT.classify_box(&bounds.transformed(&self.to_box))
    }

    fn intersects_triangle(
        &mut self,
        triangle: &Triangle,
        index: u32,
        contained: bool,
        _depth: usize,
        acc: &mut Vec<u32>,
    ) -> TraversalControl {
        self.scratch.stats.triangles_tested += 1;
        let hit = contained || {
            let local = triangle.transformed(&self.to_box);
            match self.options.mode {
                SelectionMode::Intersection => {
                    Aabb::UNIT.intersects_triangle(local.a, local.b, local.c)
                }
                SelectionMode::Centroid | SelectionMode::CentroidVisible => {
                    Aabb::UNIT.contains_point(local.centroid())
                }
            }
        };
        if !hit {
            return TraversalControl::Continue;
        }

        acc.extend_from_slice(&TriangleMesh::index_triple(index as usize));
        if self.options.select_whole_model {
            TraversalControl::Stop
        } else {
            TraversalControl::Continue
        }
    }
}
