//! Region dispatch.

use splatview_core::{Bvh, Result, SelectionOptions, TriangleMesh};

use crate::camera::CameraMatrices;
use crate::oriented_box::{compute_box_selected_triangles, fast_box_hits_mesh};
use crate::region::SelectionRegion;
use crate::scratch::SelectionScratch;
use crate::screen::compute_selected_triangles;

/// Selects the triangles of `mesh` covered by `region`.
///
/// Returns flat `(3i, 3i + 1, 3i + 2)` index-buffer positions. Triangles
/// sharing vertices are not deduplicated; see [`crate::unique_vertex_ids`].
pub fn select(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    camera: &CameraMatrices,
    region: &SelectionRegion,
    options: &SelectionOptions,
) -> Result<Vec<u32>> {
    let mut scratch = SelectionScratch::new();
    select_with_scratch(mesh, bvh, camera, region, options, &mut scratch)
}

/// Like [`select`], reusing caller-owned buffers between queries.
pub fn select_with_scratch(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    camera: &CameraMatrices,
    region: &SelectionRegion,
    options: &SelectionOptions,
    scratch: &mut SelectionScratch,
) -> Result<Vec<u32>> {
    log::trace!(
        "{} selection over {} triangles",
        region.kind(),
        mesh.num_triangles()
    );
    match region {
        SelectionRegion::Lasso(points) => {
            compute_selected_triangles(mesh, bvh, camera, points, options, scratch)
        }
        SelectionRegion::Box2D(corners) => {
            compute_selected_triangles(mesh, bvh, camera, corners, options, scratch)
        }
        SelectionRegion::Box3D(box_world) => {
            bvh.check_mesh(mesh)?;
            if !fast_box_hits_mesh(mesh, bvh, box_world) {
                scratch.reset();
                log::trace!("selection box misses mesh bounds, skipping traversal");
                return Ok(Vec::new());
            }
            compute_box_selected_triangles(mesh, bvh, box_world, options, scratch)
        }
    }
}
