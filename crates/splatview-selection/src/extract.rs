//! Post-processing of selection results.

use splatview_core::{Aabb, Result, SplatviewError, TriangleMesh};

/// Maps selected index-buffer positions to distinct vertex ids, sorted ascending.
pub fn unique_vertex_ids(mesh: &TriangleMesh, selection: &[u32]) -> Result<Vec<u32>> {
    let indices = mesh.index_buffer()?;
    let mut ids = selection
        .iter()
        .map(|&position| {
            indices.get(position as usize).copied().ok_or_else(|| {
                SplatviewError::InvalidGeometry(format!(
                    "selection position {position} outside index buffer of {}",
                    indices.len()
                ))
            })
        })
        .collect::<Result<Vec<u32>>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// World-space bounds of the distinct vertices referenced by `selection`.
///
/// Returns [`Aabb::EMPTY`] for an empty selection.
pub fn tight_bounds(mesh: &TriangleMesh, selection: &[u32]) -> Result<Aabb> {
    let world = mesh.world_matrix();
    let positions = mesh.positions();
    let ids = unique_vertex_ids(mesh, selection)?;
    Ok(Aabb::from_points(
        ids.iter()
            .map(|&id| world.transform_point3(positions[id as usize])),
    ))
}
