//! Voxel sampling of a selection.
//!
//! Covers the selected geometry with axis-aligned cubes: a grid is laid over
//! the selection's world bounds and every cell whose cube touches a selected
//! triangle is emitted as its centre point. Y rows are tested in parallel in
//! bands; each band is flushed before the next starts, so memory stays bounded
//! by a band plus one chunk. Output order is y-major, then x, then z.

use glam::Vec3;
use rayon::prelude::*;
use splatview_core::{Aabb, Bvh, Result, SplatviewError, TriangleMesh};

/// Default number of voxel centres per delivered chunk.
pub const DEFAULT_VOXEL_CHUNK: usize = 4096;

/// Grid resolution along each axis, at least one cell.
fn cell_counts(size: Vec3, voxel_size: f32) -> [usize; 3] {
    let count = |extent: f32| ((extent / voxel_size).ceil() as usize).max(1);
    [count(size.x), count(size.y), count(size.z)]
}

/// Computes rows `0..rows` in parallel bands of `band_rows`, handing each
/// finished band's rows to `flush` in order before the next band starts.
fn for_each_band<T: Send>(
    rows: usize,
    band_rows: usize,
    compute: impl Fn(usize) -> Vec<T> + Sync,
    mut flush: impl FnMut(Vec<T>),
) {
    let band_rows = band_rows.max(1);
    for start in (0..rows).step_by(band_rows) {
        let end = (start + band_rows).min(rows);
        let band: Vec<Vec<T>> = (start..end).into_par_iter().map(&compute).collect();
        for row in band {
            flush(row);
        }
    }
}

/// Builds a world-space mesh containing only the selected triangles.
fn world_submesh(mesh: &TriangleMesh, selection: &[u32]) -> Result<TriangleMesh> {
    let indices = mesh.index_buffer()?;
    let world = mesh.world_matrix();
    let positions = mesh
        .positions()
        .iter()
        .map(|&p| world.transform_point3(p))
        .collect();

    let mut selected = Vec::with_capacity(selection.len());
    for triple in selection.chunks_exact(3) {
        for &position in triple {
            let id = indices.get(position as usize).copied().ok_or_else(|| {
                SplatviewError::InvalidGeometry(format!(
                    "selection position {position} outside index buffer"
                ))
            })?;
            selected.push(id);
        }
    }
    TriangleMesh::new(positions, Some(selected))
}

/// Samples voxel centres over the selected triangles.
///
/// `on_chunk` receives the centres in batches of at most `chunk_len`
/// (a zero `chunk_len` falls back to [`DEFAULT_VOXEL_CHUNK`]). Returns the
/// total number of centres delivered.
pub fn sample_voxels(
    mesh: &TriangleMesh,
    selection: &[u32],
    voxel_size: f32,
    chunk_len: usize,
    mut on_chunk: impl FnMut(&[Vec3]),
) -> Result<usize> {
    if !(voxel_size.is_finite() && voxel_size > 0.0) {
        return Err(SplatviewError::InvalidGeometry(format!(
            "voxel size must be positive, got {voxel_size}"
        )));
    }

    let submesh = world_submesh(mesh, selection)?;
    let bvh = Bvh::build(&submesh)?;
    let bounds = bvh.bounds();
    if bounds.is_empty() {
        return Ok(0);
    }

    let [nx, ny, nz] = cell_counts(bounds.size(), voxel_size);
    let half = Vec3::splat(voxel_size * 0.5);
    log::debug!(
        "sampling {nx}x{ny}x{nz} voxels of size {voxel_size} over {} triangles",
        submesh.num_triangles()
    );

    let chunk_len = if chunk_len == 0 {
        DEFAULT_VOXEL_CHUNK
    } else {
        chunk_len
    };
    let mut pending = Vec::with_capacity(chunk_len);
    let mut total = 0;

    for_each_band(
        ny,
        rayon::current_num_threads(),
        |iy| {
            let mut row = Vec::new();
            for ix in 0..nx {
                for iz in 0..nz {
                    let cell = Vec3::new(ix as f32, iy as f32, iz as f32) + 0.5;
                    let center = bounds.min + cell * voxel_size;
                    if bvh.intersects_box(&submesh, &Aabb::new(center - half, center + half)) {
                        row.push(center);
                    }
                }
            }
            row
        },
        |row| {
            pending.extend(row);
            while pending.len() >= chunk_len {
                on_chunk(&pending[..chunk_len]);
                pending.drain(..chunk_len);
                total += chunk_len;
            }
        },
    );

    if !pending.is_empty() {
        on_chunk(&pending);
        total += pending.len();
    }
    Ok(total)
}
