//! Indexed triangle meshes as consumed by the selection engine.

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;
use crate::error::{Result, SplatviewError};

/// A triangle given by its three vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    /// Creates a new triangle.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Returns the centroid.
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Returns the unit face normal (counter-clockwise winding), or zero for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Returns the triangle with every vertex transformed by `matrix`.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Triangle {
        Triangle::new(
            matrix.transform_point3(self.a),
            matrix.transform_point3(self.b),
            matrix.transform_point3(self.c),
        )
    }

    /// Returns the bounds of the triangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.a.min(self.b).min(self.c), self.a.max(self.b).max(self.c))
    }

    /// Double-sided Möller-Trumbore ray intersection.
    ///
    /// Returns the ray parameter `t > 0` in units of `direction`'s length.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let eps = 1e-7;
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;
        let h = direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < eps * edge1.length() * edge2.length() * direction.length() {
            return None;
        }
        let f = 1.0 / det;
        let s = origin - self.a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        if t > 0.0 {
            Some(t)
        } else {
            None
        }
    }
}

/// An indexed triangle mesh in object space plus its object-to-world matrix.
///
/// The index buffer is optional because loaders may hand over non-indexed
/// geometry; queries that need triangles reject such meshes with
/// [`SplatviewError::InvalidGeometry`].
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    indices: Option<Vec<u32>>,
    world: Mat4,
}

impl TriangleMesh {
    /// Creates a mesh, validating the index buffer if present.
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Result<Self> {
        if let Some(indices) = &indices {
            if indices.len() % 3 != 0 {
                return Err(SplatviewError::InvalidGeometry(format!(
                    "index count {} is not a multiple of 3",
                    indices.len()
                )));
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(SplatviewError::InvalidGeometry(format!(
                    "index {bad} out of range for {} vertices",
                    positions.len()
                )));
            }
        }

        Ok(Self {
            positions,
            indices,
            world: Mat4::IDENTITY,
        })
    }

    /// Creates a mesh from flat `x, y, z` vertex data as produced by asset loaders.
    pub fn from_flat_buffers(positions: &[f32], indices: Option<&[u32]>) -> Result<Self> {
        let triplets: &[[f32; 3]] = bytemuck::try_cast_slice(positions).map_err(|_| {
            SplatviewError::InvalidGeometry(format!(
                "vertex buffer length {} is not a multiple of 3",
                positions.len()
            ))
        })?;
        let positions = triplets.iter().copied().map(Vec3::from_array).collect();
        Self::new(positions, indices.map(<[u32]>::to_vec))
    }

    /// Sets the object-to-world matrix.
    #[must_use]
    pub fn with_world_matrix(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Sets the object-to-world matrix.
    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }

    /// Returns the object-to-world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Returns the object-space vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Returns the index buffer, or an error if the mesh is not indexed.
    pub fn index_buffer(&self) -> Result<&[u32]> {
        self.indices
            .as_deref()
            .ok_or_else(|| SplatviewError::InvalidGeometry("mesh has no index buffer".into()))
    }

    /// Returns true if the mesh carries an index buffer.
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Returns the number of triangles (zero for non-indexed meshes).
    pub fn num_triangles(&self) -> usize {
        self.indices.as_ref().map_or(0, |i| i.len() / 3)
    }

    /// Returns the object-space triangle at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range (every index is out of range for a non-indexed mesh).
    pub fn triangle(&self, index: usize) -> Triangle {
        let indices = self.indices.as_deref().unwrap_or_default();
        let i3 = index * 3;
        Triangle::new(
            self.positions[indices[i3] as usize],
            self.positions[indices[i3 + 1] as usize],
            self.positions[indices[i3 + 2] as usize],
        )
    }

    /// Returns the positions within the index buffer that describe triangle `index`.
    pub fn index_triple(index: usize) -> [u32; 3] {
        let i3 = (index * 3) as u32;
        [i3, i3 + 1, i3 + 2]
    }

    /// Returns the vertex id stored at `position` in the index buffer.
    pub fn vertex_at(&self, position: u32) -> Option<u32> {
        self.indices.as_deref()?.get(position as usize).copied()
    }

    /// Returns the object-space bounds of all vertices.
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }
}
