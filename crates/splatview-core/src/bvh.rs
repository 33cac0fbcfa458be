//! Bounding volume hierarchy over the triangles of a [`TriangleMesh`].
//!
//! The tree is stored as a flat node array. Building reorders a private copy
//! of the triangle ids so that every subtree covers one contiguous range of
//! that array; a `Contained` node can therefore hand all of its triangles to
//! the visitor without descending further.
//!
//! Queries are expressed through [`ShapecastVisitor`]: the visitor classifies
//! node bounds with a [`Containment`] and receives candidate triangles along
//! with an explicit accumulator, so no traversal state lives in closures.

use glam::Vec3;

use crate::bounds::{Aabb, Containment};
use crate::error::{Result, SplatviewError};
use crate::mesh::{Triangle, TriangleMesh};

/// Maximum number of triangles stored in a leaf.
pub const MAX_LEAF_TRIANGLES: usize = 10;

/// Whether a traversal should keep going after a triangle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalControl {
    /// Keep visiting triangles.
    Continue,
    /// Abort the whole traversal.
    Stop,
}

/// Decision callbacks for [`Bvh::shapecast`].
pub trait ShapecastVisitor {
    /// Collector for results, passed to every triangle callback.
    type Accumulator;

    /// Classifies a node's bounds. The root is at depth 0.
    fn intersects_bounds(&mut self, bounds: &Aabb, is_leaf: bool, depth: usize) -> Containment;

    /// Tests one triangle. `contained` is true when an ancestor (or the leaf itself)
    /// was classified [`Containment::Contained`]; `depth` is the depth of the node
    /// that produced the triangle.
    fn intersects_triangle(
        &mut self,
        triangle: &Triangle,
        index: u32,
        contained: bool,
        depth: usize,
        acc: &mut Self::Accumulator,
    ) -> TraversalControl;
}

/// A single BVH node.
#[derive(Debug, Clone)]
pub struct BvhNode {
    /// Bounds of every triangle in the subtree.
    pub bounds: Aabb,
    /// First slot of the subtree in the reordered triangle array.
    start: u32,
    /// Number of triangles in the subtree.
    count: u32,
    /// Child node indices; `None` for leaves.
    children: Option<(u32, u32)>,
}

impl BvhNode {
    /// Returns true if this node stores triangles directly.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the number of triangles in this subtree.
    pub fn triangle_count(&self) -> usize {
        self.count as usize
    }
}

/// Nearest ray hit returned by [`Bvh::raycast_first`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the triangle that was hit.
    pub triangle: u32,
    /// Ray parameter of the hit, in units of the ray direction's length.
    pub distance: f32,
    /// Hit position in mesh space.
    pub point: Vec3,
}

/// A bounding volume hierarchy built once per mesh.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<u32>,
}

struct BuildItem {
    bounds: Aabb,
    centroid: Vec3,
}

impl Bvh {
    /// Builds a BVH over every triangle of `mesh`.
    ///
    /// Fails with [`SplatviewError::InvalidGeometry`] if the mesh has no index buffer.
    pub fn build(mesh: &TriangleMesh) -> Result<Self> {
        mesh.index_buffer()?;
        let n = mesh.num_triangles();
        if n == 0 {
            return Ok(Self::default());
        }

        let items: Vec<BuildItem> = (0..n)
            .map(|i| {
                let tri = mesh.triangle(i);
                BuildItem {
                    bounds: tri.bounds(),
                    centroid: tri.centroid(),
                }
            })
            .collect();

        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * n / MAX_LEAF_TRIANGLES + 1),
            triangles: (0..n as u32).collect(),
        };
        bvh.build_node(&items, 0, n);

        log::debug!(
            "built BVH: {} triangles, {} nodes, depth {}",
            n,
            bvh.nodes.len(),
            bvh.depth()
        );
        Ok(bvh)
    }

    /// Builds the node for `triangles[start..end]` and returns its index.
    fn build_node(&mut self, items: &[BuildItem], start: usize, end: usize) -> u32 {
        let slice = &self.triangles[start..end];
        let mut bounds = Aabb::EMPTY;
        let mut centroid_bounds = Aabb::EMPTY;
        for &t in slice {
            let item = &items[t as usize];
            bounds = bounds.union(&item.bounds);
            centroid_bounds.expand(item.centroid);
        }

        let index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            bounds,
            start: start as u32,
            count: (end - start) as u32,
            children: None,
        });

        if end - start <= MAX_LEAF_TRIANGLES {
            return index;
        }

        // Median split on the longest centroid axis
        let axis = centroid_bounds.longest_axis();
        let mid = (end - start) / 2;
        self.triangles[start..end].select_nth_unstable_by(mid, |&a, &b| {
            items[a as usize].centroid[axis].total_cmp(&items[b as usize].centroid[axis])
        });

        let left = self.build_node(items, start, start + mid);
        let right = self.build_node(items, start + mid, end);
        self.nodes[index as usize].children = Some((left, right));
        index
    }

    /// Returns the root bounds (empty for a mesh without triangles).
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |root| root.bounds)
    }

    /// Returns the number of triangles indexed by the tree.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns all nodes; index 0 is the root.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Returns the depth of the deepest leaf (0 for a single leaf or an empty tree).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], i: usize) -> usize {
            match nodes[i].children {
                Some((l, r)) => 1 + walk(nodes, l as usize).max(walk(nodes, r as usize)),
                None => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Checks that this tree was built for `mesh`.
    pub fn check_mesh(&self, mesh: &TriangleMesh) -> Result<()> {
        mesh.index_buffer()?;
        if self.triangle_count() != mesh.num_triangles() {
            return Err(SplatviewError::InvalidGeometry(format!(
                "BVH indexes {} triangles but mesh has {}",
                self.triangle_count(),
                mesh.num_triangles()
            )));
        }
        Ok(())
    }

    fn subtree_triangles(&self, node: &BvhNode) -> &[u32] {
        let start = node.start as usize;
        &self.triangles[start..start + node.count as usize]
    }

    /// Traverses the tree top-down, pruning with the visitor's bounds classification.
    ///
    /// Returns true if a triangle callback stopped the traversal.
    pub fn shapecast<V: ShapecastVisitor>(
        &self,
        mesh: &TriangleMesh,
        visitor: &mut V,
        acc: &mut V::Accumulator,
    ) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.shapecast_node(mesh, 0, 0, visitor, acc)
    }

    fn shapecast_node<V: ShapecastVisitor>(
        &self,
        mesh: &TriangleMesh,
        index: usize,
        depth: usize,
        visitor: &mut V,
        acc: &mut V::Accumulator,
    ) -> bool {
        let node = &self.nodes[index];
        match visitor.intersects_bounds(&node.bounds, node.is_leaf(), depth) {
            Containment::NotIntersected => false,
            Containment::Contained => self.visit_range(mesh, node, true, depth, visitor, acc),
            Containment::Intersected => match node.children {
                None => self.visit_range(mesh, node, false, depth, visitor, acc),
                Some((left, right)) => {
                    self.shapecast_node(mesh, left as usize, depth + 1, visitor, acc)
                        || self.shapecast_node(mesh, right as usize, depth + 1, visitor, acc)
                }
            },
        }
    }

    fn visit_range<V: ShapecastVisitor>(
        &self,
        mesh: &TriangleMesh,
        node: &BvhNode,
        contained: bool,
        depth: usize,
        visitor: &mut V,
        acc: &mut V::Accumulator,
    ) -> bool {
        for &t in self.subtree_triangles(node) {
            let tri = mesh.triangle(t as usize);
            if visitor.intersects_triangle(&tri, t, contained, depth, acc) == TraversalControl::Stop
            {
                return true;
            }
        }
        false
    }

    /// Finds the nearest triangle hit by the ray `origin + t * direction`, `t > 0`.
    ///
    /// Both triangle sides are hittable. `skip` excludes one triangle, typically
    /// the one the ray starts on.
    pub fn raycast_first(
        &self,
        mesh: &TriangleMesh,
        origin: Vec3,
        direction: Vec3,
        skip: Option<u32>,
    ) -> Option<RayHit> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best: Option<(u32, f32)> = None;
        let mut stack = vec![0_usize];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            let Some(entry) = node.bounds.ray_entry(origin, direction) else {
                continue;
            };
            if best.is_some_and(|(_, t)| entry > t) {
                continue;
            }

            match node.children {
                Some((left, right)) => {
                    stack.push(right as usize);
                    stack.push(left as usize);
                }
                None => {
                    for &t in self.subtree_triangles(node) {
                        if skip == Some(t) {
                            continue;
                        }
                        if let Some(dist) = mesh.triangle(t as usize).ray_intersection(origin, direction) {
                            if best.map_or(true, |(_, best_t)| dist < best_t) {
                                best = Some((t, dist));
                            }
                        }
                    }
                }
            }
        }

        best.map(|(triangle, distance)| RayHit {
            triangle,
            distance,
            point: origin + direction * distance,
        })
    }

    /// Returns true if any triangle intersects `query` (mesh space).
    pub fn intersects_box(&self, mesh: &TriangleMesh, query: &Aabb) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0_usize];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            if !node.bounds.intersects_box(query) {
                continue;
            }
            match node.children {
                Some((left, right)) => {
                    stack.push(right as usize);
                    stack.push(left as usize);
                }
                None => {
                    let hit = self.subtree_triangles(node).iter().any(|&t| {
                        let tri = mesh.triangle(t as usize);
                        query.intersects_triangle(tri.a, tri.b, tri.c)
                    });
                    if hit {
                        return true;
                    }
                }
            }
        }
        false
    }
}
