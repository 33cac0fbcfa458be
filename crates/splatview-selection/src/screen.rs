//! Screen-space (lasso and rectangle) triangle selection.
//!
//! Every BVH node's box is projected to NDC and classified against the
//! region polygon. Boundary segments that cannot matter for a node are
//! filtered out once per tree level, so children start from their parent's
//! pruned set instead of the full boundary.
//!
//! Geometry at or behind the camera plane has no meaningful projection.
//! Nodes that reach it are never pruned by the filter; triangles are clipped
//! against the plane before projecting, and centroids behind it never match.

use glam::{Mat4, Vec2, Vec3, Vec4};
use splatview_core::geometry::{connect_points_into, convex_hull_into, point_in_polygon, Segment2};
use splatview_core::{
    Aabb, Bvh, Containment, Result, SelectionMode, SelectionOptions, ShapecastVisitor,
    TraversalControl, Triangle, TriangleMesh,
};

use crate::camera::CameraMatrices;
use crate::scratch::SelectionScratch;

/// Distance the visibility ray origin is pushed off the triangle along its normal.
pub const VISIBILITY_RAY_OFFSET: f32 = 1e-6;

/// Clip-space `w` at or below which a point counts as behind the camera.
pub const MIN_CLIP_W: f32 = 1e-6;

/// Selects the triangles of `mesh` covered by the closed NDC `polygon`.
///
/// Returns the index-buffer positions `(3i, 3i + 1, 3i + 2)` of every selected
/// triangle `i`. A polygon with fewer than three points selects nothing.
pub fn compute_selected_triangles(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    camera: &CameraMatrices,
    polygon: &[Vec2],
    options: &SelectionOptions,
    scratch: &mut SelectionScratch,
) -> Result<Vec<u32>> {
    bvh.check_mesh(mesh)?;
    scratch.reset();

    if polygon.len() < 3 {
        log::debug!("selection polygon has {} points, nothing selected", polygon.len());
        return Ok(Vec::new());
    }

    let world = mesh.world_matrix();
    let to_screen = camera.view_projection() * world;
    let camera_local = world.inverse().transform_point3(camera.world_position());

    connect_points_into(polygon, &mut scratch.region_segments);

    let mut indices = Vec::new();
    let mut visitor = ScreenSpaceVisitor {
        mesh,
        bvh,
        to_screen,
        camera_local,
        options: *options,
        scratch,
    };
    bvh.shapecast(mesh, &mut visitor, &mut indices);

    let stats = visitor.scratch.stats;
    log::debug!(
        "{} selection: {} triangles selected, {} nodes visited, {} triangles tested",
        options.mode.name(),
        indices.len() / 3,
        stats.nodes_visited,
        stats.triangles_tested
    );
    Ok(indices)
}

struct ScreenSpaceVisitor<'a> {
    mesh: &'a TriangleMesh,
    bvh: &'a Bvh,
    to_screen: Mat4,
    camera_local: Vec3,
    options: SelectionOptions,
    scratch: &'a mut SelectionScratch,
}

impl ScreenSpaceVisitor<'_> {
    fn clip(&self, point: Vec3) -> Vec4 {
        self.to_screen * point.extend(1.0)
    }

    /// Projects the part of `triangle` in front of the camera into `outline`
    /// and returns its vertex count: 0 when fully behind, else 3 or 4.
    fn project_triangle(&self, triangle: &Triangle, outline: &mut [Vec2; 4]) -> usize {
        let clipped = [self.clip(triangle.a), self.clip(triangle.b), self.clip(triangle.c)];
        let mut count = 0;
        for i in 0..3 {
            let a = clipped[i];
            let b = clipped[(i + 1) % 3];
            let a_in = a.w > MIN_CLIP_W;
            if a_in {
                outline[count] = to_ndc(a);
                count += 1;
            }
            if a_in != (b.w > MIN_CLIP_W) {
                let t = (MIN_CLIP_W - a.w) / (b.w - a.w);
                outline[count] = to_ndc(a.lerp(b, t));
                count += 1;
            }
        }
        count
    }

    /// Boundary segments relevant to a node (or its triangles) at `depth`.
    fn segments_at(&self, depth: usize) -> &[Segment2] {
        if self.options.use_bounds_tree {
            &self.scratch.levels[depth]
        } else {
            &self.scratch.region_segments
        }
    }

    /// True if something lies between the triangle and the camera.
    fn is_occluded(&self, triangle: &Triangle, index: u32, centroid: Vec3) -> bool {
        let origin = centroid + triangle.normal() * VISIBILITY_RAY_OFFSET;
        let direction = self.camera_local - centroid;
        self.bvh
            .raycast_first(self.mesh, origin, direction, Some(index))
            .is_some_and(|hit| hit.distance < 1.0)
    }

    fn matches(&self, triangle: &Triangle, index: u32, contained: bool, depth: usize) -> bool {
        let segments = self.segments_at(depth);

        if self.options.mode.uses_centroid() {
            let centroid = triangle.centroid();
            if !contained {
                let clipped = self.clip(centroid);
                if clipped.w <= MIN_CLIP_W || !point_in_polygon(to_ndc(clipped), segments) {
                    return false;
                }
            }
            return self.options.mode != SelectionMode::CentroidVisible
                || !self.is_occluded(triangle, index, centroid);
        }

        if contained {
            return true;
        }
        let mut outline = [Vec2::ZERO; 4];
        let count = self.project_triangle(triangle, &mut outline);
        let outline = &outline[..count];
        if outline.iter().any(|&p| point_in_polygon(p, segments)) {
            return true;
        }
        (0..count).any(|i| {
            let edge = Segment2::new(outline[i], outline[(i + 1) % count]);
            segments.iter().any(|s| edge.crosses(s))
        })
    }
}

fn to_ndc(clipped: Vec4) -> Vec2 {
    Vec2::new(clipped.x, clipped.y) / clipped.w
}

impl ShapecastVisitor for ScreenSpaceVisitor<'_> {
    type Accumulator = Vec<u32>;

    fn intersects_bounds(&mut self, bounds: &Aabb, _is_leaf: bool, depth: usize) -> Containment {
        self.scratch.stats.nodes_visited += 1;
        if !self.options.use_bounds_tree {
            return Containment::Intersected;
        }

        let clipped = bounds.corners().map(|c| self.clip(c));
        let behind = clipped.iter().filter(|c| c.w <= MIN_CLIP_W).count();
        let scratch = &mut *self.scratch;

        if behind == clipped.len() {
            return Containment::NotIntersected;
        }
        if behind > 0 {
            // The box straddles the camera plane: hand the parent's set down untouched
            scratch.filter_level(depth, |_| true);
            return Containment::Intersected;
        }

        scratch.projected.clear();
        scratch.projected.extend(clipped.iter().map(|&c| to_ndc(c)));

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in &scratch.projected {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        // Keep only segments that can cross this node or be hit by a rightward ray from it
        let survivors =
            scratch.filter_level(depth, |s| !s.is_outside_rightward(min_x, min_y, max_y));
        if survivors == 0 {
            return Containment::NotIntersected;
        }

        convex_hull_into(&scratch.projected, &mut scratch.hull_sorted, &mut scratch.hull);
        connect_points_into(&scratch.hull, &mut scratch.hull_segments);
        let segments = &scratch.levels[depth];

        if segments
            .iter()
            .any(|s| point_in_polygon(s.start, &scratch.hull_segments))
        {
            return Containment::Intersected;
        }

        for hull_segment in &scratch.hull_segments {
            if segments.iter().any(|s| hull_segment.crosses(s)) {
                return Containment::Intersected;
            }
        }

        match scratch.hull.first() {
            Some(&corner) if point_in_polygon(corner, segments) => Containment::Contained,
            _ => Containment::NotIntersected,
        }
    }

    fn intersects_triangle(
        &mut self,
        triangle: &Triangle,
        index: u32,
        contained: bool,
        depth: usize,
        acc: &mut Vec<u32>,
    ) -> TraversalControl {
        self.scratch.stats.triangles_tested += 1;
        if !self.matches(triangle, index, contained, depth) {
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
