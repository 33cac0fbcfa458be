//! 2D geometry primitives used by screen-space selection.
//!
//! All functions are pure and operate on normalized device coordinates, but
//! nothing here depends on that range.

use glam::Vec2;

/// A directed 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2 {
    /// Start point.
    pub start: Vec2,
    /// End point.
    pub end: Vec2,
}

impl Segment2 {
    /// Creates a new segment.
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Returns true if this segment crosses `other`.
    ///
    /// See [`segments_intersect`].
    pub fn crosses(&self, other: &Segment2) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
    }

    /// Returns true if the segment lies entirely left of `min_x`, entirely above
    /// `max_y`, or entirely below `min_y`.
    ///
    /// Such a segment can neither cross a rectangle spanning `[min_x, ..] x [min_y, max_y]`
    /// nor be hit by a rightward ray cast from inside it.
    pub fn is_outside_rightward(&self, min_x: f32, min_y: f32, max_y: f32) -> bool {
        (self.start.x < min_x && self.end.x < min_x)
            || (self.start.y > max_y && self.end.y > max_y)
            || (self.start.y < min_y && self.end.y < min_y)
    }
}

/// Parametric segment intersection test.
///
/// Returns false for parallel (including collinear) segments, and when either
/// intersection parameter falls outside `[0, 1]`. Touching endpoints count as
/// an intersection.
pub fn segments_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let denom = (b1.y - b0.y) * (a1.x - a0.x) - (b1.x - b0.x) * (a1.y - a0.y);
    if denom == 0.0 {
        return false;
    }

    let ua = ((b1.x - b0.x) * (a0.y - b0.y) - (b1.y - b0.y) * (a0.x - b0.x)) / denom;
    let ub = ((a1.x - a0.x) * (a0.y - b0.y) - (a1.y - a0.y) * (a0.x - b0.x)) / denom;

    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

/// Even-odd point-in-polygon test over an arbitrary set of boundary segments.
///
/// Casts a ray from `point` towards +X and counts the segments it crosses. A
/// segment counts when it straddles the point's y (half-open on the upper end)
/// and its x-intercept lies strictly to the right of the point. Horizontal and
/// zero-length segments never count. Segment order and winding do not matter.
pub fn point_in_polygon(point: Vec2, segments: &[Segment2]) -> bool {
    let mut crossings = 0_usize;
    for seg in segments {
        let (p1, p2) = (seg.start, seg.end);
        if (p1.y > point.y) != (p2.y > point.y) {
            let x_intercept = (p2.x - p1.x) * (point.y - p1.y) / (p2.y - p1.y) + p1.x;
            if point.x < x_intercept {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

/// Connects `points` into a closed loop of segments (the last point joins the first).
pub fn connect_points(points: &[Vec2]) -> Vec<Segment2> {
    let mut segments = Vec::with_capacity(points.len());
    connect_points_into(points, &mut segments);
    segments
}

/// Like [`connect_points`], writing into a reusable buffer.
pub fn connect_points_into(points: &[Vec2], target: &mut Vec<Segment2>) {
    target.clear();
    let n = points.len();
    target.extend((0..n).map(|i| Segment2::new(points[i], points[(i + 1) % n])));
}

/// 2D cross product of `(a - o)` and `(b - o)`.
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

/// Computes the convex hull of a point set (Andrew's monotone chain).
///
/// The hull is returned in counter-clockwise order, starting from the lowest-x
/// (then lowest-y) point, without repeating the first point. Duplicate and
/// collinear points are dropped. With fewer than three distinct points the
/// distinct points are returned as-is.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut hull = Vec::with_capacity(points.len() + 1);
    let mut sorted = Vec::with_capacity(points.len());
    convex_hull_into(points, &mut sorted, &mut hull);
    hull
}

/// Like [`convex_hull`], using caller-owned scratch and output buffers.
pub fn convex_hull_into(points: &[Vec2], sorted: &mut Vec<Vec2>, hull: &mut Vec<Vec2>) {
    sorted.clear();
    sorted.extend_from_slice(points);
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    hull.clear();
    if sorted.len() < 3 {
        hull.extend_from_slice(sorted);
        return;
    }

    // Lower hull
    for &p in sorted.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    // Last point equals the first
    hull.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(half: f32) -> Vec<Segment2> {
        connect_points(&[
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ])
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
        ));
    }

    #[test]
    fn test_collinear_segments_do_not_intersect() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn test_parallel_and_distant_segments() {
        // Parallel
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ));
        // Lines cross, segments do not
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(2.0, 1.0),
        ));
    }

    #[test]
    fn test_point_in_square() {
        let segments = square(1.0);
        assert!(point_in_polygon(Vec2::ZERO, &segments));
        assert!(point_in_polygon(Vec2::new(0.9, -0.9), &segments));
        assert!(!point_in_polygon(Vec2::new(1.5, 0.0), &segments));
        assert!(!point_in_polygon(Vec2::new(0.0, -2.0), &segments));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let segments = connect_points(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ]);
        assert!(point_in_polygon(Vec2::new(0.5, 2.0), &segments));
        assert!(point_in_polygon(Vec2::new(2.5, 2.0), &segments));
        assert!(!point_in_polygon(Vec2::new(1.5, 2.0), &segments));
    }

    #[test]
    fn test_degenerate_segments_never_count() {
        let p = Vec2::new(0.0, 0.0);
        let segments = vec![Segment2::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0))];
        assert!(!point_in_polygon(p, &segments));
        assert!(!point_in_polygon(p, &[]));
    }

    #[test]
    fn test_convex_hull_of_square_with_interior_points() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.2, 0.7),
        ];
        let hull = convex_hull(&points);
        assert_eq!(
            hull,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_convex_hull_drops_collinear_and_duplicates() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 3);
        assert!(!hull.contains(&Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn test_convex_hull_degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[Vec2::ONE, Vec2::ONE]), vec![Vec2::ONE]);

        // All collinear: only the two extremes survive
        let line = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert_eq!(convex_hull(&line), vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0)]);
    }

    #[test]
    fn test_convex_hull_is_counter_clockwise() {
        let points = [
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(-2.0, 0.0),
            Vec2::new(0.0, -2.0),
        ];
        let hull = convex_hull(&points);
        let area: f32 = (0..hull.len())
            .map(|i| hull[i].perp_dot(hull[(i + 1) % hull.len()]))
            .sum();
        assert!(area > 0.0);
    }

    proptest! {
        #[test]
        fn prop_point_in_polygon_rotation_invariant(
            coords in prop::collection::vec((-1.0_f32..1.0, -1.0_f32..1.0), 3..12),
            px in -1.0_f32..1.0,
            py in -1.0_f32..1.0,
            shift in 0_usize..12,
        ) {
            let points: Vec<Vec2> = coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let segments = connect_points(&points);
            let mut rotated = segments.clone();
            rotated.rotate_left(shift % segments.len());

            let p = Vec2::new(px, py);
            prop_assert_eq!(point_in_polygon(p, &segments), point_in_polygon(p, &rotated));
        }

        #[test]
        fn prop_hull_contains_input_points(
            coords in prop::collection::vec((-1.0_f32..1.0, -1.0_f32..1.0), 3..20),
        ) {
            let points: Vec<Vec2> = coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let hull = convex_hull(&points);
            prop_assume!(hull.len() >= 3);

            // Every input point is on the left of (or on) each CCW hull edge
            for p in &points {
                for i in 0..hull.len() {
                    let a = hull[i];
                    let b = hull[(i + 1) % hull.len()];
                    prop_assert!((b - a).perp_dot(*p - a) >= -1e-4);
                }
            }
        }
    }
}
