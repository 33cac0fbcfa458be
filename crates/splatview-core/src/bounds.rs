//! Axis-aligned bounding boxes and tri-state containment.

use glam::{Mat4, Vec3};

/// Result of classifying a bounding volume against a query region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Containment {
    /// Entirely outside the region; the subtree can be skipped.
    #[default]
    NotIntersected,
    /// Partially overlapping; children (or triangles) must be tested individually.
    Intersected,
    /// Entirely inside the region; everything beneath is selected without further tests.
    Contained,
}

impl Containment {
    /// Returns true unless the volume is entirely outside.
    pub fn is_hit(self) -> bool {
        self != Containment::NotIntersected
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// An inverted box that contains nothing; expanding it by a point yields that point.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// The canonical unit box `[-0.5, 0.5]^3` used by oriented-box selection.
    pub const UNIT: Self = Self {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    /// Creates a box from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates the smallest box containing all `points`.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::EMPTY;
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns the union of two boxes.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Returns the center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the edge lengths.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0 = x, 1 = y, 2 = z) of the longest axis.
    pub fn longest_axis(&self) -> usize {
        let d = self.size();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Returns the eight corners, x-major (x, then y, then z toggling fastest).
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns true if `point` lies inside or on the boundary.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// Returns true if the boxes overlap (touching counts).
    pub fn intersects_box(&self, other: &Aabb) -> bool {
        !(other.max.cmplt(self.min).any() || other.min.cmpgt(self.max).any())
    }

    /// Classifies `other` against this box.
    pub fn classify_box(&self, other: &Aabb) -> Containment {
        if self.contains_box(other) {
            Containment::Contained
        } else if self.intersects_box(other) {
            Containment::Intersected
        } else {
            Containment::NotIntersected
        }
    }

    /// Returns the axis-aligned bounds of this box after transforming its corners by `matrix`.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }

    /// Separating-axis test between this box and the triangle `(a, b, c)`.
    ///
    /// Tests the three box axes, the triangle normal, and the nine
    /// edge-cross-axis directions.
    pub fn intersects_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> bool {
        let center = self.center();
        let half = self.size() * 0.5;

        let t0 = a - center;
        let t1 = b - center;
        let t2 = c - center;

        // Box face normals
        let tri_min = t0.min(t1).min(t2);
        let tri_max = t0.max(t1).max(t2);
        if tri_max.cmplt(-half).any() || tri_min.cmpgt(half).any() {
            return false;
        }

        let edges = [t1 - t0, t2 - t1, t0 - t2];

        // Triangle normal
        let normal = edges[0].cross(edges[1]);
        let offset = normal.dot(t0);
        let radius = half.dot(normal.abs());
        if offset.abs() > radius {
            return false;
        }

        // Edge x axis directions
        for box_axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            for edge in &edges {
                let axis = box_axis.cross(*edge);
                if axis.length_squared() < 1e-12 {
                    continue;
                }
                let p0 = t0.dot(axis);
                let p1 = t1.dot(axis);
                let p2 = t2.dot(axis);
                let radius = half.dot(axis.abs());
                if p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius {
                    return false;
                }
            }
        }

        true
    }

    /// Slab test for a ray. Returns the entry parameter along `direction`, if the ray hits.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let near = t0.min(t1);
        let far = t0.max(t1);

        // NaN from 0 * inf (origin on a slab plane with zero direction) is ignored by max/min
        let t_near = near.max_element().max(0.0);
        let t_far = far.min_element();

        (t_near <= t_far).then_some(t_near)
    }
}
