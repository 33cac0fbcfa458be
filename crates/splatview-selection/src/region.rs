//! Selection region descriptors.

use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};
use splatview_core::Transform;

/// The region a selection query covers.
///
/// Serializable so a gesture can be shipped to a worker thread with the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionRegion {
    /// A freehand polygon in NDC, implicitly closed.
    Lasso(Vec<Vec2>),
    /// A screen-space rectangle in NDC, as four corners.
    #[serde(rename = "box-2d")]
    Box2D([Vec2; 4]),
    /// An oriented box: the world matrix that maps the unit cube `[-0.5, 0.5]^3` into place.
    #[serde(rename = "box-3d")]
    Box3D(Mat4),
}

impl SelectionRegion {
    /// Creates a lasso region from NDC points.
    pub fn lasso(points: Vec<Vec2>) -> Self {
        SelectionRegion::Lasso(points)
    }

    /// Creates a lasso region from flat `x, y, z` triplets; `z` is ignored and
    /// a trailing partial triplet is dropped.
    pub fn lasso_from_triplets(values: &[f32]) -> Self {
        SelectionRegion::Lasso(
            values
                .chunks_exact(3)
                .map(|c| Vec2::new(c[0], c[1]))
                .collect(),
        )
    }

    /// Creates a rectangle from two opposite NDC corners.
    ///
    /// Corners are ordered `a, (b.x, a.y), b, (a.x, b.y)`.
    pub fn box_2d(a: Vec2, b: Vec2) -> Self {
        SelectionRegion::Box2D([a, Vec2::new(b.x, a.y), b, Vec2::new(a.x, b.y)])
    }

    /// Creates an oriented-box region from its world matrix.
    pub fn box_3d(world: Mat4) -> Self {
        SelectionRegion::Box3D(world)
    }

    /// Creates an oriented-box region from a decomposed transform.
    pub fn box_3d_from_transform(transform: &Transform) -> Self {
        SelectionRegion::Box3D(transform.to_matrix())
    }

    /// Returns the screen-space polygon, or `None` for 3D boxes.
    pub fn polygon(&self) -> Option<&[Vec2]> {
        match self {
            SelectionRegion::Lasso(points) => Some(points),
            SelectionRegion::Box2D(corners) => Some(corners),
            SelectionRegion::Box3D(_) => None,
        }
    }

    /// Returns a short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionRegion::Lasso(_) => "lasso",
            SelectionRegion::Box2D(_) => "box",
            SelectionRegion::Box3D(_) => "box3d",
        }
    }
}
