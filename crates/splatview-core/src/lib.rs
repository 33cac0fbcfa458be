//! Core types for splatview-rs.
//!
//! This crate provides the building blocks shared by the selection engine and
//! the scene facade:
//! - [`SplatviewError`] and the crate-wide [`Result`]
//! - 2D [`geometry`] primitives (segment crossing, point-in-polygon, convex hull)
//! - [`Aabb`] with tri-state [`Containment`] classification
//! - [`TriangleMesh`] and the [`Bvh`] spatial index with its shapecast visitor
//! - [`SelectionOptions`] shared by every selection query

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Triangle and node counts fit comfortably in u32/f32
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod bounds;
pub mod bvh;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod options;
pub mod transform;

pub use bounds::{Aabb, Containment};
pub use bvh::{Bvh, BvhNode, RayHit, ShapecastVisitor, TraversalControl, MAX_LEAF_TRIANGLES};
pub use error::{Result, SplatviewError};
pub use geometry::{convex_hull, point_in_polygon, segments_intersect, Segment2};
pub use mesh::{Triangle, TriangleMesh};
pub use options::{SelectionMode, SelectionOptions};
pub use transform::Transform;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
