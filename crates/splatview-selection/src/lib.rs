//! Triangle selection for splatview-rs.
//!
//! Turns a user gesture into the set of mesh triangles it covers:
//! - screen-space lassos and rectangles ([`compute_selected_triangles`])
//! - oriented 3D boxes ([`compute_box_selected_triangles`], with the
//!   [`fast_box_hits_mesh`] pre-check)
//!
//! [`select`] dispatches on a [`SelectionRegion`]. Results are flat index-buffer
//! positions; [`unique_vertex_ids`], [`tight_bounds`] and [`sample_voxels`]
//! post-process them.
//!
//! Every query owns its working memory ([`SelectionScratch`]), so independent
//! queries may run concurrently against the same mesh.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod camera;
pub mod engine;
pub mod extract;
pub mod oriented_box;
pub mod region;
pub mod scratch;
pub mod screen;
pub mod voxel;

pub use camera::{ndc_from_pixels, CameraMatrices};
pub use engine::{select, select_with_scratch};
pub use extract::{tight_bounds, unique_vertex_ids};
pub use oriented_box::{compute_box_selected_triangles, fast_box_hits_mesh};
pub use region::SelectionRegion;
pub use scratch::{SelectionScratch, SelectionStats};
pub use screen::compute_selected_triangles;
pub use voxel::{sample_voxels, DEFAULT_VOXEL_CHUNK};
