//! splatview-rs: spatial selection and geodetic pose engine for photogrammetric scene viewers.
//!
//! A viewer keeps one [`SceneContext`] per open scene. Meshes registered with it
//! are indexed once; gestures become [`SelectionRegion`]s and come back as
//! triangle index lists. The same context turns camera positions into ECEF and
//! GPS readouts and loads registered cameras.
//!
//! # Quick Start
//!
//! ```no_run
//! use splatview::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut scene = SceneContext::new(ViewerConfig::for_scene("quarry"));
//!     scene.load_transform()?;
//!     scene.load_registrations()?;
//!
//!     let mesh = TriangleMesh::new(
//!         vec![Vec3::ZERO, Vec3::X, Vec3::Y],
//!         Some(vec![0, 1, 2]),
//!     )?;
//!     scene.register_mesh("site", mesh)?;
//!
//!     let camera = CameraMatrices::look_at(
//!         Vec3::new(0.3, 0.3, 5.0), Vec3::new(0.3, 0.3, 0.0), Vec3::Y,
//!         0.8, 1.0, 0.1, 100.0,
//!     );
//!     let region = SelectionRegion::box_2d(Vec2::splat(-0.5), Vec2::splat(0.5));
//!     let selected = scene.select("site", &camera, &region)?;
//!     println!("{} triangles", selected.len() / 3);
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod registry;

pub use config::ViewerConfig;
pub use context::{SceneContext, REGISTRATION_LABEL};
pub use registry::{CameraId, CameraRegistry, MeshEntry, MeshRegistry};

pub use splatview_core::{
    Aabb, Bvh, Containment, Result, SelectionMode, SelectionOptions, SplatviewError, Transform,
    Triangle, TriangleMesh,
};
pub use splatview_geo::{
    compose_camera_pose, ecef_to_geodetic, CameraIntrinsics, CameraPose, CameraReadout,
    EcefTransform, Ellipsoid, Geodetic, RegisteredCamera,
};
pub use splatview_selection::{
    ndc_from_pixels, select, CameraMatrices, SelectionRegion, SelectionScratch,
};

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Initializes `env_logger` from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("splatview-rs {} logging initialized", env!("CARGO_PKG_VERSION"));
    }
}
