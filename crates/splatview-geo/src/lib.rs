//! Coordinate and pose pipeline for splatview-rs.
//!
//! - [`geodetic`]: iterative ECEF to latitude/longitude/altitude conversion
//! - [`EcefTransform`]: the scene's local-to-ECEF matrix and measurements made through it
//! - [`registration`]: binary image registration reader
//! - [`pose`] and [`RegisteredCamera`]: camera placement from registrations
//! - [`ReadoutTracker`]: throttled per-frame position readouts
//!
//! Geodesy runs in `f64`; scene-facing accessors hand back `f32` glam types.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod geodetic;
pub mod pose;
pub mod readout;
pub mod registration;
pub mod transform;

pub use camera::{compose_camera, CameraIntrinsics, RegisteredCamera};
pub use geodetic::{
    ecef_to_geodetic, ecef_to_geodetic_with, geodetic_to_ecef, Ellipsoid, Geodetic,
    GeodeticSolution,
};
pub use pose::{compose_camera_pose, CameraPose};
pub use readout::{CameraReadout, ReadoutTracker, DEFAULT_MOVEMENT_THRESHOLD, DEFAULT_SETTLE};
pub use registration::{load_registrations, parse_registrations, RegistrationBatch, RegistrationRecord};
pub use transform::EcefTransform;

pub use glam::{DMat4, DQuat, DVec3};
