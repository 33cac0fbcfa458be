//! Camera poses from world-to-camera registrations.

use glam::{DMat3, DMat4, DQuat, DVec3};

/// Flips Y and Z: from a Y-down, Z-forward camera to a Y-up, Z-back camera.
const AXIS_FLIP: DMat3 = DMat3::from_cols(
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(0.0, -1.0, 0.0),
    DVec3::new(0.0, 0.0, -1.0),
);

/// A camera placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera centre in world space.
    pub position: DVec3,
    /// Camera-to-world rotation in the Y-up, Z-back convention.
    pub orientation: DQuat,
}

impl CameraPose {
    /// Returns the camera-to-world matrix.
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Returns the direction the camera looks along, in world space.
    pub fn look_dir(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }
}

/// Builds a camera pose from a world-to-camera rotation `R` and translation `t`.
///
/// The camera centre is `-Rᵀ t`; the orientation is `diag(1, -1, -1) · Rᵀ`.
pub fn compose_camera_pose(rotation: DQuat, translation: DVec3) -> CameraPose {
    let camera_to_world = DMat3::from_quat(rotation.normalize()).transpose();
    let position = -(camera_to_world * translation);
    let orientation = DQuat::from_mat3(&(AXIS_FLIP * camera_to_world)).normalize();
    CameraPose {
        position,
        orientation,
    }
}
