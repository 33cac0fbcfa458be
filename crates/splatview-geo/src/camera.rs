//! Registered cameras: a pose plus display intrinsics.

use glam::{DQuat, DVec3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::pose::{compose_camera_pose, CameraPose};
use crate::registration::RegistrationRecord;

/// Display parameters of a camera frustum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraIntrinsics {
    /// Vertical field of view in degrees.
    pub fov_vertical_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl CameraIntrinsics {
    /// Creates intrinsics with the default clip range.
    pub fn new(fov_vertical_degrees: f32, aspect_ratio: f32) -> Self {
        Self {
            fov_vertical_degrees,
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Creates intrinsics from horizontal FoV and aspect ratio.
    pub fn from_horizontal_fov(fov_horizontal_degrees: f32, aspect_ratio: f32) -> Self {
        // tan(v/2) = tan(h/2) / aspect
        let h_rad = fov_horizontal_degrees.to_radians();
        let v_rad = 2.0 * ((h_rad / 2.0).tan() / aspect_ratio).atan();
        Self::new(v_rad.to_degrees(), aspect_ratio)
    }

    /// Sets the clip range.
    #[must_use]
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Returns the OpenGL-style perspective projection.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_vertical_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

impl Default for CameraIntrinsics {
    /// A 50° square frustum with a hairline depth range, drawn as a camera marker.
    fn default() -> Self {
        Self {
            fov_vertical_degrees: 50.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 0.10001,
        }
    }
}

/// Places a camera from a world-to-camera rotation and translation and pairs
/// it with the frustum it is drawn with.
pub fn compose_camera(
    rotation: DQuat,
    translation: DVec3,
    fov_vertical_degrees: f32,
    aspect_ratio: f32,
) -> (CameraPose, CameraIntrinsics) {
    (
        compose_camera_pose(rotation, translation),
        CameraIntrinsics::new(fov_vertical_degrees, aspect_ratio),
    )
}

/// A camera recovered from a registration record.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredCamera {
    pub image_id: i32,
    pub camera_id: i32,
    pub image_name: String,
    pub pose: CameraPose,
    pub intrinsics: CameraIntrinsics,
}

impl RegisteredCamera {
    /// Places a camera at the pose described by `record`.
    pub fn from_record(record: &RegistrationRecord, intrinsics: CameraIntrinsics) -> Self {
        Self {
            image_id: record.image_id,
            camera_id: record.camera_id,
            image_name: record.image_name.clone(),
            pose: compose_camera_pose(record.rotation, record.translation),
            intrinsics,
        }
    }

    /// Camera centre in scene space.
    pub fn position(&self) -> Vec3 {
        self.pose.position.as_vec3()
    }

    /// Camera-to-world rotation.
    pub fn orientation(&self) -> Quat {
        self.pose.orientation.as_quat()
    }

    /// Returns the camera-to-world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.pose.to_matrix().as_mat4()
    }

    /// Returns the world-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.to_matrix().inverse().as_mat4()
    }

    /// Returns the projection matrix from the intrinsics.
    pub fn projection_matrix(&self) -> Mat4 {
        self.intrinsics.projection_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RegistrationRecord {
        RegistrationRecord {
            image_id: 4,
            rotation: DQuat::IDENTITY,
            translation: DVec3::new(1.0, 2.0, 3.0),
            camera_id: 1,
            image_name: "frame_0004.jpg".into(),
            point2d_count: 0,
        }
    }

    #[test]
    fn test_default_intrinsics() {
        let i = CameraIntrinsics::default();
        assert_eq!(i.fov_vertical_degrees, 50.0);
        assert_eq!(i.aspect_ratio, 1.0);
        assert_eq!(i.near, 0.1);
        assert_eq!(i.far, 0.10001);
    }

    #[test]
    fn test_horizontal_fov_square() {
        let i = CameraIntrinsics::from_horizontal_fov(70.0, 1.0);
        assert!((i.fov_vertical_degrees - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_record() {
        let cam = RegisteredCamera::from_record(&record(), CameraIntrinsics::new(60.0, 1.5));
        assert_eq!(cam.image_id, 4);
        assert_eq!(cam.image_name, "frame_0004.jpg");
        assert!((cam.position() - Vec3::new(-1.0, -2.0, -3.0)).length() < 1e-6);
        assert_eq!(cam.intrinsics.aspect_ratio, 1.5);
    }

    #[test]
    fn test_compose_camera() {
        let rotation = DQuat::from_rotation_y(0.7);
        let translation = DVec3::new(0.5, -1.0, 2.0);
        let (pose, intrinsics) = compose_camera(rotation, translation, 45.0, 16.0 / 9.0);

        assert_eq!(pose, compose_camera_pose(rotation, translation));
        assert_eq!(intrinsics.fov_vertical_degrees, 45.0);
        assert_eq!(intrinsics.aspect_ratio, 16.0 / 9.0);
        assert_eq!(intrinsics.near, CameraIntrinsics::default().near);
        // The centre maps back onto the registration origin
        assert!((rotation * pose.position + translation).length() < 1e-12);
    }

    #[test]
    fn test_view_matrix_inverts_world() {
        let cam = RegisteredCamera::from_record(&record(), CameraIntrinsics::default());
        let eye = cam.view_matrix().transform_point3(cam.position());
        assert!(eye.length() < 1e-5);
        let product = cam.view_matrix() * cam.world_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
