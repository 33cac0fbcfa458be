//! Camera matrices consumed by screen-space selection.

use glam::{Mat4, Vec2, Vec3};

/// The matrices of the camera a selection gesture was drawn through.
///
/// These are captured per query; nothing is cached across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    /// World-to-camera matrix.
    pub view: Mat4,
    /// Camera-to-clip matrix.
    pub projection: Mat4,
}

impl CameraMatrices {
    /// Creates camera matrices.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Creates a perspective camera at `eye` looking at `target`.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
            projection: Mat4::perspective_rh_gl(fov_y, aspect_ratio, near, far),
        }
    }

    /// Returns `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Returns the camera-to-world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.view.inverse()
    }

    /// Returns the camera position in world space.
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix().w_axis.truncate()
    }

    /// Projects a world-space point to normalized device coordinates.
    pub fn project(&self, world: Vec3) -> Vec2 {
        self.view_projection().project_point3(world).truncate()
    }
}

/// Converts an overlay pixel position (origin top-left, y down) into NDC.
pub fn ndc_from_pixels(pixel: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(pixel.x / width * 2.0 - 1.0, -(pixel.y / height * 2.0 - 1.0))
}
