//! Placement of the oriented selection box.
//!
//! The box is the unit cube `[-0.5, 0.5]^3` mapped into the world by a
//! [`Transform`]. A fitted box starts axis-aligned; resizing edits `scale`.

use glam::{Mat4, Quat, Vec3};

use crate::bounds::Aabb;

/// Translation, rotation and scale of the selection box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Box centre in world space.
    pub translation: Vec3,
    pub rotation: Quat,
    /// Edge lengths of the box.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a transform that maps the unit box `[-0.5, 0.5]^3` onto `bounds`.
    #[must_use]
    pub fn from_bounds(bounds: &Aabb) -> Self {
        Self {
            translation: bounds.center(),
            rotation: Quat::IDENTITY,
            scale: bounds.size(),
        }
    }

    /// Sets the box edge lengths.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// The world matrix of the box.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Returns the world-space axis-aligned bounds of the box.
    pub fn unit_box_bounds(&self) -> Aabb {
        Aabb::UNIT.transformed(&self.to_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bounds_covers_bounds() {
        let bounds = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 4.0));
        let t = Transform::from_bounds(&bounds);
        let covered = t.unit_box_bounds();
        assert!((covered.min - bounds.min).length() < 1e-5);
        assert!((covered.max - bounds.max).length() < 1e-5);
    }

    #[test]
    fn test_rescaled_box_keeps_its_centre() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 0.0));
        let t = Transform::from_bounds(&bounds).with_scale(Vec3::new(4.0, 1.0, 1.0));
        let corner = t.to_matrix().transform_point3(Vec3::splat(0.5));
        assert!((corner - Vec3::new(3.0, 1.5, 0.5)).length() < 1e-5);
        assert_eq!(t.unit_box_bounds().center(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotated_box_bounds_grow() {
        let t = Transform {
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
            ..Transform::default()
        };
        let half_diagonal = std::f32::consts::SQRT_2 * 0.5;
        assert!((t.unit_box_bounds().max.x - half_diagonal).abs() < 1e-5);
    }
}
