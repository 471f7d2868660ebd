//! World-space placement of a renderer.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World position, rotation and lossy scale of a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
    /// Accumulated (lossy) world scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a transform at `position` with identity rotation and unit scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Matrix placing this transform relative to `root`.
    ///
    /// Only the translation is re-based on the root; rotation and scale are
    /// taken verbatim. This is exact when the root has identity rotation and
    /// unit scale.
    pub fn relative_to(&self, root: &Transform) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.position - root.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_rebases_translation_only() {
        let root = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(1.0),
            scale: Vec3::splat(3.0),
        };
        let child = Transform::from_position(Vec3::new(12.0, 1.0, 0.0));
        let m = child.relative_to(&root);
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
        // Root rotation/scale do not leak into the child matrix.
        let x = m.transform_vector3(Vec3::X);
        assert!((x - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_relative_to_keeps_child_rotation_and_scale() {
        let child = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let m = child.relative_to(&Transform::IDENTITY);
        let x = m.transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }
}
