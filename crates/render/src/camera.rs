//! Perspective camera producing the cube pass view-projection matrix.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Yaw/pitch perspective camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Eye position in world space.
    pub position: [f32; 3],
    /// Rotation about +Y in radians; 0 looks down +X.
    pub yaw: f32,
    /// Elevation in radians, kept inside (-90°, 90°).
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 1000.0,
        }
    }
}

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.001;

impl Camera {
    /// Camera at `eye` facing `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let dir = (target - eye).normalize_or_zero();
        Self {
            position: eye.to_array(),
            yaw: dir.z.atan2(dir.x),
            pitch: dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT),
            ..Self::default()
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    /// World to view transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(Vec3::from_array(self.position), self.forward(), Vec3::Y)
    }

    /// View to clip transform for a target of `aspect` (width / height).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix, the `mvp` of the cube passes.
    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
