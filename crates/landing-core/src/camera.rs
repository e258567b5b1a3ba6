//! Perspective camera and viewport normalization.
//!
//! The camera is positioned and oriented directly (position + Euler XYZ
//! rotation) rather than through a look-at target, so tweens can animate
//! both independently.

use crate::constants::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_START};
use crate::picking::Ray;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub fovy_radians: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::from(CAMERA_START),
            rotation: Vec3::ZERO,
            fovy_radians: CAMERA_FOV_DEGREES.to_radians(),
            aspect: 1.0,
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }
}

impl Camera {
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// World to view transform (inverse of the camera's world matrix).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the eye through a normalized device coordinate.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - near)
    }

    /// Project a world point to viewport pixels; `None` when behind the eye.
    pub fn world_to_viewport(&self, p: Vec3, viewport: Viewport) -> Option<Vec2> {
        let clip = self.view_projection() * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
        ))
    }
}

/// Size of the pointer coordinate space, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn aspect(&self) -> Option<f32> {
        self.is_valid().then(|| self.width / self.height)
    }

    /// Map pixel coordinates to [-1, 1]² with +y up.
    #[inline]
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if !self.is_valid() {
            return None;
        }
        Some(Vec2::new(
            (x / self.width) * 2.0 - 1.0,
            -(y / self.height) * 2.0 + 1.0,
        ))
    }
}
