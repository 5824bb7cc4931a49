//! Perspective camera and pointer rays

use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3};

/// Half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `from` through `to`
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Fixed scene camera
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: [f32; 2]) -> Self {
        Self {
            position: Vec3::from(config.position),
            direction: Vec3::from(config.direction).normalize_or_zero(),
            fov_y: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect: viewport[0] / viewport[1],
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Update the aspect ratio after a viewport resize
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Normalized device coordinates of a viewport pixel; y points up
    pub fn ndc(pixel: Vec2, viewport: [f32; 2]) -> Vec2 {
        Vec2::new(
            (pixel.x / viewport[0]) * 2.0 - 1.0,
            1.0 - (pixel.y / viewport[1]) * 2.0,
        )
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).inverse();

        let near = inv_view_proj.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inv_view_proj.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));

        Ray {
            origin: self.position,
            direction: (far - near).normalize_or_zero(),
        }
    }
}
