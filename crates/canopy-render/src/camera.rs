use glam::{Mat4, Vec3};

use crate::ray::Viewport;
use crate::renderer::CameraUniforms;

/// Free-orbit camera around a target point on the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    /// Camera looking down at a tile of the given edge length from 45 degrees.
    pub fn framing(tile_world_size: f32) -> Self {
        let distance = tile_world_size * std::f32::consts::SQRT_2;
        Self {
            target: Vec3::ZERO,
            distance,
            yaw: 0.0,
            pitch: -std::f32::consts::FRAC_PI_4,
            fov_y_rad: 75f32.to_radians(),
            near: tile_world_size * 1e-4,
            far: tile_world_size * 6.4,
            min_distance: tile_world_size * 0.01,
            max_distance: tile_world_size * 5.0,
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = -self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.5, -0.01);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let eye = self.eye_position();
        let forward = (self.target - eye).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let ahead = Vec3::Y.cross(right).normalize();

        let speed = self.distance * 0.002;
        self.target += right * (-dx * speed) + ahead * (dy * speed);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta * self.distance * 0.1)
            .clamp(self.min_distance, self.max_distance);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, aspect, self.near, self.far)
    }

    pub fn to_uniforms(&self, viewport: Viewport, time: f32) -> CameraUniforms {
        CameraUniforms::new(&self.view(), &self.projection(viewport.aspect()), viewport, time)
    }
}
