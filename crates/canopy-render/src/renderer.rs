use canopy_core::math::texel_to_ratio;
use canopy_core::RenderConfig;
use glam::{Mat4, Vec2, Vec3};
use rayon::prelude::*;

use crate::intersect::{ray_box, ray_cylinder, ray_sphere};
use crate::palette::{Palette, Rgba};
use crate::ray::{Ray, Viewport};
use crate::scene::{TileScene, EMPTY_SAMPLE_THRESHOLD};
use crate::walk::GridWalk;

/// Per-frame camera state. Plain old data so a frame's inputs can be
/// snapshotted or shipped as bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub inv_projection: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub position: [f32; 4],
    /// x, y, width, height in framebuffer pixels.
    pub viewport: [f32; 4],
    pub time: f32,
    pub _pad: [f32; 3],
}

impl CameraUniforms {
    pub fn new(view: &Mat4, projection: &Mat4, viewport: Viewport, time: f32) -> Self {
        let inv_view = view.inverse();
        let eye = inv_view.transform_point3(Vec3::ZERO);
        Self {
            inv_projection: projection.inverse().to_cols_array_2d(),
            inv_view: inv_view.to_cols_array_2d(),
            position: [eye.x, eye.y, eye.z, 1.0],
            viewport: [viewport.x, viewport.y, viewport.width, viewport.height],
            time,
            _pad: [0.0; 3],
        }
    }

    pub fn viewport(&self) -> Viewport {
        let [x, y, width, height] = self.viewport;
        Viewport {
            x,
            y,
            width,
            height,
        }
    }

    pub fn inv_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inv_projection)
    }

    pub fn inv_view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inv_view)
    }
}

/// RGBA8 pixel buffer, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, clear: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![clear; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32, clear: Rgba) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, clear);
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// What a traced ray resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceHit {
    Canopy,
    Trunk,
    GridLine,
    Ground,
    Background,
}

/// CPU ray caster for a tile scene.
///
/// Per pixel: reconstruct the camera ray, clip it to the tile box, walk the
/// voxel columns its ground projection crosses (bounded by
/// `max_sample_steps`), and return the first tree primitive it meets.
/// Rays that meet no tree fall back to the ground or grid-line colour, or
/// the background when they miss the tile entirely.
pub struct TileRenderer {
    config: RenderConfig,
    palette: Palette,
}

impl TileRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let palette = Palette::from_config(&config);
        Self { config, palette }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn color(&self, hit: TraceHit) -> Rgba {
        match hit {
            TraceHit::Canopy => self.palette.canopy,
            TraceHit::Trunk => self.palette.trunk,
            TraceHit::GridLine => self.palette.grid_line,
            TraceHit::Ground => self.palette.ground,
            TraceHit::Background => self.palette.background,
        }
    }

    /// Slot columns sampled along `ray`, nearest first, with the ray's entry
    /// and exit parameters on the tile box. None when the ray misses the tile.
    ///
    /// The projected segment is clipped to `max_sample_steps` in Manhattan
    /// length and the walk takes at most that many steps.
    pub fn sample_path(&self, scene: &TileScene, ray: &Ray) -> Option<(GridWalk, f32, f32)> {
        if scene.is_empty() {
            return None;
        }
        let (min, max) = scene.bounds();
        let (t_near, t_far) = ray_box(ray, min, max)?;
        let t_near = t_near.max(0.0);

        let near = scene.world_to_texel(ray.at(t_near));
        let mut far = scene.world_to_texel(ray.at(t_far));
        let span = far - near;
        let steps = self.config.max_sample_steps;
        let manhattan = span.x.abs() + span.y.abs();
        if manhattan > steps as f32 {
            far = near + span * (steps as f32 / manhattan);
        }

        let walk = GridWalk::bounded(scene.clamp_slot(near), scene.clamp_slot(far), steps);
        Some((walk, t_near, t_far))
    }

    /// Resolve one ray at normalized playback time `time`.
    pub fn trace(&self, scene: &TileScene, ray: &Ray, time: f32) -> TraceHit {
        let Some((walk, t_near, t_far)) = self.sample_path(scene, ray) else {
            return TraceHit::Background;
        };

        let w = scene.time_coordinate(time);
        let epsilon = self.config.intersection_epsilon;
        for slot in walk {
            let value = scene.value_at(slot, w);
            if value <= EMPTY_SAMPLE_THRESHOLD {
                continue;
            }
            let tree = scene.tree_at(slot, texel_to_ratio(value));
            if ray_sphere(ray, tree.canopy_center, tree.canopy_radius, epsilon).is_some() {
                return TraceHit::Canopy;
            }
            if ray_cylinder(
                ray,
                tree.trunk_base,
                tree.trunk_height,
                tree.trunk_radius,
                epsilon,
            )
            .is_some()
            {
                return TraceHit::Trunk;
            }
        }

        self.fallback(scene, ray, t_near, t_far)
    }

    fn fallback(&self, scene: &TileScene, ray: &Ray, t_near: f32, t_far: f32) -> TraceHit {
        if ray.direction.y >= 0.0 {
            return TraceHit::Ground;
        }
        let t_ground = -ray.origin.y / ray.direction.y;
        if t_ground < t_near || t_ground > t_far + self.config.intersection_epsilon {
            return TraceHit::Ground;
        }
        let texel = scene.world_to_texel(ray.at(t_ground));
        if scene.on_grid_line(texel, self.config.grid_line_width) {
            TraceHit::GridLine
        } else {
            TraceHit::Ground
        }
    }

    /// Colour one pixel given the frame's camera state.
    pub fn shade_pixel(&self, scene: &TileScene, uniforms: &CameraUniforms, pixel: Vec2) -> Rgba {
        let ray = Ray::through_pixel(
            pixel,
            &uniforms.viewport(),
            &uniforms.inv_projection(),
            &uniforms.inv_view(),
        );
        self.color(self.trace(scene, &ray, uniforms.time))
    }

    /// Render every framebuffer pixel inside the uniforms' viewport.
    /// Pixels outside it are left untouched.
    pub fn render(&self, scene: &TileScene, uniforms: &CameraUniforms, target: &mut Framebuffer) {
        let viewport = uniforms.viewport();
        let width = target.width as usize;
        if width == 0 || viewport.is_empty() {
            return;
        }
        let inv_projection = uniforms.inv_projection();
        let inv_view = uniforms.inv_view();

        target
            .pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if !viewport.contains(pixel) {
                        continue;
                    }
                    let ray = Ray::through_pixel(pixel, &viewport, &inv_projection, &inv_view);
                    *px = self.color(self.trace(scene, &ray, uniforms.time));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniforms_layout() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 176);
        assert_eq!(std::mem::size_of::<CameraUniforms>() % 16, 0);
    }

    #[test]
    fn test_camera_uniforms_roundtrip_matrices() {
        let view = Mat4::look_at_rh(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 2.0, 0.5, 100.0);
        let viewport = Viewport::full(64, 32);
        let u = CameraUniforms::new(&view, &proj, viewport, 0.25);
        assert!((u.inv_view() * view).abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert!((u.inv_projection() * proj).abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert_eq!(u.viewport(), viewport);
        let eye = Vec3::from_slice(&u.position[..3]);
        assert!((eye - Vec3::new(3.0, 4.0, 5.0)).length() < 1e-3);
        assert_eq!(bytemuck::bytes_of(&u).len(), 176);
    }

    #[test]
    fn test_framebuffer_bytes_and_resize() {
        let mut fb = Framebuffer::new(2, 1, [1, 2, 3, 4]);
        assert_eq!(fb.as_bytes(), &[1, 2, 3, 4, 1, 2, 3, 4]);
        fb.resize(1, 3, [9, 9, 9, 255]);
        assert_eq!(fb.pixels().len(), 3);
        assert_eq!(fb.pixel(0, 2), Some([9, 9, 9, 255]));
        assert_eq!(fb.pixel(1, 0), None);
    }

    #[test]
    fn test_hit_colours_follow_palette() {
        let renderer = TileRenderer::new(RenderConfig::default());
        assert_eq!(renderer.color(TraceHit::Background), [0xdd, 0xdd, 0xdd, 0xff]);
        assert_eq!(renderer.color(TraceHit::Canopy), renderer.palette().canopy);
    }
}
