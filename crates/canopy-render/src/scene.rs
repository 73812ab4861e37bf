//! World placement of a loaded tile.
//!
//! The tile lies on the XZ plane centred at the origin, Y up. Texture x maps
//! to world X, texture y to world Z, and one texel is one tree slot.
//! The bounding box spans the ground (y = 0) up to the tallest possible tree.

use canopy_core::{RenderConfig, TileGeometry, TileLoad};
use glam::{IVec2, Vec2, Vec3};

use crate::sampler::TileSampler;

/// Interpolated samples at or below this read as an empty slot.
pub const EMPTY_SAMPLE_THRESHOLD: f32 = 0.5;

/// Analytic shapes of one tree: a canopy sphere on a trunk cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreePrimitives {
    pub canopy_center: Vec3,
    pub canopy_radius: f32,
    pub trunk_base: Vec3,
    pub trunk_height: f32,
    pub trunk_radius: f32,
}

#[derive(Debug, Clone)]
pub struct TileScene {
    sampler: TileSampler,
    geometry: TileGeometry,
    tree_rows: u32,
    first_year: i32,
    year_count: u32,
    year_layers: u32,
    slot_size: f32,
    height_scale: f32,
    trunk_radius_ratio: f32,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl TileScene {
    pub fn new(tile: TileLoad, config: &RenderConfig) -> Self {
        let tree_rows = tile.tree_rows_per_tile;
        let half = config.tile_world_size * 0.5;
        let slot_size = if tree_rows > 0 {
            config.tile_world_size / tree_rows as f32
        } else {
            config.tile_world_size
        };
        let top = config.tree_height_scale.max(slot_size * 0.5);

        log::debug!(
            "Tile scene: {tree_rows}x{tree_rows} slots of {slot_size:.1} units, years {}..={}",
            tile.first_year,
            tile.last_year
        );

        Self {
            geometry: tile.geometry(),
            tree_rows,
            first_year: tile.first_year,
            year_count: tile.year_count,
            year_layers: tile.texture.depth(),
            slot_size,
            height_scale: config.tree_height_scale,
            trunk_radius_ratio: config.trunk_radius_ratio,
            bounds_min: Vec3::new(-half, 0.0, -half),
            bounds_max: Vec3::new(half, top, half),
            sampler: TileSampler::new(tile.texture),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree_rows == 0 || self.sampler.texture().is_empty()
    }

    pub fn geometry(&self) -> TileGeometry {
        self.geometry
    }

    pub fn tree_rows(&self) -> u32 {
        self.tree_rows
    }

    pub fn slot_size(&self) -> f32 {
        self.slot_size
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn sampler(&self) -> &TileSampler {
        &self.sampler
    }

    /// Continuous texel coordinates of a world point projected onto the ground.
    pub fn world_to_texel(&self, p: Vec3) -> Vec2 {
        Vec2::new(p.x - self.bounds_min.x, p.z - self.bounds_min.z) / self.slot_size
    }

    /// Ground-level world centre of a slot.
    pub fn slot_center(&self, slot: IVec2) -> Vec3 {
        let c = (slot.as_vec2() + Vec2::splat(0.5)) * self.slot_size;
        Vec3::new(self.bounds_min.x + c.x, 0.0, self.bounds_min.z + c.y)
    }

    /// Grid cell containing a texel position, clamped into the tile.
    pub fn clamp_slot(&self, texel: Vec2) -> IVec2 {
        let max = self.tree_rows.saturating_sub(1) as i32;
        texel.floor().as_ivec2().clamp(IVec2::ZERO, IVec2::splat(max))
    }

    /// Texture depth coordinate for normalized playback time `t` in [0, 1].
    ///
    /// `t = 0` lands on the first year's layer centre and `t = 1` on the last.
    pub fn time_coordinate(&self, t: f32) -> f32 {
        if self.year_layers == 0 {
            return 0.0;
        }
        let t = t.clamp(0.0, 1.0);
        (t * self.year_count as f32 + 0.5) / self.year_layers as f32
    }

    /// Fractional calendar year shown at playback time `t`.
    pub fn year_at(&self, t: f32) -> f32 {
        self.first_year as f32 + t.clamp(0.0, 1.0) * self.year_count as f32
    }

    /// Filtered texel value of a slot at depth coordinate `w`.
    pub fn value_at(&self, slot: IVec2, w: f32) -> f32 {
        let rows = self.tree_rows as f32;
        let uv = (slot.as_vec2() + Vec2::splat(0.5)) / rows;
        self.sampler.sample(uv.extend(w))
    }

    /// Sphere-on-cylinder shapes for a tree of height ratio `ratio` in a slot.
    pub fn tree_at(&self, slot: IVec2, ratio: f32) -> TreePrimitives {
        let ground = self.slot_center(slot);
        let canopy_radius = ratio * self.slot_size * 0.5;
        let top = ratio * self.height_scale;
        let center_y = (top - canopy_radius).max(0.0);
        TreePrimitives {
            canopy_center: ground + Vec3::Y * center_y,
            canopy_radius,
            trunk_base: ground,
            trunk_height: center_y,
            trunk_radius: canopy_radius * self.trunk_radius_ratio,
        }
    }

    /// Whether a ground texel position lies on a cell boundary line.
    /// `width` is measured in slots.
    pub fn on_grid_line(&self, texel: Vec2, width: f32) -> bool {
        let rows = self.geometry.tree_rows_per_cell.max(1) as f32;
        let within = |v: f32| {
            let r = v.rem_euclid(rows);
            r.min(rows - r) < width
        };
        within(texel.x) || within(texel.y)
    }
}
