use serde::Deserialize;

use crate::constants::*;
use crate::error::CoreError;
use crate::math::gcd;

/// Tile encoding parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub tree_rows_per_cell: u32,
    pub slot_shuffle_multiplier: u32,
    pub max_cell_rows_per_tile: u32,
    pub max_year_layers: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tree_rows_per_cell: TREE_ROWS_PER_CELL,
            slot_shuffle_multiplier: SLOT_SHUFFLE_MULTIPLIER,
            max_cell_rows_per_tile: MAX_CELL_ROWS_PER_TILE,
            max_year_layers: MAX_YEAR_LAYERS,
        }
    }
}

impl TileConfig {
    pub fn trees_per_cell(&self) -> u32 {
        self.tree_rows_per_cell * self.tree_rows_per_cell
    }
}

/// Tile renderer parameters: sample budget, world layout and flat colors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_sample_steps: u32,
    pub tile_world_size: f32,
    pub tree_height_scale: f32,
    pub trunk_radius_ratio: f32,
    pub intersection_epsilon: f32,
    pub grid_line_width: f32,
    pub background: [u8; 3],
    pub ground: [u8; 3],
    pub grid_line: [u8; 3],
    pub canopy: [u8; 3],
    pub trunk: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_sample_steps: MAX_SAMPLE_STEPS,
            tile_world_size: DEFAULT_TILE_WORLD_SIZE,
            tree_height_scale: DEFAULT_TREE_HEIGHT_SCALE,
            trunk_radius_ratio: TRUNK_RADIUS_RATIO,
            intersection_epsilon: INTERSECTION_EPSILON,
            grid_line_width: GRID_LINE_WIDTH,
            background: BACKGROUND_COLOR,
            ground: GROUND_COLOR,
            grid_line: GRID_LINE_COLOR,
            canopy: CANOPY_COLOR,
            trunk: TRUNK_COLOR,
        }
    }
}

/// Playback parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub period_secs: f32,
    pub start_playing: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PLAYBACK_PERIOD_SECS,
            start_playing: true,
        }
    }
}

/// Top-level configuration. Every field is optional in the RON source;
/// missing fields fall back to the constants in `constants.rs`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub tile: TileConfig,
    pub render: RenderConfig,
    pub playback: PlaybackConfig,
}

impl ViewerConfig {
    /// Parse and validate a RON config string.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, CoreError> {
        let options = ron::Options::default();
        let config: ViewerConfig = options
            .from_str(ron_str)
            .map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        log::debug!("Loaded config: {config:?}");
        Ok(config)
    }

    /// Reject values the encoder or renderer cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let tile = &self.tile;
        if tile.tree_rows_per_cell == 0 || tile.tree_rows_per_cell > 255 {
            return Err(CoreError::InvalidConfig(format!(
                "tree_rows_per_cell must be in 1..=255, got {}",
                tile.tree_rows_per_cell
            )));
        }
        let slots = tile.trees_per_cell();
        if gcd(tile.slot_shuffle_multiplier, slots) != 1 {
            return Err(CoreError::InvalidConfig(format!(
                "slot_shuffle_multiplier {} is not coprime with {} slots per cell",
                tile.slot_shuffle_multiplier, slots
            )));
        }
        if tile.max_cell_rows_per_tile == 0 || tile.max_cell_rows_per_tile > 1024 {
            return Err(CoreError::InvalidConfig(format!(
                "max_cell_rows_per_tile must be in 1..=1024, got {}",
                tile.max_cell_rows_per_tile
            )));
        }
        if tile.max_year_layers == 0 {
            return Err(CoreError::InvalidConfig(
                "max_year_layers must be at least 1".to_string(),
            ));
        }

        let render = &self.render;
        if render.max_sample_steps == 0 {
            return Err(CoreError::InvalidConfig(
                "max_sample_steps must be at least 1".to_string(),
            ));
        }
        let positive = [
            ("tile_world_size", render.tile_world_size),
            ("tree_height_scale", render.tree_height_scale),
            ("intersection_epsilon", render.intersection_epsilon),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&render.trunk_radius_ratio) {
            return Err(CoreError::InvalidConfig(format!(
                "trunk_radius_ratio must be in [0, 1], got {}",
                render.trunk_radius_ratio
            )));
        }
        if !(0.0..0.5).contains(&render.grid_line_width) {
            return Err(CoreError::InvalidConfig(format!(
                "grid_line_width must be in [0, 0.5), got {}",
                render.grid_line_width
            )));
        }

        if !self.playback.period_secs.is_finite() || self.playback.period_secs <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "period_secs must be positive, got {}",
                self.playback.period_secs
            )));
        }
        Ok(())
    }
}
