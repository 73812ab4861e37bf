//! Single source of truth for shared tuning constants.
//! Every value here is also the default of a field in `ViewerConfig`, so a
//! config file can override it without touching code.

/// Side length of a cell's slot sub-grid in texels.
pub const TREE_ROWS_PER_CELL: u32 = 6;

/// Tree slots per cell (6 × 6).
pub const TREES_PER_CELL: u32 = TREE_ROWS_PER_CELL * TREE_ROWS_PER_CELL;

/// Multiplier of the slot shuffle `(cell + slot) * m mod TREES_PER_CELL`.
/// 833 ≡ 5 (mod 36), coprime with 36, so the shuffle is a permutation.
pub const SLOT_SHUFFLE_MULTIPLIER: u32 = 833;

/// Upper bound on cell rows in one tile. Cells past the capped square are
/// dropped as outside the tile.
pub const MAX_CELL_ROWS_PER_TILE: u32 = 64;

/// Upper bound on year layers in one tile; longer spans fail the load.
pub const MAX_YEAR_LAYERS: u32 = 1024;

/// Largest quantized trait value stored in a texel.
pub const TEXEL_MAX: u8 = 255;

/// Texel value meaning "no tree in this slot this year".
pub const EMPTY_TEXEL: u8 = 0;

/// Maximum number of voxel steps the renderer walks per pixel.
pub const MAX_SAMPLE_STEPS: u32 = 20;

/// Edge length of the tile in world units.
pub const DEFAULT_TILE_WORLD_SIZE: f32 = 10_000.0;

/// World height of a tree whose trait ratio is 1.0.
pub const DEFAULT_TREE_HEIGHT_SCALE: f32 = 1_500.0;

/// Trunk cylinder radius as a fraction of the canopy sphere radius.
pub const TRUNK_RADIUS_RATIO: f32 = 0.25;

/// Ray parameters below this are discarded to avoid tangency artifacts.
pub const INTERSECTION_EPSILON: f32 = 1e-4;

/// Width of the cell boundary highlight, as a fraction of one slot.
pub const GRID_LINE_WIDTH: f32 = 0.06;

/// Seconds for one full sweep of the time axis during playback.
pub const DEFAULT_PLAYBACK_PERIOD_SECS: f32 = 5.0;

/// Records between two progress notifications from the loader.
pub const PROGRESS_REPORT_INTERVAL: usize = 10_000;

/// Bytes pulled from a source per read.
pub const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Flat scene colors (RGB, 0..=255).
pub const BACKGROUND_COLOR: [u8; 3] = [0xdd, 0xdd, 0xdd];
pub const GROUND_COLOR: [u8; 3] = [0x2a, 0x33, 0x2a];
pub const GRID_LINE_COLOR: [u8; 3] = [0x55, 0x66, 0x55];
pub const CANOPY_COLOR: [u8; 3] = [0x2e, 0x8b, 0x3a];
pub const TRUNK_COLOR: [u8; 3] = [0x6b, 0x4a, 0x2b];
