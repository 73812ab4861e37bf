use crate::constants::TEXEL_MAX;
use crate::types::TileGeometry;
use glam::UVec2;

/// Quantize a height into a texel: `round(255 * height / height_max)`,
/// clamped to [0, 255]. A non-positive `height_max` quantizes to 0.
pub fn quantize_height(height: f32, height_max: f32) -> u8 {
    if height_max.is_nan() || height_max <= 0.0 || !height.is_finite() {
        return 0;
    }
    let ratio = height / height_max;
    (ratio * TEXEL_MAX as f32).round().clamp(0.0, TEXEL_MAX as f32) as u8
}

/// Convert a texel (or an interpolated texel) back to a ratio in [0, 1].
pub fn texel_to_ratio(texel: f32) -> f32 {
    (texel / TEXEL_MAX as f32).clamp(0.0, 1.0)
}

/// Remap a linear slot index to a shuffled slot index within the cell.
/// Reproducible from (cell, slot) alone.
pub fn shuffle_slot(cell: u32, slot: u32, multiplier: u32, trees_per_cell: u32) -> u32 {
    let n = trees_per_cell as u64;
    ((cell as u64 + slot as u64) * multiplier as u64 % n) as u32
}

/// Texel (x, y) of a shuffled slot in the tile's tree grid.
pub fn slot_to_tile_xy(geometry: &TileGeometry, cell: u32, shuffled_slot: u32) -> UVec2 {
    let rows = geometry.tree_rows_per_cell;
    let cell_rows = geometry.cell_rows_per_tile;
    UVec2::new(
        rows * (cell % cell_rows) + shuffled_slot % rows,
        rows * (cell / cell_rows) + shuffled_slot / rows,
    )
}

/// floor(sqrt(n)) without float rounding surprises at perfect squares.
pub fn integer_sqrt(n: u32) -> u32 {
    let mut r = (n as f64).sqrt() as u64;
    let n = n as u64;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r as u32
}

pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
