use glam::UVec3;

use crate::constants::EMPTY_TEXEL;

/// One parsed input row: a single tree in a single cell in a single year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeRecord {
    pub year: i32,
    pub cell: u32,
    pub sla: f32,
    pub wood_density: f32,
    /// Only used for identity hashing.
    pub longevity: f32,
    pub height: f32,
}

/// Corpus-wide bounds, computed once after the last record is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CorpusStatistics {
    pub record_count: usize,
    pub first_year: i32,
    pub last_year: i32,
    /// `last_year - first_year`.
    pub year_count: u32,
    /// Largest cell index seen, plus one.
    pub cell_count: u32,
    pub height_max: f32,
    /// Most records sharing one (year, cell). Diagnostic only.
    pub max_trees_per_cell: u32,
}

impl CorpusStatistics {
    /// Number of year layers in the tile texture (inclusive year span).
    /// None when the span does not fit in a `u32`.
    pub fn year_layers(&self) -> Option<u32> {
        if self.record_count == 0 {
            Some(0)
        } else {
            self.year_count.checked_add(1)
        }
    }
}

/// Square tile layout derived from the corpus cell count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    pub cell_rows_per_tile: u32,
    pub tree_rows_per_cell: u32,
}

impl TileGeometry {
    /// Largest square grid of cells that fits `cell_count`.
    /// Cells beyond `cells_per_tile()` are truncated away.
    pub fn from_cell_count(cell_count: u32, tree_rows_per_cell: u32) -> Self {
        Self {
            cell_rows_per_tile: crate::math::integer_sqrt(cell_count),
            tree_rows_per_cell,
        }
    }

    /// Shrink to at most `max_cell_rows` cell rows.
    pub fn capped(self, max_cell_rows: u32) -> Self {
        Self {
            cell_rows_per_tile: self.cell_rows_per_tile.min(max_cell_rows),
            ..self
        }
    }

    pub fn cells_per_tile(&self) -> u32 {
        self.cell_rows_per_tile * self.cell_rows_per_tile
    }

    pub fn trees_per_cell(&self) -> u32 {
        self.tree_rows_per_cell * self.tree_rows_per_cell
    }

    pub fn tree_rows_per_tile(&self) -> u32 {
        self.cell_rows_per_tile * self.tree_rows_per_cell
    }

    pub fn contains_cell(&self, cell: u32) -> bool {
        cell < self.cells_per_tile()
    }
}

/// Dense (x, y, year) field of quantized trait values, one byte per voxel.
///
/// Layout is x-fastest: `index = (width * height * z) + (width * y) + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTexture {
    width: u32,
    height: u32,
    depth: u32,
    data: Vec<u8>,
}

impl TileTexture {
    /// Allocate a texture with every voxel empty.
    pub fn zeroed(width: u32, height: u32, depth: u32) -> Self {
        let len = width as usize * height as usize * depth as usize;
        Self {
            width,
            height,
            depth,
            data: vec![EMPTY_TEXEL; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn dimensions(&self) -> UVec3 {
        UVec3::new(self.width, self.height, self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw voxel bytes, x-fastest.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the texture and hand over its byte buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn index(&self, voxel: UVec3) -> Option<usize> {
        if voxel.x >= self.width || voxel.y >= self.height || voxel.z >= self.depth {
            return None;
        }
        let w = self.width as usize;
        let h = self.height as usize;
        Some(w * h * voxel.z as usize + w * voxel.y as usize + voxel.x as usize)
    }

    /// Read a voxel. Out-of-range coordinates read as empty.
    pub fn texel(&self, voxel: UVec3) -> u8 {
        self.index(voxel).map_or(EMPTY_TEXEL, |i| self.data[i])
    }

    /// Write a voxel. Returns false (and writes nothing) when out of range.
    pub fn write(&mut self, voxel: UVec3, value: u8) -> bool {
        match self.index(voxel) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }
}

/// Finished tile handed from the loader to the renderer. The texture moves
/// with it; nothing else about the corpus survives loading.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLoad {
    pub cell_rows_per_tile: u32,
    pub tree_rows_per_cell: u32,
    pub tree_rows_per_tile: u32,
    pub first_year: i32,
    pub last_year: i32,
    pub year_count: u32,
    pub texture: TileTexture,
}

impl TileLoad {
    pub fn geometry(&self) -> TileGeometry {
        TileGeometry {
            cell_rows_per_tile: self.cell_rows_per_tile,
            tree_rows_per_cell: self.tree_rows_per_cell,
        }
    }
}
