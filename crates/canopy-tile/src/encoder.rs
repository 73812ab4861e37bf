use canopy_core::math::{quantize_height, shuffle_slot, slot_to_tile_xy};
use canopy_core::{CorpusStatistics, TileConfig, TileGeometry, TileLoad, TileTexture, TreeRecord};
use canopy_ingest::IngestError;
use glam::UVec3;

use crate::identity::tree_identity;
use crate::slot_map::SlotMap;

/// What happened to one record during encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    Written { voxel: UVec3, value: u8 },
    /// Cell index beyond the largest square tile or the row cap; dropped.
    OutsideTile,
    /// Every slot in the cell belongs to another tree; dropped.
    SlotsExhausted,
}

/// Aggregate encoding diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeReport {
    pub written: usize,
    pub outside_tile: usize,
    pub slots_exhausted: usize,
}

/// Single-pass writer of the tile texture.
///
/// Owns the slot map for the duration of the pass; `finish()` drops it and
/// returns only the texture.
pub struct TileEncoder {
    geometry: TileGeometry,
    statistics: CorpusStatistics,
    shuffle_multiplier: u32,
    slots: SlotMap,
    texture: TileTexture,
    report: EncodeReport,
}

impl TileEncoder {
    /// Size the tile for `statistics`.
    ///
    /// The cell grid is capped at `config.max_cell_rows_per_tile` rows; records
    /// in cells past the cap are dropped as `OutsideTile`. A year span longer
    /// than `config.max_year_layers` is rejected.
    pub fn new(statistics: &CorpusStatistics, config: &TileConfig) -> Result<Self, IngestError> {
        let layers = statistics
            .year_layers()
            .filter(|&layers| layers <= config.max_year_layers)
            .ok_or(IngestError::YearSpanTooLarge {
                first_year: statistics.first_year,
                last_year: statistics.last_year,
                max_layers: config.max_year_layers,
            })?;

        let full = TileGeometry::from_cell_count(statistics.cell_count, config.tree_rows_per_cell);
        let geometry = full.capped(config.max_cell_rows_per_tile);
        if geometry != full {
            log::warn!(
                "Tile capped at {}x{} cells ({} cell rows requested)",
                geometry.cell_rows_per_tile,
                geometry.cell_rows_per_tile,
                full.cell_rows_per_tile
            );
        }

        let rows = geometry.tree_rows_per_tile();
        let texture = TileTexture::zeroed(rows, rows, layers);
        log::info!(
            "Tile texture size: {}kb ({}x{}x{})",
            texture.as_bytes().len() as f32 / 1024.0,
            rows,
            rows,
            texture.depth()
        );

        Ok(Self {
            geometry,
            statistics: *statistics,
            shuffle_multiplier: config.slot_shuffle_multiplier,
            slots: SlotMap::new(geometry.cells_per_tile(), geometry.trees_per_cell()),
            texture,
            report: EncodeReport::default(),
        })
    }

    pub fn geometry(&self) -> TileGeometry {
        self.geometry
    }

    pub fn report(&self) -> EncodeReport {
        self.report
    }

    /// Voxel a tree occupies in a given year, claiming its slot if new.
    fn place(&mut self, record: &TreeRecord) -> Result<UVec3, EncodeOutcome> {
        if !self.geometry.contains_cell(record.cell) {
            return Err(EncodeOutcome::OutsideTile);
        }
        let slot = self
            .slots
            .resolve(record.cell, tree_identity(record))
            .ok_or(EncodeOutcome::SlotsExhausted)?;

        let shuffled = shuffle_slot(
            record.cell,
            slot,
            self.shuffle_multiplier,
            self.geometry.trees_per_cell(),
        );
        let xy = slot_to_tile_xy(&self.geometry, record.cell, shuffled);
        let z = record.year.abs_diff(self.statistics.first_year);
        Ok(xy.extend(z))
    }

    /// Encode one record into the texture.
    pub fn encode(&mut self, record: &TreeRecord) -> EncodeOutcome {
        let outcome = match self.place(record) {
            Ok(voxel) => {
                let value = quantize_height(record.height, self.statistics.height_max);
                if self.texture.write(voxel, value) {
                    EncodeOutcome::Written { voxel, value }
                } else {
                    EncodeOutcome::OutsideTile
                }
            }
            Err(outcome) => outcome,
        };

        match outcome {
            EncodeOutcome::Written { .. } => self.report.written += 1,
            EncodeOutcome::OutsideTile => self.report.outside_tile += 1,
            EncodeOutcome::SlotsExhausted => self.report.slots_exhausted += 1,
        }
        outcome
    }

    /// End the pass. The slot map is discarded here.
    pub fn finish(self) -> (TileLoad, EncodeReport) {
        let report = self.report;
        log::info!(
            "Encoded {} records ({} outside tile, {} slot-exhausted); {} slots claimed",
            report.written,
            report.outside_tile,
            report.slots_exhausted,
            self.slots.claimed()
        );
        if report.slots_exhausted > 0 {
            log::warn!(
                "{} records dropped: cells exceeded {} tree slots",
                report.slots_exhausted,
                self.slots.trees_per_cell()
            );
        }

        let tile = TileLoad {
            cell_rows_per_tile: self.geometry.cell_rows_per_tile,
            tree_rows_per_cell: self.geometry.tree_rows_per_cell,
            tree_rows_per_tile: self.geometry.tree_rows_per_tile(),
            first_year: self.statistics.first_year,
            last_year: self.statistics.last_year,
            year_count: self.statistics.year_count,
            texture: self.texture,
        };
        (tile, report)
    }
}

/// Encode a full record set in one pass.
pub fn encode_records(
    records: &[TreeRecord],
    statistics: &CorpusStatistics,
    config: &TileConfig,
) -> Result<(TileLoad, EncodeReport), IngestError> {
    let mut encoder = TileEncoder::new(statistics, config)?;
    for record in records {
        encoder.encode(record);
    }
    Ok(encoder.finish())
}
