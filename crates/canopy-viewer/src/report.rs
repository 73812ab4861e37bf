use std::path::Path;

use canopy_core::TileLoad;
use serde::{Deserialize, Serialize};

/// Summary of the installed tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    pub source: String,
    pub first_year: i32,
    pub last_year: i32,
    pub year_count: u32,
    pub cell_rows_per_tile: u32,
    pub tree_rows_per_tile: u32,
    pub texture_bytes: usize,
    pub occupied_voxels: usize,
}

impl TileSummary {
    pub fn from_tile(source: &str, tile: &TileLoad) -> Self {
        let bytes = tile.texture.as_bytes();
        Self {
            source: source.to_string(),
            first_year: tile.first_year,
            last_year: tile.last_year,
            year_count: tile.year_count,
            cell_rows_per_tile: tile.cell_rows_per_tile,
            tree_rows_per_tile: tile.tree_rows_per_tile,
            texture_bytes: bytes.len(),
            occupied_voxels: bytes.iter().filter(|&&b| b != 0).count(),
        }
    }
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: u32,
    pub time: f32,
    pub year: f32,
    pub render_ms: f64,
}

/// Timing statistics over all rendered frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl TimingSeries {
    pub fn from_samples(times: &[f64]) -> Self {
        if times.is_empty() {
            return Self::default();
        }
        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let p95_idx = ((n as f64) * 0.95).ceil() as usize;

        Self {
            mean_ms: mean,
            median_ms: median,
            p95_ms: sorted[p95_idx.min(n - 1)],
            min_ms: sorted[0],
            max_ms: sorted[n - 1],
        }
    }
}

/// Everything a viewer run produced, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub tile: TileSummary,
    pub width: u32,
    pub height: u32,
    pub frames: Vec<FrameRecord>,
    pub timings: TimingSeries,
}

pub fn save_report(path: &Path, report: &RunReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Markdown summary of a run.
pub fn format_markdown(report: &RunReport) -> String {
    let tile = &report.tile;
    let mut out = String::new();
    out.push_str(&format!(
        "Tile `{}`: years {}..={}, {}x{} slots, {} occupied voxels ({} bytes)\n\n",
        tile.source,
        tile.first_year,
        tile.last_year,
        tile.tree_rows_per_tile,
        tile.tree_rows_per_tile,
        tile.occupied_voxels,
        tile.texture_bytes
    ));
    out.push_str("| Frames | Size | Mean (ms) | Median (ms) | P95 (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("|--------|------|-----------|-------------|----------|----------|----------|\n");
    let t = &report.timings;
    out.push_str(&format!(
        "| {} | {}x{} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
        report.frames.len(),
        report.width,
        report.height,
        t.mean_ms,
        t.median_ms,
        t.p95_ms,
        t.min_ms,
        t.max_ms,
    ));
    out
}
