use std::collections::HashMap;

use canopy_core::{CorpusStatistics, TreeRecord};

/// Running corpus bounds. Only `finish()` yields statistics, since every
/// field depends on the complete record set.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    record_count: usize,
    first_year: Option<i32>,
    last_year: Option<i32>,
    cell_count: u32,
    height_max: f32,
    trees_per_cell_year: HashMap<(i32, u32), u32>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &TreeRecord) {
        self.record_count += 1;
        self.first_year = Some(self.first_year.map_or(record.year, |y| y.min(record.year)));
        self.last_year = Some(self.last_year.map_or(record.year, |y| y.max(record.year)));
        self.cell_count = self.cell_count.max(record.cell.saturating_add(1));
        self.height_max = self.height_max.max(record.height);
        *self
            .trees_per_cell_year
            .entry((record.year, record.cell))
            .or_insert(0) += 1;
    }

    pub fn finish(self) -> CorpusStatistics {
        let first_year = self.first_year.unwrap_or(0);
        let last_year = self.last_year.unwrap_or(0);
        let max_trees_per_cell = self.trees_per_cell_year.values().copied().max().unwrap_or(0);
        CorpusStatistics {
            record_count: self.record_count,
            first_year,
            last_year,
            year_count: last_year.abs_diff(first_year),
            cell_count: self.cell_count,
            height_max: self.height_max,
            max_trees_per_cell,
        }
    }
}
