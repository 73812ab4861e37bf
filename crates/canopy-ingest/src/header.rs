use canopy_core::TreeRecord;

use crate::error::IngestError;

/// Required columns, in the order `ColumnMap::indices` stores them.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Year", "Cell", "SLA", "Wooddens", "Longevity", "Height"];

const YEAR: usize = 0;
const CELL: usize = 1;
const SLA: usize = 2;
const WOODDENS: usize = 3;
const LONGEVITY: usize = 4;
const HEIGHT: usize = 5;

/// Field positions of the required columns, resolved by name from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; REQUIRED_COLUMNS.len()],
    field_count: usize,
}

impl ColumnMap {
    /// Resolve required columns from a header line. Column order is free;
    /// extra columns are ignored.
    pub fn from_header(line: &str) -> Result<Self, IngestError> {
        let names: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, &required) in REQUIRED_COLUMNS.iter().enumerate() {
            indices[slot] = names
                .iter()
                .position(|&name| name == required)
                .ok_or(IngestError::MissingColumn(required))?;
        }
        Ok(Self {
            indices,
            field_count: names.len(),
        })
    }

    /// Number of fields in the header. Rows with fewer fields are dropped.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Parse one data row. Returns None for short rows and for any
    /// required field that is not a valid number.
    pub fn parse_record(&self, line: &str) -> Option<TreeRecord> {
        let mut fields = [""; REQUIRED_COLUMNS.len()];
        let mut seen = 0usize;
        for (i, field) in line.split(',').enumerate() {
            seen = i + 1;
            for (slot, &index) in self.indices.iter().enumerate() {
                if index == i {
                    fields[slot] = field;
                }
            }
        }
        if seen < self.field_count {
            return None;
        }

        Some(TreeRecord {
            year: fields[YEAR].trim().parse().ok()?,
            cell: fields[CELL].trim().parse().ok()?,
            sla: parse_finite(fields[SLA])?,
            wood_density: parse_finite(fields[WOODDENS])?,
            longevity: parse_finite(fields[LONGEVITY])?,
            height: parse_finite(fields[HEIGHT])?,
        })
    }
}

fn parse_finite(field: &str) -> Option<f32> {
    field.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}
