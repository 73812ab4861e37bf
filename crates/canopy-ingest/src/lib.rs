pub mod error;
pub mod header;
pub mod parser;
pub mod source;
pub mod stats;

pub use error::IngestError;
pub use header::ColumnMap;
pub use parser::{parse_str, IngestReport, ParsedCorpus, RecordParser};
pub use source::{SourceReader, TileSource};
pub use stats::StatsAccumulator;
