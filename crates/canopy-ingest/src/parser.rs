use canopy_core::{CorpusStatistics, TreeRecord};

use crate::error::IngestError;
use crate::header::ColumnMap;
use crate::stats::StatsAccumulator;

/// Row accounting for one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    pub rows_accepted: usize,
    /// Short rows, unparsable numbers and invalid UTF-8.
    pub rows_dropped: usize,
}

impl IngestReport {
    /// Data rows seen, excluding the header and blank lines.
    pub fn rows_seen(&self) -> usize {
        self.rows_accepted + self.rows_dropped
    }
}

/// Output of a finished parse.
#[derive(Debug, Clone)]
pub struct ParsedCorpus {
    pub records: Vec<TreeRecord>,
    pub statistics: CorpusStatistics,
    pub report: IngestReport,
}

/// Incremental delimited-text parser.
///
/// Bytes may arrive in arbitrary chunks; a line split across chunks is held
/// in `pending` until its newline arrives, so the output does not depend on
/// where chunk boundaries fall.
#[derive(Debug, Default)]
pub struct RecordParser {
    columns: Option<ColumnMap>,
    pending: Vec<u8>,
    records: Vec<TreeRecord>,
    stats: StatsAccumulator,
    report: IngestReport,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records accepted so far.
    pub fn records_parsed(&self) -> usize {
        self.records.len()
    }

    /// Consume one chunk of input.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Ok(());
        };

        let mut complete = std::mem::take(&mut self.pending);
        self.pending = complete.split_off(last_newline + 1);
        for line in complete[..last_newline].split(|&b| b == b'\n') {
            self.process_line(line)?;
        }
        Ok(())
    }

    /// Flush the trailing unterminated line and finalize statistics.
    pub fn finish(mut self) -> Result<ParsedCorpus, IngestError> {
        let tail = std::mem::take(&mut self.pending);
        self.process_line(&tail)?;

        if self.columns.is_none() {
            return Err(IngestError::MissingHeader);
        }

        let statistics = self.stats.finish();
        log::info!(
            "Parsed {} records ({} dropped): years {}..={}, {} cells, height max {}",
            self.report.rows_accepted,
            self.report.rows_dropped,
            statistics.first_year,
            statistics.last_year,
            statistics.cell_count,
            statistics.height_max,
        );
        log::info!(
            "Max number of trees per cell: {}",
            statistics.max_trees_per_cell
        );

        Ok(ParsedCorpus {
            records: self.records,
            statistics,
            report: self.report,
        })
    }

    fn process_line(&mut self, raw: &[u8]) -> Result<(), IngestError> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) {
            // The source emits a blank line whenever the year increments.
            return Ok(());
        }

        if self.columns.is_none() {
            let header = std::str::from_utf8(raw).map_err(|_| IngestError::InvalidHeader)?;
            let columns = ColumnMap::from_header(header)?;
            log::debug!("Header columns: {columns:?}");
            self.columns = Some(columns);
            return Ok(());
        }

        let record = std::str::from_utf8(raw).ok().and_then(|line| {
            self.columns
                .as_ref()
                .and_then(|columns| columns.parse_record(line))
        });
        match record {
            Some(record) => {
                self.stats.observe(&record);
                self.records.push(record);
                self.report.rows_accepted += 1;
            }
            None => self.report.rows_dropped += 1,
        }
        Ok(())
    }
}

/// Parse a complete in-memory text in one call.
pub fn parse_str(text: &str) -> Result<ParsedCorpus, IngestError> {
    let mut parser = RecordParser::new();
    parser.feed(text.as_bytes())?;
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
        2000,0,1.0,1.0,1.0,10\n\
        2000,1,1.0,1.0,1.0,20\n\
        \n\
        2001,0,1.0,1.0,1.0,10\n";

    #[test]
    fn test_parse_sample() {
        let corpus = parse_str(SAMPLE).expect("parse should succeed");
        assert_eq!(corpus.records.len(), 3);
        assert_eq!(corpus.report.rows_dropped, 0);
        assert_eq!(corpus.statistics.first_year, 2000);
        assert_eq!(corpus.statistics.last_year, 2001);
        assert_eq!(corpus.statistics.year_count, 1);
        assert_eq!(corpus.statistics.cell_count, 2);
        assert_eq!(corpus.statistics.height_max, 20.0);
    }

    #[test]
    fn test_chunk_boundaries_do_not_change_output() {
        let whole = parse_str(SAMPLE).expect("parse should succeed");
        for chunk_size in 1..=13 {
            let mut parser = RecordParser::new();
            for chunk in SAMPLE.as_bytes().chunks(chunk_size) {
                parser.feed(chunk).expect("feed should succeed");
            }
            let chunked = parser.finish().expect("finish should succeed");
            assert_eq!(chunked.records, whole.records, "chunk size {chunk_size}");
            assert_eq!(chunked.statistics, whole.statistics, "chunk size {chunk_size}");
            assert_eq!(chunked.report, whole.report, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_records_parsed_counts_complete_lines() {
        let mut parser = RecordParser::new();
        parser
            .feed(b"Year,Cell,SLA,Wooddens,Longevity,Height\n2000,0,1,1,1,4\n2000,1,1")
            .expect("feed");
        assert_eq!(parser.records_parsed(), 1);
        parser.feed(b",1,1,5\nbad\n").expect("feed");
        assert_eq!(parser.records_parsed(), 2);
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let text = "Year,Cell,SLA,Wooddens,Longevity,Height\r\n2000,0,1,1,1,4\r\n2001,0,1,1,1,6";
        let corpus = parse_str(text).expect("parse should succeed");
        assert_eq!(corpus.records.len(), 2);
        assert_eq!(corpus.records[1].height, 6.0);
    }

    #[test]
    fn test_malformed_rows_dropped_silently() {
        let text = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
            2000,0,1,1,1,4\n\
            2000,0,1,1\n\
            2000,x,1,1,1,4\n\
            2000,1,1,1,1,5\n";
        let corpus = parse_str(text).expect("parse should succeed");
        assert_eq!(corpus.report.rows_accepted, 2);
        assert_eq!(corpus.report.rows_dropped, 2);
        assert_eq!(corpus.report.rows_seen(), 4);
        assert_eq!(corpus.statistics.record_count, 2);
    }

    #[test]
    fn test_invalid_utf8_row_dropped() {
        let mut parser = RecordParser::new();
        parser
            .feed(b"Year,Cell,SLA,Wooddens,Longevity,Height\n")
            .expect("header");
        parser.feed(b"2000,0,1,1,1,\xff\n2000,0,1,1,1,3\n").expect("rows");
        let corpus = parser.finish().expect("finish");
        assert_eq!(corpus.report.rows_dropped, 1);
        assert_eq!(corpus.records.len(), 1);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        // Extra column with a multi-byte character split between chunks.
        let text = "Year,Cell,SLA,Wooddens,Longevity,Height,Site\n2000,0,1,1,1,3,Zürich\n";
        let bytes = text.as_bytes();
        let split = text.find('ü').expect("has umlaut") + 1;
        let mut parser = RecordParser::new();
        parser.feed(&bytes[..split]).expect("first half");
        parser.feed(&bytes[split..]).expect("second half");
        let corpus = parser.finish().expect("finish");
        assert_eq!(corpus.records.len(), 1);
        assert_eq!(corpus.report.rows_dropped, 0);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(parse_str(""), Err(IngestError::MissingHeader)));
        assert!(matches!(parse_str("\n\n"), Err(IngestError::MissingHeader)));
    }

    #[test]
    fn test_header_only() {
        let corpus = parse_str("Year,Cell,SLA,Wooddens,Longevity,Height\n").expect("parse");
        assert!(corpus.records.is_empty());
        assert_eq!(corpus.statistics.year_layers(), Some(0));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let result = parse_str("Year,Cell,Height\n2000,0,4\n");
        assert!(matches!(result, Err(IngestError::MissingColumn(_))));
    }
}
