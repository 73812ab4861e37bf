use thiserror::Error;

/// Errors that stop ingestion. Malformed rows are not errors: they are
/// counted in `IngestReport` and dropped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {source_name}: {error}")]
    Open {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("read failed after {bytes_read} bytes: {error}")]
    Read {
        bytes_read: u64,
        #[source]
        error: std::io::Error,
    },

    #[error("input has no header line")]
    MissingHeader,

    #[error("header line is not valid UTF-8")]
    InvalidHeader,

    #[error("header is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("years {first_year}..={last_year} exceed the limit of {max_layers} year layers")]
    YearSpanTooLarge {
        first_year: i32,
        last_year: i32,
        max_layers: u32,
    },
}
