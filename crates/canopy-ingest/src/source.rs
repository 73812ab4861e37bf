use std::fs::File;
use std::io::{Cursor, ErrorKind, Read};
use std::path::PathBuf;

use canopy_core::constants::READ_CHUNK_BYTES;

use crate::error::IngestError;

/// Where tile input text comes from.
#[derive(Debug, Clone)]
pub enum TileSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl TileSource {
    /// Human-readable identifier for status messages.
    pub fn describe(&self) -> String {
        match self {
            TileSource::File(path) => path.display().to_string(),
            TileSource::Memory(bytes) => format!("<memory, {} bytes>", bytes.len()),
        }
    }

    /// Open the source for chunked reading.
    pub fn open(self) -> Result<SourceReader, IngestError> {
        let name = self.describe();
        match self {
            TileSource::File(path) => {
                let file = File::open(&path).map_err(|error| IngestError::Open {
                    source_name: name,
                    error,
                })?;
                let total_len = file.metadata().ok().map(|m| m.len());
                Ok(SourceReader::new(Box::new(file), total_len))
            }
            TileSource::Memory(bytes) => {
                let total_len = Some(bytes.len() as u64);
                Ok(SourceReader::new(Box::new(Cursor::new(bytes)), total_len))
            }
        }
    }
}

/// Pulls fixed-size chunks from an opened source and tracks byte progress.
pub struct SourceReader {
    inner: Box<dyn Read + Send>,
    total_len: Option<u64>,
    bytes_read: u64,
    buf: Vec<u8>,
}

impl SourceReader {
    pub fn new(inner: Box<dyn Read + Send>, total_len: Option<u64>) -> Self {
        Self {
            inner,
            total_len,
            bytes_read: 0,
            buf: vec![0; READ_CHUNK_BYTES],
        }
    }

    /// Override the chunk size (mostly for exercising chunk boundaries).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.buf = vec![0; chunk_size.max(1)];
        self
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Fraction of the source consumed, when the total length is known.
    pub fn progress(&self) -> Option<f32> {
        match self.total_len {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_read as f64 / total as f64).min(1.0) as f32),
            None => None,
        }
    }

    /// Next chunk, or None at end of input.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, IngestError> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    self.bytes_read += n as u64;
                    return Ok(Some(&self.buf[..n]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(error) => {
                    return Err(IngestError::Read {
                        bytes_read: self.bytes_read,
                        error,
                    })
                }
            }
        }
    }
}
