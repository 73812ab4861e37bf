use canopy_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("io error on {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("{0}")]
    Load(String),

    #[error("invalid argument: {0}")]
    Usage(String),
}

impl ViewerError {
    pub fn io(path: &std::path::Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            error,
        }
    }
}
