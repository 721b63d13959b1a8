use std::path::PathBuf;
use thiserror::Error;

/// IMU analysis error types
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {index} is missing '{field}'")]
    InvalidRecord { index: usize, field: &'static str },

    #[error("Session contains no valid records")]
    EmptyDataset,

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Summary export failed: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
