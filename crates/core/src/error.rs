use thiserror::Error;

/// Failures while reading a stock snapshot from disk.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported snapshot extension '{0}', expected .json or .csv")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("field '{field}' {reason}")]
    OutOfRange { field: &'static str, reason: &'static str },
}
