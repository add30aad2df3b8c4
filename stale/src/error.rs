//! Error types for stale-user reporting.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query error: {0}")]
    Query(#[from] duckdb::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{input}' (expected YYYY-MM-DD): {reason}")]
    InvalidDateFormat { input: String, reason: String },

    #[error("Extension error: {0}")]
    Extension(String),
}

pub type Result<T> = std::result::Result<T, Error>;
