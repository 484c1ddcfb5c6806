//! Structured error types for chart-history ingestion and the report cache.

use crate::domain::SeriesError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reading price history or cached reports.
///
/// Displayable as-is in the CLI; callers add file context with `anyhow`.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV import failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}
