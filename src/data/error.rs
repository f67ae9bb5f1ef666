//! Errors raised while loading an observation table.

use std::path::PathBuf;

use thiserror::Error;

/// Why a dataset could not be loaded. All variants are fatal for the load
/// that produced them; there is no partial result.  Individual cells that
/// cannot be read do not raise an error; they load as absent values.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extension does not map to a supported format.
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// A CSV row could not be parsed into an observation (wrong field count,
    /// a missing header column, an unreadable watchlist flag).
    #[error("CSV row {row}: {source}")]
    Csv {
        /// 1-based data row number (the header is row 0).
        row: u64,
        #[source]
        source: csv::Error,
    },

    /// The JSON document is not an array of observation records.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The Parquet container could not be decoded.
    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// An Arrow column could not be converted to the expected type.
    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A required column is absent from the table.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = LoadError::io(
            "/data/birds.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/birds.csv"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn missing_column_display() {
        assert_eq!(
            LoadError::MissingColumn("Habitat").to_string(),
            "missing required column 'Habitat'"
        );
    }
}
