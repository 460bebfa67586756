//! Error types for term-lens.
//!
//! The profiling and transformation functions never fail: malformed cells fall
//! into the "missing" or "unparseable" paths instead. Everything that touches
//! the outside world (decoding files, fetching URLs, persisting history) returns
//! [`Result`] with a [`LensError`].

use thiserror::Error;

/// The main error type for term-lens.
#[derive(Error, Debug)]
pub enum LensError {
    /// Error from loading or decoding a data source.
    #[error("Data source error: {message}")]
    DataSource {
        /// Kind of source (e.g., "CSV", "Excel", "URL")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The source decoded fine but carries no header row.
    #[error("No data found in the source")]
    NoData,

    /// The file extension or content type is not one we can decode.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Arrow CSV decoding.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from reading a spreadsheet.
    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from HTTP requests.
    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error related to configuration or user-supplied options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, LensError>`.
pub type Result<T> = std::result::Result<T, LensError>;

impl LensError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<LensError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            LensError::Internal(inner) => LensError::Internal(format!("{}: {inner}", f())),
            other => LensError::Internal(format!("{}: {other}", f())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_data_source_error() {
        let err = LensError::data_source("CSV", "Invalid file format");
        assert_eq!(err.to_string(), "Data source error: Invalid file format");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_data_source_error_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err = LensError::data_source_with_source("CSV", "Could not open file", Box::new(io));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_no_data_message() {
        assert_eq!(LensError::NoData.to_string(), "No data found in the source");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: LensError = parse.unwrap_err().into();
        assert!(matches!(err, LensError::Serialization(_)));
    }

    #[test]
    fn test_error_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = io.context("Saving history").unwrap_err();
        assert!(err.to_string().starts_with("Internal error: Saving history"));
    }
}
