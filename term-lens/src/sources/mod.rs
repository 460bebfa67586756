//! Loading datasets from files, bytes and URLs.
//!
//! Four formats are understood: CSV, JSON (an array of objects), and Excel
//! workbooks in both `.xlsx` and legacy `.xls` form. Whatever the source, the
//! result is a [`Dataset`] whose header is the first record (CSV, Excel) or the
//! keys of the first object (JSON).
//!
//! # Examples
//!
//! ```rust,no_run
//! use term_lens::sources::{DataSource, FileSource};
//!
//! # async fn example() -> term_lens::error::Result<()> {
//! let source = FileSource::new("data/sales.xlsx")?;
//! let dataset = source.load().await?;
//! println!("{} rows from {}", dataset.row_count(), source.file_name());
//! # Ok(())
//! # }
//! ```

use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::{LensError, Result};

mod csv;
mod excel;
mod json;
#[cfg(feature = "remote")]
mod remote;

pub use csv::{decode_csv, CsvOptions};
pub use excel::decode_excel;
pub use json::decode_json;
#[cfg(feature = "remote")]
pub use remote::UrlSource;

/// Encodings a dataset can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Json,
    Xlsx,
    Xls,
}

impl SourceFormat {
    /// Maps a file extension (without the dot, any case).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Detects the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Detects the format from a MIME type, ignoring parameters such as
    /// `charset`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/json" | "text/json" => Some(Self::Json),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Xlsx)
            }
            "application/vnd.ms-excel" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SourceFormat {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| LensError::UnsupportedFormat(s.to_string()))
    }
}

/// Decodes raw bytes in the given format.
pub fn decode(bytes: &[u8], format: SourceFormat, csv: &CsvOptions) -> Result<Dataset> {
    match format {
        SourceFormat::Csv => decode_csv(bytes, csv),
        SourceFormat::Json => decode_json(bytes),
        SourceFormat::Xlsx | SourceFormat::Xls => decode_excel(bytes),
    }
}

/// Anything a dataset can be loaded from.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Reads and decodes the whole source.
    async fn load(&self) -> Result<Dataset>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;

    /// Name to show for the source, e.g. in the file history.
    fn file_name(&self) -> String;
}

/// A dataset file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: SourceFormat,
    csv: CsvOptions,
}

impl FileSource {
    /// Creates a source, detecting the format from the extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = SourceFormat::from_path(&path)
            .ok_or_else(|| LensError::UnsupportedFormat(path.display().to_string()))?;
        Ok(Self::with_format(path, format))
    }

    /// Creates a source with an explicit format.
    pub fn with_format(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
            csv: CsvOptions::default(),
        }
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

#[async_trait]
impl DataSource for FileSource {
    #[instrument(skip(self), fields(path = %self.path.display(), format = %self.format))]
    async fn load(&self) -> Result<Dataset> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            LensError::data_source_with_source(
                self.format.extension().to_uppercase(),
                format!("Could not read {}", self.path.display()),
                Box::new(e),
            )
        })?;

        let dataset = decode(&bytes, self.format, &self.csv)?;
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    fn description(&self) -> String {
        format!("{} file: {}", self.format.extension().to_uppercase(), self.path.display())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A dataset already in memory, such as an upload.
#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
    format: SourceFormat,
    csv: CsvOptions,
}

impl BytesSource {
    /// Wraps uploaded bytes, detecting the format from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let format = SourceFormat::from_path(&name)
            .ok_or_else(|| LensError::UnsupportedFormat(name.clone()))?;
        Ok(Self {
            name,
            bytes,
            format,
            csv: CsvOptions::default(),
        })
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }
}

#[async_trait]
impl DataSource for BytesSource {
    async fn load(&self) -> Result<Dataset> {
        decode(&self.bytes, self.format, &self.csv)
    }

    fn description(&self) -> String {
        format!("In-memory {} ({} bytes): {}", self.format, self.bytes.len(), self.name)
    }

    fn file_name(&self) -> String {
        self.name.clone()
    }
}

fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Picks a source for a path or URL.
pub fn open(location: &str) -> Result<Box<dyn DataSource>> {
    if is_url(location) {
        open_url(location)
    } else {
        Ok(Box::new(FileSource::new(location)?))
    }
}

#[cfg(feature = "remote")]
fn open_url(location: &str) -> Result<Box<dyn DataSource>> {
    Ok(Box::new(UrlSource::new(location)?))
}

#[cfg(not(feature = "remote"))]
fn open_url(_location: &str) -> Result<Box<dyn DataSource>> {
    Err(LensError::Configuration(
        "Loading from URLs requires the `remote` feature".to_string(),
    ))
}
