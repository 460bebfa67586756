//! Datasets fetched over HTTP(S).

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument};
use url::Url;

use super::{decode, CsvOptions, DataSource, SourceFormat};
use crate::dataset::Dataset;
use crate::error::{LensError, Result};

/// A dataset behind an `http` or `https` URL.
///
/// The format comes from the URL path's extension when it has a known one,
/// otherwise from the response's `Content-Type`.
#[derive(Debug, Clone)]
pub struct UrlSource {
    url: Url,
    format: Option<SourceFormat>,
    csv: CsvOptions,
}

impl UrlSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| LensError::Configuration(format!("Invalid URL '{url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LensError::Configuration(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }
        let format = SourceFormat::from_path(url.path());
        Ok(Self {
            url,
            format,
            csv: CsvOptions::default(),
        })
    }

    /// Forces a format regardless of extension and content type.
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl DataSource for UrlSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Dataset> {
        let response = reqwest::get(self.url.clone()).await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let format = self
            .format
            .or_else(|| content_type.as_deref().and_then(SourceFormat::from_content_type))
            .ok_or_else(|| {
                LensError::UnsupportedFormat(format!(
                    "{} (content type: {})",
                    self.url,
                    content_type.as_deref().unwrap_or("none")
                ))
            })?;

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), format = %format, "Fetched remote dataset");

        let dataset = decode(&bytes, format, &self.csv)?;
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded remote dataset"
        );
        Ok(dataset)
    }

    fn description(&self) -> String {
        format!("URL source: {}", self.url)
    }

    fn file_name(&self) -> String {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.to_string())
    }
}
