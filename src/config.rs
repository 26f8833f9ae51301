//! Configuration types for a spreadsheet-to-PDF conversion.
//!
//! A conversion is described by a [`ConversionRequest`], built via its
//! [`ConversionRequestBuilder`] or deserialised from a JSON options object.
//! Every field is optional on the way in; unset or empty values fall back to
//! the documented defaults, so `ConversionRequest::default()` is always a
//! valid (if not very useful) request.
//!
//! The HTTP client itself is tuned through [`PipelineOptions`], which is
//! shared by every request a [`crate::ConversionPipeline`] runs.

use crate::error::XlsxToPdfError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Conversion endpoint used when the caller does not name one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/convert";
/// Suggested save name for the converted document.
pub const DEFAULT_OUTPUT_FILENAME: &str = "report.pdf";
/// Message shown next to the busy indicator while the conversion runs.
pub const DEFAULT_LOADING_MESSAGE: &str = "Converting to PDF...";
/// Message shown once the download has been triggered.
pub const SUCCESS_MESSAGE: &str = "PDF downloaded successfully!";

/// Immutable description of one conversion.
///
/// Consumed by [`crate::ConversionPipeline::run`]; build a new one for every
/// invocation.
///
/// # Example
/// ```rust
/// use xlsx_to_pdf::ConversionRequest;
///
/// let request = ConversionRequest::builder()
///     .file_url("https://files.example.com/q3.xlsx")
///     .output_filename("q3.pdf")
///     .build()
///     .unwrap();
/// assert_eq!(request.api_url(), "http://localhost:5000/convert");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RequestOptions")]
pub struct ConversionRequest {
    api_url: String,
    file_url: String,
    output_filename: String,
    loading_message: String,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::from_options_unchecked(RequestOptions::default())
    }
}

impl ConversionRequest {
    /// Create a new builder for `ConversionRequest`.
    pub fn builder() -> ConversionRequestBuilder {
        ConversionRequestBuilder {
            options: RequestOptions::default(),
        }
    }

    /// Endpoint the workbook is POSTed to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Where the source workbook is fetched from. Empty by default.
    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    /// Name the converted document is saved under.
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    fn from_options_unchecked(options: RequestOptions) -> Self {
        Self {
            api_url: or_default(options.api_url, DEFAULT_API_URL),
            file_url: options.file_url.unwrap_or_default(),
            output_filename: or_default(options.output_filename, DEFAULT_OUTPUT_FILENAME),
            loading_message: or_default(options.loading_message, DEFAULT_LOADING_MESSAGE),
        }
    }
}

/// Empty strings count as unset.
fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// The loose, all-optional form of a request, as a host page would pass it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    pub api_url: Option<String>,
    pub file_url: Option<String>,
    pub output_filename: Option<String>,
    pub loading_message: Option<String>,
}

impl TryFrom<RequestOptions> for ConversionRequest {
    type Error = XlsxToPdfError;

    fn try_from(options: RequestOptions) -> Result<Self, Self::Error> {
        let request = ConversionRequest::from_options_unchecked(options);
        validate(&request)?;
        Ok(request)
    }
}

fn validate(request: &ConversionRequest) -> Result<(), XlsxToPdfError> {
    // The download stage only ever uses the final path component.
    if Path::new(&request.output_filename).file_name().is_none() {
        return Err(XlsxToPdfError::InvalidConfig(format!(
            "output filename '{}' does not name a file",
            request.output_filename
        )));
    }
    Ok(())
}

/// Builder for [`ConversionRequest`].
#[derive(Debug)]
pub struct ConversionRequestBuilder {
    options: RequestOptions,
}

impl ConversionRequestBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.options.api_url = Some(url.into());
        self
    }

    pub fn file_url(mut self, url: impl Into<String>) -> Self {
        self.options.file_url = Some(url.into());
        self
    }

    pub fn output_filename(mut self, name: impl Into<String>) -> Self {
        self.options.output_filename = Some(name.into());
        self
    }

    pub fn loading_message(mut self, message: impl Into<String>) -> Self {
        self.options.loading_message = Some(message.into());
        self
    }

    /// Fill in defaults and validate.
    pub fn build(self) -> Result<ConversionRequest, XlsxToPdfError> {
        ConversionRequest::try_from(self.options)
    }
}

/// HTTP client settings shared by every run of a pipeline.
///
/// None of these impose a deadline on the conversion as a whole; the
/// service may take as long as it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// `User-Agent` header. Default: `xlsx-to-pdf/<version>`.
    pub user_agent: Option<String>,

    /// TCP connect timeout in seconds. Default: none.
    pub connect_timeout_secs: Option<u64>,
}

impl PipelineOptions {
    /// Build the `reqwest::Client` described by these options.
    pub fn build_client(&self) -> Result<reqwest::Client, XlsxToPdfError> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("xlsx-to-pdf/", env!("CARGO_PKG_VERSION")).to_string());

        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(secs) = self.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        builder
            .build()
            .map_err(|e| XlsxToPdfError::Internal(format!("Failed to build HTTP client: {e}")))
    }
}
