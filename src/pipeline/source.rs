//! Source retrieval: fetch the workbook bytes from `file_url`.
//!
//! The bytes are kept in memory and never inspected; whatever the URL serves
//! is what gets uploaded. A non-2xx answer stops the pipeline before the
//! conversion service is contacted.

use crate::error::XlsxToPdfError;
use crate::pipeline::PipelineStage;
use bytes::Bytes;
use tracing::{debug, info};

/// `GET file_url` and return the body.
///
/// # Errors
/// - [`XlsxToPdfError::SourceFetch`] for a non-2xx status
/// - [`XlsxToPdfError::Transport`] if no status was received (invalid or
///   empty URL, connection failure) or the body was cut off
pub async fn fetch_source(client: &reqwest::Client, file_url: &str) -> Result<Bytes, XlsxToPdfError> {
    info!("Fetching workbook from: {}", file_url);

    let transport_error = |e: reqwest::Error| XlsxToPdfError::Transport {
        stage: PipelineStage::FetchingSource,
        url: file_url.to_string(),
        reason: e.to_string(),
    };

    let response = client.get(file_url).send().await.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(XlsxToPdfError::SourceFetch {
            url: file_url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    debug!("Fetched {} bytes from {}", bytes.len(), file_url);
    Ok(bytes)
}
