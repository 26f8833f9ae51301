//! Conversion request: upload the workbook and read back the document.
//!
//! ## Wire contract
//!
//! ```text
//! POST <api_url>
//! Content-Type: multipart/form-data; boundary=…
//!
//! --…
//! Content-Disposition: form-data; name="file"; filename="file.xlsx"
//! <workbook bytes>
//! ```
//!
//! Any 2xx answer carries the converted document as its raw body. Anything
//! else is a failure; when the service explains itself with a JSON error body
//! the explanation is kept as detail, but the user-facing message is always
//! `Conversion failed: <status>`.

use crate::error::XlsxToPdfError;
use crate::pipeline::PipelineStage;
use crate::service::ServiceErrorBody;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

/// Multipart field the service reads the workbook from.
pub const UPLOAD_FIELD: &str = "file";
/// Filename sent with the upload, whatever the source URL was called.
pub const UPLOAD_FILENAME: &str = "file.xlsx";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Build the single-part upload form.
pub fn upload_form(source: Bytes) -> Result<Form, XlsxToPdfError> {
    let len = source.len() as u64;
    let part = Part::stream_with_length(source, len)
        .file_name(UPLOAD_FILENAME)
        .mime_str(XLSX_MIME)
        .map_err(|e| XlsxToPdfError::Internal(format!("Invalid upload MIME type: {e}")))?;
    Ok(Form::new().part(UPLOAD_FIELD, part))
}

/// POST the workbook to `api_url`; returns the 2xx response unread.
///
/// # Errors
/// - [`XlsxToPdfError::ConversionService`] for a non-2xx status
/// - [`XlsxToPdfError::Transport`] if the request could not be sent
pub async fn submit_for_conversion(
    client: &reqwest::Client,
    api_url: &str,
    source: Bytes,
) -> Result<reqwest::Response, XlsxToPdfError> {
    info!("Submitting {} bytes for conversion to: {}", source.len(), api_url);

    let form = upload_form(source)?;
    let response = client
        .post(api_url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| XlsxToPdfError::Transport {
            stage: PipelineStage::SubmittingForConversion,
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let detail = read_error_detail(response).await;
        warn!(
            "Conversion service answered {}{}",
            status.as_u16(),
            detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
        );
        return Err(XlsxToPdfError::ConversionService {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(response)
}

/// Read the converted document from a successful response.
pub async fn receive_converted(
    response: reqwest::Response,
    api_url: &str,
) -> Result<Bytes, XlsxToPdfError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| XlsxToPdfError::Transport {
            stage: PipelineStage::ReceivingResult,
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
    debug!("Received {} converted bytes", bytes.len());
    Ok(bytes)
}

/// Best-effort: a body that is missing or not JSON just yields no detail.
async fn read_error_detail(response: reqwest::Response) -> Option<String> {
    let body = response.bytes().await.ok()?;
    ServiceErrorBody::parse(&body).and_then(|b| b.summary())
}
