//! Error type for the xlsx-to-pdf library.
//!
//! Every failure of a conversion, whichever stage it comes from, is
//! normalised into one [`XlsxToPdfError`]. Its `Display` output is the
//! human-readable message shown to users (prefixed with `"Error: "` by the
//! notification path) and handed to the `on_error` callback.

use crate::pipeline::PipelineStage;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the xlsx-to-pdf library.
#[derive(Debug, Error)]
pub enum XlsxToPdfError {
    // ── Stage errors ──────────────────────────────────────────────────────
    /// The source workbook URL answered with a non-2xx status.
    #[error("Failed to fetch Excel file: {status}")]
    SourceFetch { url: String, status: u16 },

    /// The conversion service answered with a non-2xx status.
    ///
    /// `detail` carries the service's own explanation when its error body
    /// was JSON (e.g. the daily quota message on HTTP 429).
    #[error("Conversion failed: {status}")]
    ConversionService { status: u16, detail: Option<String> },

    /// The request never produced a status: invalid URL, refused connection,
    /// body cut off mid-transfer.
    #[error("{}: {reason}", .stage.failure_prefix())]
    Transport {
        stage: PipelineStage,
        url: String,
        reason: String,
    },

    /// The converted document could not be saved.
    #[error("Failed to save '{path}': {source}")]
    DownloadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collaborator failed with a stage-less error while `stage` was
    /// running (e.g. a host [`DownloadTrigger`] rejecting the filename).
    ///
    /// [`DownloadTrigger`]: crate::pipeline::download::DownloadTrigger
    #[error("{source}")]
    InStage {
        stage: PipelineStage,
        source: Box<XlsxToPdfError>,
    },

    // ── Service probe errors ──────────────────────────────────────────────
    /// `/health` or `/usage` could not be queried or decoded.
    #[error("Service probe '{url}' failed: {reason}")]
    ServiceProbe { url: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl XlsxToPdfError {
    /// The pipeline stage the failure originated in.
    pub fn stage(&self) -> PipelineStage {
        match self {
            XlsxToPdfError::SourceFetch { .. } => PipelineStage::FetchingSource,
            XlsxToPdfError::ConversionService { .. } => PipelineStage::SubmittingForConversion,
            XlsxToPdfError::Transport { stage, .. } => *stage,
            XlsxToPdfError::DownloadFailed { .. } => PipelineStage::Downloading,
            XlsxToPdfError::InStage { stage, .. } => *stage,
            XlsxToPdfError::ServiceProbe { .. }
            | XlsxToPdfError::InvalidConfig(_)
            | XlsxToPdfError::Internal(_) => PipelineStage::Idle,
        }
    }

    /// HTTP status reported by the remote side, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            XlsxToPdfError::SourceFetch { status, .. }
            | XlsxToPdfError::ConversionService { status, .. } => Some(*status),
            XlsxToPdfError::InStage { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The conversion service's own explanation of a failure, if it gave one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            XlsxToPdfError::ConversionService { detail, .. } => detail.as_deref(),
            XlsxToPdfError::InStage { source, .. } => source.detail(),
            _ => None,
        }
    }

    /// Attribute a stage-less error to the stage that was running.
    ///
    /// Errors that already know their stage are returned unchanged.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        if self.stage() != PipelineStage::Idle || stage == PipelineStage::Idle {
            return self;
        }
        XlsxToPdfError::InStage {
            stage,
            source: Box::new(self),
        }
    }

    /// The message shown by a notification sink for this failure.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_fetch_display_carries_status() {
        let e = XlsxToPdfError::SourceFetch {
            url: "http://files.local/book.xlsx".into(),
            status: 404,
        };
        assert_eq!(e.to_string(), "Failed to fetch Excel file: 404");
        assert_eq!(e.status(), Some(404));
        assert_eq!(e.stage(), PipelineStage::FetchingSource);
    }

    #[test]
    fn conversion_display_ignores_detail() {
        let e = XlsxToPdfError::ConversionService {
            status: 429,
            detail: Some("Rate limit exceeded".into()),
        };
        assert_eq!(e.to_string(), "Conversion failed: 429");
        assert_eq!(e.stage(), PipelineStage::SubmittingForConversion);
        assert_eq!(e.detail(), Some("Rate limit exceeded"));
    }

    #[test]
    fn stageless_error_takes_running_stage() {
        use std::error::Error as _;
        let e = XlsxToPdfError::InvalidConfig("cannot save report.pdf".into())
            .in_stage(PipelineStage::Downloading);
        assert_eq!(e.stage(), PipelineStage::Downloading);
        assert_eq!(e.to_string(), "Invalid configuration: cannot save report.pdf");
        assert!(e.source().is_some());
    }

    #[test]
    fn in_stage_keeps_known_stage() {
        let e = XlsxToPdfError::SourceFetch {
            url: "http://files.local/book.xlsx".into(),
            status: 404,
        }
        .in_stage(PipelineStage::Downloading);
        assert!(matches!(e, XlsxToPdfError::SourceFetch { .. }));
        assert_eq!(e.stage(), PipelineStage::FetchingSource);

        let e = XlsxToPdfError::Internal("boom".into()).in_stage(PipelineStage::Idle);
        assert!(matches!(e, XlsxToPdfError::Internal(_)));
    }

    #[test]
    fn transport_display_uses_stage_prefix() {
        let e = XlsxToPdfError::Transport {
            stage: PipelineStage::FetchingSource,
            url: String::new(),
            reason: "relative URL without a base".into(),
        };
        assert_eq!(
            e.to_string(),
            "Failed to fetch Excel file: relative URL without a base"
        );
        assert_eq!(e.status(), None);

        let e = XlsxToPdfError::Transport {
            stage: PipelineStage::SubmittingForConversion,
            url: "http://127.0.0.1:1/convert".into(),
            reason: "connection refused".into(),
        };
        assert!(e.to_string().starts_with("Conversion failed: "));
    }

    #[test]
    fn user_message_is_prefixed() {
        let e = XlsxToPdfError::ConversionService {
            status: 500,
            detail: None,
        };
        assert_eq!(e.user_message(), "Error: Conversion failed: 500");
    }

    #[test]
    fn download_failed_keeps_io_source() {
        use std::error::Error as _;
        let e = XlsxToPdfError::DownloadFailed {
            path: PathBuf::from("/readonly/report.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("report.pdf"));
        assert!(e.source().is_some());
        assert_eq!(e.stage(), PipelineStage::Downloading);
    }
}
