//! Pipeline stages for spreadsheet-to-PDF conversion.
//!
//! Each submodule implements exactly one step. The orchestration (busy
//! indicator, messages, outcome callbacks) lives in [`crate::convert`];
//! the stages only move bytes and report failures.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ submit ──▶ download
//! (GET)      (POST multipart, read body)   (save under suggested name)
//! ```
//!
//! 1. [`source`]: fetch the workbook bytes from `file_url`
//! 2. [`submit`]: upload them as a `file` part and read back the converted
//!    document; the only stage that talks to the conversion service
//! 3. [`download`]: hand the converted bytes to a [`download::DownloadTrigger`]

pub mod download;
pub mod source;
pub mod submit;

use serde::Serialize;
use std::fmt;

/// Where a single conversion currently is.
///
/// The progression is strictly linear:
///
/// ```text
/// Idle → FetchingSource → SubmittingForConversion → ReceivingResult → Downloading → Completed
///             │                    │                       │               │
///             └────────────────────┴───────────┬───────────┴───────────────┘
///                                              ▼
///                                            Failed
/// ```
///
/// There is no way back to `Idle`: a request is consumed by the run that
/// executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    FetchingSource,
    SubmittingForConversion,
    ReceivingResult,
    Downloading,
    /// Terminal: the download was triggered.
    Completed,
    /// Terminal: a stage failed and the rest were skipped.
    Failed,
}

impl PipelineStage {
    /// The stage that follows this one on success. Terminal stages stay put.
    pub fn advance(self) -> Self {
        match self {
            PipelineStage::Idle => PipelineStage::FetchingSource,
            PipelineStage::FetchingSource => PipelineStage::SubmittingForConversion,
            PipelineStage::SubmittingForConversion => PipelineStage::ReceivingResult,
            PipelineStage::ReceivingResult => PipelineStage::Downloading,
            PipelineStage::Downloading => PipelineStage::Completed,
            terminal => terminal,
        }
    }

    /// Whether a failure may occur while in this stage.
    pub fn can_fail(self) -> bool {
        matches!(
            self,
            PipelineStage::FetchingSource
                | PipelineStage::SubmittingForConversion
                | PipelineStage::ReceivingResult
                | PipelineStage::Downloading
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Completed | PipelineStage::Failed)
    }

    /// Prefix used for user-facing failure messages originating in this stage.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            PipelineStage::FetchingSource => "Failed to fetch Excel file",
            PipelineStage::SubmittingForConversion | PipelineStage::ReceivingResult => {
                "Conversion failed"
            }
            PipelineStage::Downloading => "Download failed",
            PipelineStage::Idle | PipelineStage::Completed | PipelineStage::Failed => {
                "Conversion aborted"
            }
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::FetchingSource => "fetching-source",
            PipelineStage::SubmittingForConversion => "submitting",
            PipelineStage::ReceivingResult => "receiving",
            PipelineStage::Downloading => "downloading",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}
