//! Result types returned by a successful conversion.

use serde::Serialize;
use std::path::PathBuf;

/// What a finished conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Suggested save name the download was triggered with.
    pub filename: String,
    /// What the download trigger did with the payload.
    pub receipt: DownloadReceipt,
    pub stats: ConversionStats,
}

/// Returned by a [`crate::DownloadTrigger`] once the payload is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReceipt {
    /// Final location, when the trigger saved to the local file system.
    pub path: Option<PathBuf>,
    /// Size of the saved payload.
    pub bytes: usize,
}

/// Byte counts and per-stage timings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub source_bytes: usize,
    pub converted_bytes: usize,
    pub fetch_duration_ms: u64,
    pub convert_duration_ms: u64,
    pub download_duration_ms: u64,
    pub total_duration_ms: u64,
}
