//! # xlsx-to-pdf
//!
//! Convert Excel workbooks to PDF through a remote conversion service.
//!
//! The conversion itself happens elsewhere (typically a LibreOffice-backed
//! HTTP service). This crate is the client side: it fetches the workbook,
//! uploads it, and saves the PDF that comes back, keeping a host UI informed
//! along the way.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file_url
//!  │
//!  ├─ 1. Source    GET the workbook bytes
//!  ├─ 2. Submit    POST them as multipart field `file` (filename `file.xlsx`)
//!  ├─ 3. Receive   read the converted document from the response body
//!  └─ 4. Download  save it under the suggested filename
//! ```
//!
//! Stages run strictly in order; the first failure skips the rest. There are
//! no retries and no pipeline-level timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xlsx_to_pdf::{ConversionPipeline, ConversionRequest, OutcomeCallbacks};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = ConversionPipeline::new()?;
//!     let request = ConversionRequest::builder()
//!         .file_url("https://files.example.com/q3.xlsx")
//!         .output_filename("q3.pdf")
//!         .build()?;
//!
//!     pipeline
//!         .convert(
//!             request,
//!             OutcomeCallbacks::new()
//!                 .on_success(|| eprintln!("saved"))
//!                 .on_error(|e| eprintln!("{e}")),
//!         )
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `xlsx2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod adapter;
pub mod callbacks;
pub mod config;
pub mod convert;
pub mod error;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use adapter::{handle_action, ActionAttributes, HostResume};
pub use callbacks::OutcomeCallbacks;
pub use config::{ConversionRequest, ConversionRequestBuilder, PipelineOptions, RequestOptions};
pub use convert::ConversionPipeline;
pub use error::XlsxToPdfError;
pub use notify::{BusyIndicator, NoopNotificationSink, NotificationSink, Notifier};
pub use output::{ConversionOutput, ConversionStats, DownloadReceipt};
pub use pipeline::download::{DownloadTrigger, FileDownloadTrigger};
pub use pipeline::PipelineStage;
pub use service::{check_health, fetch_usage, ServiceHealth, ServiceUsage};
