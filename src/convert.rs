//! The conversion pipeline: fetch → submit → receive → download.
//!
//! [`ConversionPipeline`] owns the HTTP client and the two host
//! collaborators (a [`NotificationSink`] and a [`DownloadTrigger`]). It is
//! cheap to clone and holds no per-conversion state, so independent
//! conversions never interact.
//!
//! Three entry points share one implementation:
//!
//! | Method | Outcome delivered via |
//! |--------|-----------------------|
//! | [`ConversionPipeline::run`] | `Result<ConversionOutput, XlsxToPdfError>` |
//! | [`ConversionPipeline::convert`] | [`OutcomeCallbacks`] (awaitable) |
//! | [`ConversionPipeline::spawn`] | [`OutcomeCallbacks`] (fire-and-forget task) |

use crate::callbacks::OutcomeCallbacks;
use crate::config::{ConversionRequest, PipelineOptions, SUCCESS_MESSAGE};
use crate::error::XlsxToPdfError;
use crate::notify::{BusyGuard, NoopNotificationSink, NotificationSink, Notifier};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::download::{DownloadTrigger, FileDownloadTrigger};
use crate::pipeline::{source, submit, PipelineStage};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Runs spreadsheet-to-PDF conversions against a remote service.
///
/// # Example
/// ```rust,no_run
/// use xlsx_to_pdf::{ConversionPipeline, ConversionRequest, FileDownloadTrigger};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = ConversionPipeline::new()?
///     .downloader(Arc::new(FileDownloadTrigger::new("downloads")));
///
/// let request = ConversionRequest::builder()
///     .api_url("http://localhost:5000/convert")
///     .file_url("https://files.example.com/q3.xlsx")
///     .output_filename("q3.pdf")
///     .build()?;
///
/// let output = pipeline.run(request).await?;
/// println!("saved {:?}", output.receipt.path);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConversionPipeline {
    client: reqwest::Client,
    notifier: Notifier,
    downloader: Arc<dyn DownloadTrigger>,
}

impl fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("client", &self.client)
            .field("notifier", &"<dyn NotificationSink>")
            .field("downloader", &"<dyn DownloadTrigger>")
            .finish()
    }
}

impl ConversionPipeline {
    /// A pipeline with default client options, no UI, saving into the
    /// current directory.
    pub fn new() -> Result<Self, XlsxToPdfError> {
        Self::with_options(&PipelineOptions::default())
    }

    pub fn with_options(options: &PipelineOptions) -> Result<Self, XlsxToPdfError> {
        Ok(Self::with_client(options.build_client()?))
    }

    /// Use a caller-configured `reqwest::Client` (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            notifier: Arc::new(NoopNotificationSink),
            downloader: Arc::new(FileDownloadTrigger::new(".")),
        }
    }

    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn downloader(mut self, downloader: Arc<dyn DownloadTrigger>) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run one conversion and return its outcome.
    ///
    /// The notification sink sees, in order: busy indicator shown, loading
    /// message, then on the terminal path the indicator released, messages
    /// cleared, and a single success or `"Error: …"` message.
    pub async fn run(&self, request: ConversionRequest) -> Result<ConversionOutput, XlsxToPdfError> {
        let notifier: &dyn NotificationSink = self.notifier.as_ref();
        let busy = BusyGuard::acquire(notifier);
        notifier.show_info_message(request.loading_message());

        let result = self.execute(&request).await;

        busy.release();
        notifier.clear_messages();
        match &result {
            Ok(_) => notifier.show_info_message(SUCCESS_MESSAGE),
            Err(e) => notifier.show_error_message(&e.user_message()),
        }
        result
    }

    /// Report a failure found before any request was sent, such as action
    /// attributes that do not form a valid request.
    ///
    /// The sink sees the same terminal messages as a failed [`run`](Self::run):
    /// messages cleared, then one `"Error: …"` message. No busy indicator is
    /// shown.
    pub fn report_failure(&self, err: &XlsxToPdfError) {
        warn!("Conversion not started: {}", err);
        self.notifier.clear_messages();
        self.notifier.show_error_message(&err.user_message());
    }

    /// Run one conversion and hand the outcome to `callbacks`.
    ///
    /// Never fails and never panics on a conversion error: every failure is
    /// routed to `on_error`. Exactly one callback runs, after the busy
    /// indicator has been released.
    pub async fn convert(&self, request: ConversionRequest, callbacks: OutcomeCallbacks) {
        let result = self.run(request).await;
        callbacks.deliver(result);
    }

    /// Fire-and-forget form of [`ConversionPipeline::convert`].
    ///
    /// Must be called from within a Tokio runtime. The returned handle may be
    /// dropped; the conversion still runs to completion.
    pub fn spawn(&self, request: ConversionRequest, callbacks: OutcomeCallbacks) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.convert(request, callbacks).await })
    }

    /// Synchronous wrapper around [`ConversionPipeline::run`].
    ///
    /// Creates a temporary tokio runtime internally; do not call it from
    /// inside another runtime.
    pub fn run_sync(&self, request: ConversionRequest) -> Result<ConversionOutput, XlsxToPdfError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| XlsxToPdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.run(request))
    }

    async fn execute(&self, request: &ConversionRequest) -> Result<ConversionOutput, XlsxToPdfError> {
        let total_start = Instant::now();
        let mut stage = PipelineStage::Idle;
        info!(
            "Starting conversion: {} → {}",
            request.file_url(),
            request.api_url()
        );

        let result = async {
            // ── Step 1: Fetch source workbook ────────────────────────────────
            stage = enter(stage);
            let fetch_start = Instant::now();
            let workbook = source::fetch_source(&self.client, request.file_url()).await?;
            let source_bytes = workbook.len();
            let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

            // ── Step 2: Submit for conversion ────────────────────────────────
            stage = enter(stage);
            let convert_start = Instant::now();
            let response =
                submit::submit_for_conversion(&self.client, request.api_url(), workbook).await?;

            // ── Step 3: Receive converted document ───────────────────────────
            stage = enter(stage);
            let document = submit::receive_converted(response, request.api_url()).await?;
            let converted_bytes = document.len();
            let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

            // ── Step 4: Trigger download ─────────────────────────────────────
            stage = enter(stage);
            let download_start = Instant::now();
            let receipt = self
                .downloader
                .trigger(document, request.output_filename())
                .await?;
            let download_duration_ms = download_start.elapsed().as_millis() as u64;

            stage = enter(stage);
            Ok::<_, XlsxToPdfError>(ConversionOutput {
                filename: request.output_filename().to_string(),
                receipt,
                stats: ConversionStats {
                    source_bytes,
                    converted_bytes,
                    fetch_duration_ms,
                    convert_duration_ms,
                    download_duration_ms,
                    total_duration_ms: total_start.elapsed().as_millis() as u64,
                },
            })
        }
        .await;
        let result = result.map_err(|e| e.in_stage(stage));

        match &result {
            Ok(output) => info!(
                "Conversion {}: {} ({} bytes), {}ms total",
                stage, output.filename, output.stats.converted_bytes, output.stats.total_duration_ms
            ),
            Err(e) => {
                debug!("pipeline stage {} → {}", stage, PipelineStage::Failed);
                warn!("Conversion failed during {}: {}", e.stage(), e);
            }
        }
        result
    }
}

fn enter(stage: PipelineStage) -> PipelineStage {
    let next = stage.advance();
    debug!("pipeline stage {} → {}", stage, next);
    next
}
