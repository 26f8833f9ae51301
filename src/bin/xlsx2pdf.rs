//! CLI binary for xlsx-to-pdf.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionRequest`, shows a spinner while the service works, and saves
//! the PDF into a directory.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xlsx_to_pdf::{
    check_health, fetch_usage, BusyIndicator, ConversionPipeline, ConversionRequest,
    FileDownloadTrigger, NotificationSink, PipelineOptions,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal notification sink using indicatif ───────────────────────────────

/// Spinner on stderr while the conversion runs; status lines once it ends.
struct CliNotifier {
    quiet: bool,
    /// The spinner currently on screen, so info messages can update it.
    active: Arc<Mutex<Option<ProgressBar>>>,
}

struct CliSpinner {
    bar: ProgressBar,
    active: Arc<Mutex<Option<ProgressBar>>>,
}

/// Lock the spinner slot, recovering it if a previous holder panicked.
fn slot(active: &Mutex<Option<ProgressBar>>) -> MutexGuard<'_, Option<ProgressBar>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BusyIndicator for CliSpinner {
    fn release(self: Box<Self>) {
        slot(&self.active).take();
        self.bar.finish_and_clear();
    }
}

impl CliNotifier {
    fn new(quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            quiet,
            active: Arc::new(Mutex::new(None)),
        })
    }
}

impl NotificationSink for CliNotifier {
    fn show_busy_indicator(&self) -> Option<Box<dyn BusyIndicator>> {
        if self.quiet {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        *slot(&self.active) = Some(bar.clone());
        Some(Box::new(CliSpinner {
            bar,
            active: Arc::clone(&self.active),
        }))
    }

    fn show_info_message(&self, text: &str) {
        if self.quiet {
            return;
        }
        match slot(&self.active).as_ref() {
            Some(bar) => bar.set_message(text.to_string()),
            None => eprintln!("{} {}", green("✔"), text),
        }
    }

    fn show_error_message(&self, text: &str) {
        // Errors are shown even in quiet mode.
        eprintln!("{} {}", red("✘"), text);
    }
}

/// Upload an Excel workbook to a conversion service and save the PDF.
#[derive(Parser, Debug)]
#[command(
    name = "xlsx2pdf",
    version,
    about = "Convert Excel workbooks to PDF through a remote conversion service",
    long_about = "Fetches a workbook from FILE_URL, uploads it to the conversion service \
as a multipart `file` field, and saves the returned PDF. The conversion itself happens \
on the service (typically LibreOffice running headless).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// HTTP/HTTPS URL of the source workbook.
    file_url: Option<String>,

    /// Conversion endpoint.
    #[arg(long, env = "XLSX2PDF_API_URL")]
    api_url: Option<String>,

    /// Name to save the PDF under.
    #[arg(short, long, env = "XLSX2PDF_OUTPUT")]
    output: Option<String>,

    /// Directory to save the PDF into.
    #[arg(short, long, env = "XLSX2PDF_DIR", default_value = ".")]
    dir: PathBuf,

    /// Message shown next to the spinner.
    #[arg(long, env = "XLSX2PDF_LOADING_MESSAGE")]
    loading_message: Option<String>,

    /// TCP connect timeout in seconds (no overall deadline is imposed).
    #[arg(long, env = "XLSX2PDF_CONNECT_TIMEOUT")]
    connect_timeout: Option<u64>,

    /// Query the service's health endpoint and exit.
    #[arg(long, conflicts_with = "usage")]
    health: bool,

    /// Show the remaining daily quota on the service and exit.
    #[arg(long)]
    usage: bool,

    /// Print the conversion result as JSON on stdout.
    #[arg(long, env = "XLSX2PDF_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "XLSX2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "XLSX2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; INFO logs would
    // only tear through it.
    let show_spinner = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let options = PipelineOptions {
        user_agent: None,
        connect_timeout_secs: cli.connect_timeout,
    };

    // ── Service probes ───────────────────────────────────────────────────
    if cli.health || cli.usage {
        let client = options.build_client().context("Failed to build HTTP client")?;
        let api_url = ConversionRequest::builder()
            .api_url(cli.api_url.clone().unwrap_or_default())
            .build()
            .context("Invalid configuration")?
            .api_url()
            .to_string();

        if cli.health {
            let health = check_health(&client, &api_url)
                .await
                .context("Health check failed")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Status:      {}", health.status);
                println!("Service:     {}", health.service);
                println!("Version:     {}", health.version);
                if let Some(ref limit) = health.rate_limit {
                    println!("Rate limit:  {}", limit);
                }
            }
            if !health.is_ok() {
                anyhow::bail!("Service reports status '{}'", health.status);
            }
        } else {
            let usage = fetch_usage(&client, &api_url)
                .await
                .context("Usage query failed")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&usage)?);
            } else {
                println!("IP:          {}", usage.ip);
                println!("Used:        {}/{}", usage.used, usage.limit);
                println!("Remaining:   {}", usage.remaining);
                println!("Resets in:   {}", usage.reset_in);
            }
        }
        return Ok(());
    }

    // ── Build request & pipeline ─────────────────────────────────────────
    let request = build_request(&cli)?;
    let pipeline = ConversionPipeline::with_options(&options)
        .context("Failed to set up conversion pipeline")?
        .notifier(CliNotifier::new(!show_spinner))
        .downloader(Arc::new(FileDownloadTrigger::new(&cli.dir)));

    // ── Run conversion ───────────────────────────────────────────────────
    // The notifier already printed the failure; add the service's own
    // explanation (e.g. the daily quota on 429), then exit.
    let output = match pipeline.run(request).await {
        Ok(output) => output,
        Err(e) => {
            if let Some(detail) = e.detail() {
                eprintln!("  {}", dim(detail));
            }
            std::process::exit(1);
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let saved = output
            .receipt
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| output.filename.clone());
        eprintln!(
            "   {}  {}",
            bold(&saved),
            dim(&format!(
                "{} → {} bytes, {}ms",
                output.stats.source_bytes,
                output.stats.converted_bytes,
                output.stats.total_duration_ms
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionRequest`.
fn build_request(cli: &Cli) -> Result<ConversionRequest> {
    let mut builder = ConversionRequest::builder();
    if let Some(ref url) = cli.file_url {
        builder = builder.file_url(url);
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_url(url);
    }
    if let Some(ref name) = cli.output {
        builder = builder.output_filename(name);
    }
    if let Some(ref message) = cli.loading_message {
        builder = builder.loading_message(message);
    }
    builder.build().context("Invalid configuration")
}
