//! cfpdf command-line front end.
//!
//! Converts one problem (or with `--all`, a whole contest) into PDFs in the
//! output directory. A problem that cannot be fetched still produces its
//! placeholder document and exits 0; Ctrl-C exits 130, faults exit 1.

use anyhow::{Context, Result};
use cfpdf_client::{FetchConfig, HeadlessRenderer, Pipeline, ReqwestTransport, write_bytes, write_document};
use cfpdf_core::{AppConfig, ProblemReference, RenderMode, TracingReporter};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Download and convert Codeforces problems to PDF.
#[derive(Debug, Parser)]
#[command(name = "cfpdf", version, about = "Download and convert Codeforces problems to PDF")]
struct Cli {
    /// Codeforces contest ID (e.g., 1234).
    contest_id: u32,

    /// Problem letter (e.g., A, B, C). Required unless `--all` is given.
    #[arg(required_unless_present = "all")]
    problem: Option<String>,

    /// Use fast rendering mode.
    #[arg(short, long, conflicts_with = "graphics")]
    fast: bool,

    /// Use graphics rendering mode.
    #[arg(short, long)]
    graphics: bool,

    /// Output directory for the PDF files (default: current directory).
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Convert every problem of the contest and bundle them into a zip.
    #[arg(long)]
    all: bool,
}

impl Cli {
    fn mode(&self) -> RenderMode {
        if self.fast {
            RenderMode::Fast
        } else if self.graphics {
            RenderMode::Graphics
        } else {
            RenderMode::Default
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Unexpected error: {e:#}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::error!("Operation cancelled by user");
            ExitCode::from(130)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    let mode = cli.mode();
    let output_dir = cli.output_dir();

    let transport = ReqwestTransport::new(FetchConfig::from(&config))?;
    let renderer = HeadlessRenderer::new().await.context("launching headless browser")?;
    let pipeline = Pipeline::from_config(&config, Arc::new(transport), Arc::new(renderer), Arc::new(TracingReporter));

    if cli.all {
        let report = pipeline.run_contest(cli.contest_id, mode).await?;
        for document in report.documents() {
            write_document(&output_dir, document).await?;
        }

        let archive = report.to_archive()?;
        let path = write_bytes(&output_dir, &report.archive_name(), &archive).await?;
        tracing::info!("{}; archive saved to {}", report.summary().message(), path.display());
        return Ok(());
    }

    let problem = cli.problem.as_deref().context("problem is required without --all")?;
    let reference = ProblemReference::new(cli.contest_id, problem)?;

    let outcome = pipeline.run(&reference, mode).await?;
    if let Some(exhausted) = &outcome.warning {
        tracing::warn!("could not fetch {reference}, saving placeholder: {}", exhausted.summary());
    }

    let path = write_document(&output_dir, &outcome.document).await?;
    tracing::info!("PDF saved to {}", path.display());
    Ok(())
}
