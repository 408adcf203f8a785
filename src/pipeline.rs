//! End-to-end review pipeline: checkout, load, dispatch, render.

use crate::analysis::{AnalysisProfile, DispatchConfig, Dispatcher};
use crate::config::Config;
use crate::llm::CompletionBackend;
use crate::models::{Report, ReportMetadata};
use crate::repo::{self, Checkout, CloneOptions};
use crate::report;
use crate::scanner::{FileScanner, ScanConfig};
use anyhow::Context;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, info_span, Instrument, Span};

/// Where the code under review comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A remote git URL, cloned into a temporary directory.
    Remote(String),
    /// A local directory, read in place.
    Local(PathBuf),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Remote(url) => url.clone(),
            Source::Local(path) => path.display().to_string(),
        }
    }
}

/// Pipeline failures, by stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid repository URL: {0:#}")]
    InvalidUrl(anyhow::Error),

    #[error("checkout failed: {0:#}")]
    Checkout(anyhow::Error),

    #[error("loading project files failed: {0:#}")]
    Load(anyhow::Error),

    #[error("writing report failed: {0:#}")]
    Write(anyhow::Error),
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub profile: AnalysisProfile,
    pub topics: usize,
    pub failed: usize,
    pub duration_seconds: f64,
    /// The report that was rendered.
    pub report: Report,
}

/// Runs reviews against one completion backend.
///
/// Runs are serialized: the report file is shared, so two concurrent runs
/// would otherwise race on it.
pub struct Pipeline<B> {
    dispatcher: Dispatcher<B>,
    scan_config: ScanConfig,
    clone_options: CloneOptions,
    report_path: PathBuf,
    run_lock: Mutex<()>,
    span: Span,
}

impl<B: CompletionBackend> Pipeline<B> {
    /// Build a pipeline from configuration.
    pub fn from_config(config: &Config, backend: B, span: Span) -> anyhow::Result<Self> {
        let dispatch_config = DispatchConfig {
            concurrency: config.analysis.concurrency,
            content_budget: config.analysis.max_content_chars,
        };
        let dispatcher = Dispatcher::new(backend, dispatch_config, span.clone())
            .context("Failed to create analysis dispatcher")?;

        Ok(Self {
            dispatcher,
            scan_config: ScanConfig::from(&config.scanner),
            clone_options: CloneOptions::default(),
            report_path: config.general.report_path.clone(),
            run_lock: Mutex::new(()),
            span,
        })
    }

    /// Replace the clone options (branch, progress bar, target directory).
    pub fn with_clone_options(mut self, options: CloneOptions) -> Self {
        self.clone_options = options;
        self
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn model_name(&self) -> &str {
        self.dispatcher.backend().model_name()
    }

    /// Review `source` with `profile` and write the HTML report.
    pub async fn run(
        &self,
        source: Source,
        profile: AnalysisProfile,
    ) -> Result<RunSummary, PipelineError> {
        let span = info_span!(parent: &self.span, "pipeline", source = %source.label(), profile = %profile);
        self.run_inner(source, profile).instrument(span).await
    }

    async fn run_inner(
        &self,
        source: Source,
        profile: AnalysisProfile,
    ) -> Result<RunSummary, PipelineError> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();
        let label = source.label();

        let checkout = self.checkout(source).await?;
        debug!(
            "Checkout at {} (temporary: {})",
            checkout.path().display(),
            checkout.is_temporary()
        );

        let scanner = FileScanner::new(checkout.path().to_path_buf(), self.scan_config.clone());
        let loaded = tokio::task::spawn_blocking(move || scanner.load())
            .await
            .context("Loader task panicked")
            .and_then(|result| result);
        let corpus = match loaded {
            Ok(corpus) => corpus,
            Err(e) => {
                error!("Error in pipeline: {:#}", e);
                cleanup(checkout);
                return Err(PipelineError::Load(e));
            }
        };

        info!(
            " + Analyzing project with focus on {} (concurrency {})...",
            profile,
            self.dispatcher.config().concurrency
        );
        let results = self.dispatcher.dispatch(&corpus, profile).await;

        info!(" + Generating report...");
        let report = Report {
            metadata: ReportMetadata {
                repo_url: label,
                commit: checkout.commit().map(str::to_string),
                profile: profile.to_string(),
                model_used: self.model_name().to_string(),
                generated_at: Utc::now(),
                files_loaded: corpus.source_count(),
                chunks_loaded: corpus.len(),
                duration_seconds: started.elapsed().as_secs_f64(),
            },
            results,
        };
        let html = report::render_html(&report);
        let written = report::write_report(&html, &self.report_path);

        cleanup(checkout);

        if let Err(e) = written {
            error!("Error in pipeline: {:#}", e);
            return Err(PipelineError::Write(e));
        }

        let summary = RunSummary {
            report_path: self.report_path.clone(),
            profile,
            topics: report.results.len(),
            failed: report.failed_count(),
            duration_seconds: started.elapsed().as_secs_f64(),
            report,
        };
        info!(
            "Review finished: {} topics, {} failed, {:.1}s",
            summary.topics, summary.failed, summary.duration_seconds
        );
        Ok(summary)
    }

    async fn checkout(&self, source: Source) -> Result<Checkout, PipelineError> {
        match source {
            Source::Remote(url) => {
                repo::validate_repo_url(&url).map_err(PipelineError::InvalidUrl)?;
                repo::clone_repository_async(url, self.clone_options.clone())
                    .await
                    .inspect_err(|e| error!("Error in pipeline: {:#}", e))
                    .map_err(PipelineError::Checkout)
            }
            Source::Local(path) => repo::open_local(&path).map_err(PipelineError::Checkout),
        }
    }
}

/// Remove a checkout; failures are logged, the report is already written.
fn cleanup(checkout: Checkout) {
    if let Err(e) = checkout.cleanup() {
        error!("Failed to clean up checkout: {:#}", e);
    }
}
