//! RepoLens - multi-angle LLM review of git repositories
//!
//! Clones a repository, sends its text files to a chat-completion model once
//! per focus topic with bounded concurrency, and renders the answers as an
//! HTML report. Runs either as an HTTP service or as a one-shot CLI.
//!
//! Exit codes:
//!   0 - Success (individual topic failures are reported, not fatal)
//!   1 - Runtime error (configuration, clone failure, report write, etc.)

mod analysis;
mod cli;
mod config;
mod llm;
mod models;
mod pipeline;
mod repo;
mod report;
mod scanner;
mod server;

use anyhow::{Context, Result};
use cli::{Args, Command};
use config::{Config, GeneralConfig, CONFIG_FILE_NAME};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, info_span, Level, Span};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    // The config decides where logs go, so it is loaded before logging starts
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(log_level(&args, &config), &config.general) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }

    info!("RepoLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let root = info_span!("repolens");

    let outcome = match args.command {
        Command::Serve { .. } => server::run_server(&config, root).await,
        Command::Analyze {
            ref repo,
            ref local,
            ref branch,
            ref analysis_type,
            ref profile,
            ref json,
            ..
        } => {
            let profile = cli::resolve_profile(analysis_type.as_deref(), profile.as_deref());
            let clone_options = repo::CloneOptions {
                branch: branch.clone(),
                show_progress: !args.quiet,
                ..repo::CloneOptions::default()
            };
            let source = match (repo, local) {
                (_, Some(path)) => Some(pipeline::Source::Local(path.clone())),
                (Some(url), None) => Some(pipeline::Source::Remote(url.clone())),
                (None, None) => None,
            };
            match source {
                Some(source) => {
                    run_analyze(&config, source, profile, clone_options, json.as_deref(), root)
                        .await
                }
                None => Err(anyhow::anyhow!("Either --repo or --local is required")),
            }
        }
        Command::InitConfig => Ok(()),
    };

    if let Err(e) = outcome {
        error!("RepoLens failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .repolens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize model, concurrency, extensions, and more.");
    Ok(())
}

/// Quiet wins over verbose; the config file can only turn verbose on.
fn log_level(args: &Args, config: &Config) -> Level {
    if args.quiet {
        Level::ERROR
    } else if config.general.verbose {
        Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging: console output plus optional file layers.
fn init_logging(level: Level, general: &GeneralConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("tower_http=warn".parse()?);

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let log_file = match general.log_file {
        Some(ref path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let error_log_file = match general.error_log_file {
        Some(ref path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?))
                .with_filter(LevelFilter::ERROR),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(log_file)
        .with(error_log_file)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        // An explicit path must load
        Some(ref config_path) => Config::load(config_path)?,
        None => match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
                Config::default()
            }
        },
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Run one review from the command line and print a summary.
async fn run_analyze(
    config: &Config,
    source: pipeline::Source,
    profile: analysis::AnalysisProfile,
    clone_options: repo::CloneOptions,
    json_output: Option<&Path>,
    span: Span,
) -> Result<()> {
    let client = llm::ChatClient::new(config.model.client_config())?;
    let client_config = client.config().clone();

    match source {
        pipeline::Source::Remote(ref url) => println!("📥 Cloning repository: {}", url),
        pipeline::Source::Local(ref path) => println!("📂 Using local directory: {}", path.display()),
    }
    println!(
        "🤖 Model: {} ({}, timeout {}s)",
        client_config.model_name, client_config.base_url, client_config.timeout_seconds
    );
    println!(
        "🔬 Profile: {} ({} topics, concurrency {})",
        profile,
        profile.topics().len(),
        config.analysis.concurrency
    );

    let pipeline = pipeline::Pipeline::from_config(config, client, span)?
        .with_clone_options(clone_options);
    let summary = pipeline.run(source, profile).await?;

    if let Some(path) = json_output {
        let json = report::generate_json_report(&summary.report)?;
        report::write_report(&json, path)?;
    }

    print_summary(&summary, &absolute_or_given(&summary.report_path));
    Ok(())
}

fn absolute_or_given(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn print_summary(summary: &pipeline::RunSummary, report_path: &Path) {
    println!("\n📊 Review Summary:");
    println!("   Profile: {}", summary.profile);
    println!(
        "   Topics: {} ({} succeeded, {} failed)",
        summary.topics,
        summary.topics - summary.failed,
        summary.failed
    );
    println!("   Duration: {:.1}s", summary.duration_seconds);
    println!("\n✅ Review complete! Report saved to: {}", report_path.display());
}
