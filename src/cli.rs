//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::AnalysisProfile;
use crate::llm::Provider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RepoLens - multi-angle LLM review of a git repository
///
/// Clones a repository, feeds its text files to a language model once per
/// focus topic and renders the answers as an HTML report.
///
/// Examples:
///   repolens serve --port 8000
///   repolens analyze --repo https://github.com/owner/repo.git --analysis-type 2
///   repolens analyze --local ./my-project --profile comprehensive
///   repolens init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .repolens.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Model name to use for analysis
    #[arg(short, long, env = "REPOLENS_MODEL", global = true)]
    pub model: Option<String>,

    /// Model endpoint base URL
    #[arg(long, env = "REPOLENS_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Wire protocol of the model endpoint
    #[arg(long, value_name = "PROVIDER", global = true)]
    pub provider: Option<Provider>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Maximum concurrent model requests
    #[arg(long, value_name = "NUM", global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Review one repository and write the report
    Analyze {
        /// Git repository URL to clone
        #[arg(short, long, value_name = "URL", required_unless_present = "local", conflicts_with = "local")]
        repo: Option<String>,

        /// Local directory to review instead of cloning
        #[arg(long, value_name = "DIR")]
        local: Option<PathBuf>,

        /// Branch to check out
        #[arg(short, long, value_name = "BRANCH")]
        branch: Option<String>,

        /// Analysis type code: 1=default 2=security 3=performance
        /// 4=testing 5=documentation 6=scalability 7=comprehensive
        #[arg(short, long, value_name = "CODE", conflicts_with = "profile")]
        analysis_type: Option<String>,

        /// Analysis profile by name
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Output file path for the HTML report
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the report as JSON to this file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Write a default .repolens.toml to the current directory
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Command::Analyze {
            ref repo,
            ref local,
            ..
        } = self.command
        {
            if let Some(url) = repo {
                crate::repo::validate_repo_url(url).map_err(|e| e.to_string())?;
            }

            if let Some(local_path) = local {
                if !local_path.is_dir() {
                    return Err(format!(
                        "Local path is not a directory: {}",
                        local_path.display()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Resolve the profile requested on the `analyze` command line.
pub fn resolve_profile(analysis_type: Option<&str>, profile: Option<&str>) -> AnalysisProfile {
    match profile {
        Some(name) => AnalysisProfile::from_name(Some(name)),
        None => AnalysisProfile::from_code(analysis_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_analyze() {
        let args = parse(&[
            "repolens",
            "analyze",
            "--repo",
            "https://github.com/test/repo",
            "-a",
            "7",
            "--concurrency",
            "3",
        ]);
        match args.command {
            Command::Analyze {
                ref repo,
                ref analysis_type,
                ..
            } => {
                assert_eq!(repo.as_deref(), Some("https://github.com/test/repo"));
                assert_eq!(analysis_type.as_deref(), Some("7"));
            }
            ref other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.concurrency, Some(3));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_analyze_requires_source() {
        assert!(Args::try_parse_from(["repolens", "analyze"]).is_err());
    }

    #[test]
    fn test_profile_and_code_conflict() {
        let result = Args::try_parse_from([
            "repolens",
            "analyze",
            "--repo",
            "https://github.com/test/repo",
            "-a",
            "2",
            "--profile",
            "testing",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let args = parse(&["repolens", "analyze", "--repo", "invalid-url"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let args = parse(&["repolens", "serve", "--verbose", "--quiet"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let args = parse(&["repolens", "serve", "--concurrency", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["repolens", "serve"]);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_resolve_profile() {
        assert_eq!(resolve_profile(Some("3"), None), AnalysisProfile::Performance);
        assert_eq!(
            resolve_profile(None, Some("documentation")),
            AnalysisProfile::Documentation
        );
        assert_eq!(resolve_profile(Some("42"), None), AnalysisProfile::Default);
        assert_eq!(resolve_profile(None, None), AnalysisProfile::Default);
    }
}
