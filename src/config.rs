//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.repolens.toml` files.

use crate::llm::{ClientConfig, Provider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".repolens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Analysis dispatch settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the generated HTML report.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Optional file receiving all log output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Optional file receiving only errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            verbose: false,
            log_file: None,
            error_log_file: None,
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("report.html")
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Wire protocol of the endpoint.
    #[serde(default)]
    pub provider: Provider,

    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            name: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "openai/gpt-4.1-nano".to_string()
}

fn default_base_url() -> String {
    "https://models.github.ai/inference".to_string()
}

fn default_api_key_env() -> String {
    "GITHUB_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_timeout() -> u64 {
    120
}

impl ModelConfig {
    /// Build the client configuration, reading the API key from the
    /// environment.
    pub fn client_config(&self) -> ClientConfig {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        ClientConfig {
            provider: self.provider,
            base_url: self.base_url.clone(),
            model_name: self.name.clone(),
            api_key,
            temperature: self.temperature,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

/// Analysis dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum concurrent model requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum characters of project content per prompt.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

fn default_concurrency() -> usize {
    crate::analysis::DEFAULT_CONCURRENCY
}

fn default_max_content_chars() -> usize {
    crate::analysis::prompt::DEFAULT_CONTENT_BUDGET
}

/// File scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Maximum files to load (0 for no limit).
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory or file names to exclude.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// File names never loaded.
    #[serde(default = "default_ignored_files")]
    pub ignored_files: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between neighbouring chunks in characters.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            extensions: default_extensions(),
            excludes: default_excludes(),
            ignored_files: default_ignored_files(),
            max_file_size: default_max_file_size(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_max_files() -> usize {
    0
}

fn default_extensions() -> Vec<String> {
    vec![
        "py", "md", "txt", "json", "cpp", "log", "ipynb", "yaml", "yml", "toml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excludes() -> Vec<String> {
    vec![
        ".git",
        "__pycache__",
        "node_modules",
        "target",
        ".venv",
        "venv",
        ".idea",
        ".vscode",
        ".mypy_cache",
        ".pytest_cache",
        ".tox",
        ".ipynb_checkpoints",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_ignored_files() -> Vec<String> {
    vec!["__init__.py", ".gitignore", "pyproject.toml"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

fn default_chunk_size() -> usize {
    1500
}

fn default_chunk_overlap() -> usize {
    150
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref base_url) = args.base_url {
            self.model.base_url = base_url.clone();
        }
        if let Some(provider) = args.provider {
            self.model.provider = provider;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(concurrency) = args.concurrency {
            self.analysis.concurrency = concurrency;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        match args.command {
            crate::cli::Command::Serve { ref host, port } => {
                if let Some(host) = host {
                    self.server.host = host.clone();
                }
                if let Some(port) = port {
                    self.server.port = port;
                }
            }
            crate::cli::Command::Analyze { ref output, .. } => {
                if let Some(output) = output {
                    self.general.report_path = output.clone();
                }
            }
            crate::cli::Command::InitConfig => {}
        }
    }

    /// Check values that would make the pipeline unusable.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.concurrency == 0 {
            anyhow::bail!("analysis.concurrency must be at least 1");
        }
        if self.model.timeout_seconds == 0 {
            anyhow::bail!("model.timeout_seconds must be at least 1");
        }
        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            anyhow::bail!("model.base_url must start with 'http://' or 'https://'");
        }
        if self.scanner.chunk_size == 0 {
            anyhow::bail!("scanner.chunk_size must be at least 1");
        }
        if self.scanner.chunk_overlap >= self.scanner.chunk_size {
            anyhow::bail!("scanner.chunk_overlap must be smaller than scanner.chunk_size");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default configuration")
    }
}
