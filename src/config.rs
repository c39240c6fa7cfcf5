//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::smart::LabelConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where learned locators are persisted
    #[serde(default = "default_patterns_path")]
    pub patterns_path: PathBuf,

    /// Learn new locators after successful standard parses
    #[serde(default = "default_learning")]
    pub learning: bool,

    /// Only learn locators whose value matches the standard parse
    #[serde(default)]
    pub verify_learned: bool,

    /// Store base URL (override for mirrors and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of search results
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Label synonyms used by pattern discovery
    #[serde(default)]
    pub labels: LabelConfig,
}

fn default_patterns_path() -> PathBuf {
    PathBuf::from("data").join("patterns.json")
}

fn default_learning() -> bool {
    true
}

fn default_base_url() -> String {
    "https://lugi.com.ua".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns_path: default_patterns_path(),
            learning: default_learning(),
            verify_learned: false,
            base_url: default_base_url(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            format: OutputFormat::Table,
            labels: LabelConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("smart-parser").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(path) = std::env::var("SMART_PATTERNS") {
            if !path.is_empty() {
                self.patterns_path = PathBuf::from(path);
            }
        }

        if let Ok(proxy) = std::env::var("SMART_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("SMART_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
