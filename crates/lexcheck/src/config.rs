//! Configuration management for lexcheck using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::UploadLimits;

/// Default backend API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default language used when a code block's language is unsupported.
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "javascript";

/// Default output subdirectory name.
const OUTPUT_SUBDIR: &str = "lexcheck";

/// Errors raised while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend API base URL (endpoints are appended to it).
    pub api_url: String,
    /// Request timeout in seconds. Analyses can take minutes.
    pub request_timeout: u64,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Maximum upload size in bytes.
    pub max_upload_bytes: u64,
    /// Accepted file extensions (lowercase, no dot).
    pub allowed_extensions: Vec<String>,
    /// Highlighter used for unsupported or missing code block languages.
    pub fallback_language: String,
    /// Code block languages that get their own highlighter.
    pub highlight_languages: Vec<String>,
    /// How many times a failed upload is retried before giving up.
    pub upload_retries: u32,
    /// Directory for rendered reports.
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let output_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(OUTPUT_SUBDIR);

        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: 300,
            user_agent: format!("lexcheck/{}", env!("CARGO_PKG_VERSION")),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: default_allowed_extensions(),
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            highlight_languages: default_highlight_languages(),
            upload_retries: 0,
            output_dir,
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    ["txt", "pdf", "doc", "docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_highlight_languages() -> Vec<String> {
    ["javascript", "python", "json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Settings {
    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Upload preconditions derived from these settings.
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_bytes: self.max_upload_bytes,
            allowed_extensions: self.allowed_extensions.clone(),
        }
    }

    /// Ensure the report output directory exists.
    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    self.output_dir.display(),
                    e
                ),
            )
        })
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Backend API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<u64>,
    /// Accepted file extensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub allowed_extensions: Vec<String>,
    /// Fallback code highlighter language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_language: Option<String>,
    /// Extra code block languages to highlight.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub highlight_languages: Vec<String>,
    /// Upload retry count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_retries: Option<u64>,
    /// Report output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no lexcheck config file exists.
    pub async fn load() -> Self {
        match prefer::load("lexcheck").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format implied by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref api_url) = self.api_url {
            settings.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(max) = self.max_upload_bytes {
            settings.max_upload_bytes = max;
        }
        if !self.allowed_extensions.is_empty() {
            settings.allowed_extensions = self
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect();
        }
        if let Some(ref lang) = self.fallback_language {
            settings.fallback_language = lang.to_lowercase();
        }
        for lang in &self.highlight_languages {
            let lang = lang.to_lowercase();
            if !settings.highlight_languages.contains(&lang) {
                settings.highlight_languages.push(lang);
            }
        }
        if let Some(retries) = self.upload_retries {
            settings.upload_retries = u32::try_from(retries).unwrap_or(u32::MAX);
        }
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (from --config).
    pub config_path: Option<PathBuf>,
    /// API URL override (from --api-url or LEXCHECK_API_URL).
    pub api_url: Option<String>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings(options: LoadOptions) -> Result<(Settings, Config), ConfigError> {
    // Priority 1: Explicit --config flag. A broken explicit file is an error.
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        // Priority 2: Auto-discover via prefer
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(ref api_url) = options.api_url {
        settings.api_url = api_url.trim_end_matches('/').to_string();
    }

    tracing::debug!(
        "Settings loaded: api_url={}, config={:?}",
        settings.api_url,
        config.source_path
    );
    Ok((settings, config))
}
