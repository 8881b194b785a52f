//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MIMESPLIT_CONFIG` (environment variable)
//! 2. `~/.config/mimesplit/config.toml` (Linux/macOS)
//!    `%APPDATA%\mimesplit\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags always win over values from the file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::split::SplitOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Where and how attachment files are written.
    pub output: OutputConfig,
    /// Body text handling.
    pub body: BodyConfig,
    /// Content-type → file extension overrides (e.g. `"application/x-foo" = ".foo"`).
    pub extensions: BTreeMap<String, String>,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also write logs to `mimesplit.log` in the cache directory.
    pub log_file: bool,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Attachment output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default destination directory when `--directory` is not given.
    pub directory: Option<PathBuf>,
    /// Create missing parent directories of the destination as well.
    pub create_parents: bool,
    /// Neutralize path separators and `.`/`..` in declared filenames.
    pub sanitize_filenames: bool,
    /// Prefix of synthesized names for attachments without a filename.
    pub nameless_prefix: String,
}

/// Body text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Charset assumed when the body part declares none (RFC 2045 default).
    pub default_charset: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_file: false,
            cache_dir: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            create_parents: false,
            sanitize_filenames: true,
            nameless_prefix: "nameless-part".to_string(),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            default_charset: "ascii".to_string(),
        }
    }
}

impl Config {
    /// Build the splitter options carried by this configuration.
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            default_charset: self.body.default_charset.clone(),
            nameless_prefix: self.output.nameless_prefix.clone(),
            sanitize_filenames: self.output.sanitize_filenames,
            extension_overrides: self
                .extensions
                .iter()
                .map(|(ctype, ext)| (ctype.to_ascii_lowercase(), normalize_extension(ext)))
                .collect(),
        }
    }
}

/// Make sure a configured extension carries its leading dot.
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MIMESPLIT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mimesplit").join("config.toml"))
}

/// Return the cache directory used for log files.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mimesplit")
}
