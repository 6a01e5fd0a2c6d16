//! Application configuration for Courtline.
//!
//! User config lives at `~/.courtline/courtline.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CourtlineError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "courtline.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".courtline";

// ---------------------------------------------------------------------------
// Config structs (matching courtline.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Timeline enrichment policies.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding Stage-1 output (nested `page*.json` files).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Path to the checkpoint ledger database.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// Path for the augmented output dataset (JSON Lines).
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ledger_path: default_ledger_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_data_dir() -> String {
    "data/raw".into()
}
fn default_ledger_path() -> String {
    "data/interim/checkpoint.db".into()
}
fn default_output_path() -> String {
    "data/interim/augmented_decisions.jsonl".into()
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Base URL of the infosoud search endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total fetch attempts per case before marking it failed-exhausted.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Network attempts within a single fetch call before it reports a
    /// transient failure.
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// Base backoff delay in ms, doubled per attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Backoff ceiling in ms.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Minimum ms between requests to the external source.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retry_budget: default_retry_budget(),
            fetch_attempts: default_fetch_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://infosoud.justice.cz/InfoSoud/public/search.do".into()
}
fn default_retry_budget() -> u32 {
    3
}
fn default_fetch_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    500
}
fn default_backoff_max_ms() -> u64 {
    8_000
}
fn default_rate_limit() -> u64 {
    200
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Enrich config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime enrichment configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Base URL of the infosoud search endpoint.
    pub base_url: String,
    /// Total fetch attempts per case before failed-exhausted.
    pub retry_budget: u32,
    /// Network attempts within a single fetch call.
    pub fetch_attempts: u32,
    /// Base backoff delay in ms.
    pub backoff_base_ms: u64,
    /// Backoff ceiling in ms.
    pub backoff_max_ms: u64,
    /// Minimum ms between requests to the external source.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for EnrichConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.enrichment.base_url.clone(),
            retry_budget: config.enrichment.retry_budget,
            fetch_attempts: config.enrichment.fetch_attempts,
            backoff_base_ms: config.enrichment.backoff_base_ms,
            backoff_max_ms: config.enrichment.backoff_max_ms,
            rate_limit_ms: config.enrichment.rate_limit_ms,
            timeout_secs: config.enrichment.timeout_secs,
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.courtline/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CourtlineError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.courtline/courtline.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CourtlineError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CourtlineError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CourtlineError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CourtlineError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CourtlineError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("infosoud.justice.cz"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.enrichment.retry_budget, 3);
        assert_eq!(parsed.enrichment.rate_limit_ms, 200);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[enrichment]
retry_budget = 5
rate_limit_ms = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.enrichment.retry_budget, 5);
        assert_eq!(config.enrichment.rate_limit_ms, 0);
        // untouched fields keep defaults
        assert_eq!(config.enrichment.timeout_secs, 30);
        assert_eq!(config.defaults.data_dir, "data/raw");
    }

    #[test]
    fn enrich_config_from_app_config() {
        let app = AppConfig::default();
        let enrich = EnrichConfig::from(&app);
        assert_eq!(enrich.retry_budget, 3);
        assert_eq!(enrich.backoff_base_ms, 500);
        assert_eq!(enrich.timeout_secs, 30);
    }
}
