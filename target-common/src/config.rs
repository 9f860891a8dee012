//! Configuration management for target-scanner.
//!
//! The scanner reads a single optional file at `~/.target-scanner/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (TARGET_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `TARGET_LOG_LEVEL` → observability.log_level
//! - `TARGET_LOG_FORMAT` → observability.log_format
//! - `TARGET_QUOTE_BASE_URL` → provider.base_url

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".target-scanner"),
        |dirs| dirs.home_dir().join(".target-scanner"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Quote provider connection settings
    #[serde(default)]
    pub provider: QuoteProviderConfig,

    /// Industry metrics fed to the estimator
    #[serde(default)]
    pub valuation: ValuationSettings,

    /// Scan driver settings
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    ///
    /// An explicit `path` must exist; without one the default location is
    /// optional.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `TARGET_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("TARGET_LOG_LEVEL") {
            self.observability.log_level = level;
        }

        if let Some(format) = lookup("TARGET_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(url) = lookup("TARGET_QUOTE_BASE_URL") {
            self.provider.base_url = url;
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Connection settings for the quote-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteProviderConfig {
    /// Base URL of the quote host (scheme + host, no path)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for QuoteProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            user_agent: default_user_agent(),
        }
    }
}

/// Industry metrics used by the target-price heuristics.
///
/// `industry_ps_ratio` and `discount_rate` are carried but not read by any
/// formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationSettings {
    #[serde(default = "default_revenue_growth_rate")]
    pub revenue_growth_rate: f64,
    #[serde(default = "default_profit_margin_improvement")]
    pub profit_margin_improvement: f64,
    #[serde(default = "default_industry_ps_ratio")]
    pub industry_ps_ratio: f64,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            revenue_growth_rate: default_revenue_growth_rate(),
            profit_margin_improvement: default_profit_margin_improvement(),
            industry_ps_ratio: default_industry_ps_ratio(),
            discount_rate: default_discount_rate(),
        }
    }
}

/// Names accepted in `scan.segments`, compared case-insensitively.
pub const SEGMENT_NAMES: &[&str] = &[
    "sh", "sse", "shanghai",
    "sz", "szse", "shenzhen",
    "bj", "bse", "beijing",
    "hk", "hkex", "hongkong",
];

/// Scan driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Market segments scanned when none are given on the command line
    #[serde(default = "default_segments")]
    pub segments: Vec<String>,

    /// Overrides the per-segment currency prefix in reports
    #[serde(default)]
    pub currency_prefix: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            segments: default_segments(),
            currency_prefix: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_base_url() -> String {
    "https://82.push2.eastmoney.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_size() -> u32 {
    100
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".into()
}
fn default_revenue_growth_rate() -> f64 {
    0.20
}
fn default_profit_margin_improvement() -> f64 {
    0.02
}
fn default_industry_ps_ratio() -> f64 {
    3.5
}
fn default_discount_rate() -> f64 {
    0.10
}
fn default_segments() -> Vec<String> {
    vec!["bj".into()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.provider.page_size, 100);
        assert_eq!(config.valuation.revenue_growth_rate, 0.20);
        assert_eq!(config.valuation.profit_margin_improvement, 0.02);
        assert_eq!(config.valuation.industry_ps_ratio, 3.5);
        assert_eq!(config.valuation.discount_rate, 0.10);
        assert_eq!(config.scan.segments, vec!["bj".to_string()]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"valuation": {{"revenue_growth_rate": 0.3}}, "observability": {{"level": "debug"}}}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.valuation.revenue_growth_rate, 0.3);
        assert_eq!(config.valuation.profit_margin_improvement, 0.02);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.provider.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"$schema": "./config.schema.json", "scan": {{"segments": ["hk"]}}}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.scan.segments, vec!["hk".to_string()]);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_load_from_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TARGET_LOG_LEVEL", "trace"),
            ("TARGET_QUOTE_BASE_URL", "http://127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.observability.log_level, "trace");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.provider.base_url, "http://127.0.0.1:9000");
    }
}
