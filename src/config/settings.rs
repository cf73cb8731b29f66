//! Settings structures for asset-search configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main settings structure, loaded once at startup and read-only afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub anthropic: AnthropicSettings,
    pub search: SearchSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("ASSET_SEARCH_DEBUG") {
            match parse_flag(&val) {
                Some(debug) => self.general.debug = debug,
                None => tracing::warn!("Ignoring ASSET_SEARCH_DEBUG={:?}: expected true or false", val),
            }
        }
        if let Ok(val) = std::env::var("ASSET_SEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ASSET_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_PER_MINUTE") {
            if let Ok(limit) = val.parse() {
                self.server.rate_limit_per_minute = limit;
            }
        }
        if let Ok(val) = std::env::var("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = val;
        }
        if let Ok(val) = std::env::var("ANTHROPIC_MODEL") {
            self.anthropic.model = val;
        }
        if let Ok(val) = std::env::var("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = val;
        }
        if let Ok(val) = std::env::var("MAX_TOKENS") {
            if let Ok(tokens) = val.parse() {
                self.anthropic.max_tokens = tokens;
            }
        }
        if let Ok(val) = std::env::var("TARGET_WEBSITES") {
            let sites = parse_list(&val);
            if !sites.is_empty() {
                self.search.target_websites = sites;
            }
        }
        if let Ok(val) = std::env::var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("LOGS_DIR") {
            self.storage.logs_dir = PathBuf::from(val);
        }
    }

    /// Check settings for values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.search.target_websites.is_empty() {
            bail!("search.target_websites must name at least one website");
        }
        for site in &self.search.target_websites {
            let parsed = Url::parse(site)
                .map_err(|e| anyhow::anyhow!("invalid target website '{}': {}", site, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("target website '{}' must use http or https", site);
            }
        }
        if self.anthropic.max_tokens == 0 {
            bail!("anthropic.max_tokens must be greater than zero");
        }
        if self.search.max_concurrent_sites == 0 {
            bail!("search.max_concurrent_sites must be greater than zero");
        }
        if let Some(timeout) = self.search.site_timeout {
            check_seconds("search.site_timeout", timeout)?;
        }
        if let Some(timeout) = self.anthropic.request_timeout {
            check_seconds("anthropic.request_timeout", timeout)?;
        }
        self.search.retry.validate()?;
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Name reported by the welcome endpoint
    pub project_name: String,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            project_name: "Construction Asset Search API".to_string(),
            debug: false,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Requests accepted per minute on the API routes (0 disables the limiter)
    pub rate_limit_per_minute: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "0.0.0.0".to_string(),
            rate_limit_per_minute: 60,
        }
    }
}

/// Anthropic Messages API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    pub api_key: String,
    pub model: String,
    /// Token ceiling for one extraction call
    pub max_tokens: u32,
    pub base_url: String,
    /// Value sent in the `anthropic-version` header
    pub api_version: String,
    /// HTTP timeout for one call in seconds
    pub request_timeout: Option<f64>,
}

impl std::fmt::Debug for AnthropicSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 8000,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
            request_timeout: None,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Websites searched for every request, in aggregation order
    pub target_websites: Vec<String>,
    /// How many websites may be searched at once (1 = one after another)
    pub max_concurrent_sites: usize,
    /// Upper bound for a single extraction attempt, in seconds
    pub site_timeout: Option<f64>,
    /// Retry policy for one website
    pub retry: RetrySettings,
}

impl SearchSettings {
    pub fn site_timeout(&self) -> Option<Duration> {
        self.site_timeout
            .filter(|t| *t > 0.0)
            .map(seconds)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            target_websites: default_target_websites(),
            max_concurrent_sites: 1,
            site_timeout: None,
            retry: RetrySettings::default(),
        }
    }
}

/// Exponential backoff between extraction attempts.
///
/// The wait after attempt `n` (1-based) is `multiplier * 2^(n-1)` seconds,
/// clamped to `[min_wait, max_wait]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub min_wait: f64,
    pub max_wait: f64,
}

impl RetrySettings {
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("search.retry.max_attempts must be at least 1");
        }
        check_seconds("search.retry.multiplier", self.multiplier)?;
        check_seconds("search.retry.min_wait", self.min_wait)?;
        check_seconds("search.retry.max_wait", self.max_wait)?;
        if self.min_wait > self.max_wait {
            bail!(
                "search.retry.min_wait ({}) exceeds max_wait ({})",
                self.min_wait,
                self.max_wait
            );
        }
        Ok(())
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait: 4.0,
            max_wait: 10.0,
        }
    }
}

/// On-disk locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root for the `json/` and `csv/` record directories
    pub data_dir: PathBuf,
    /// Directory holding the service log file
    pub logs_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

/// Longest wait or timeout accepted from configuration
const MAX_SECONDS: f64 = 24.0 * 60.0 * 60.0;

fn check_seconds(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a non-negative number of seconds, got {}", name, value);
    }
    if value > MAX_SECONDS {
        bail!("{} must not exceed {} seconds, got {}", name, MAX_SECONDS, value);
    }
    Ok(())
}

/// Convert configured seconds without panicking on out-of-range values
pub fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Default industry listing sites
fn default_target_websites() -> Vec<String> {
    [
        "https://www.forestrytrader.com/listings/search?sort=1",
        "https://www.rbauction.com/",
        "https://www.ritchiespecs.com",
        "https://www.lectura-specs.com/en/specs/forklifts/diesel-forklifts",
        "https://www.ironplanet.com/",
        "https://www.forkliftinventory.com/",
        "https://www.machinerytrader.com/listings/for-sale/forklifts/1036",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
