// src/config.rs
// Runtime configuration: TOML file (env-selectable path) with built-in
// defaults, plus env overrides for secrets.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETENTION_DAYS, DEFAULT_TOP_N};

pub const ENV_CONFIG_PATH: &str = "HOTKEYS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/hotkeys.toml";

/// Configuration problems are a distinct error kind so operators can tell
/// "misconfigured" apart from "upstream flaky".
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between scheduled pipeline runs.
    pub collection_interval_secs: u64,
    /// Ranked entries retained per run.
    pub top_n: usize,
    /// Rows older than this (by `updated_at`) are swept daily.
    pub retention_days: i64,
    /// Upstream fetch / token exchange timeout.
    pub request_timeout_secs: u64,
    /// HTTP listen address.
    pub bind_addr: String,
    pub social_trends: SocialTrendsConfig,
    pub link_aggregator: LinkAggregatorConfig,
    pub search_trends: SearchTrendsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collection_interval_secs: 30 * 60,
            top_n: DEFAULT_TOP_N,
            retention_days: DEFAULT_RETENTION_DAYS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            bind_addr: "0.0.0.0:8080".to_string(),
            social_trends: SocialTrendsConfig::default(),
            link_aggregator: LinkAggregatorConfig::default(),
            search_trends: SearchTrendsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialTrendsConfig {
    pub base_url: String,
    /// Bearer token; empty means the adapter skips its fetch.
    pub bearer_token: String,
    /// WOEIDs to poll, e.g. "1" (global), "23424977" (US).
    pub woeids: Vec<String>,
}

impl Default for SocialTrendsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".to_string(),
            bearer_token: String::new(),
            woeids: vec!["1".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkAggregatorConfig {
    pub base_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub communities: Vec<String>,
    pub per_community_limit: usize,
}

impl Default for LinkAggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oauth.reddit.com".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "world-hotkeys/0.1".to_string(),
            communities: vec![
                "popular".to_string(),
                "worldnews".to_string(),
                "news".to_string(),
                "technology".to_string(),
            ],
            per_community_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchTrendsConfig {
    pub base_url: String,
    /// Geo codes to poll in order.
    pub geos: Vec<String>,
    /// Pause between per-geo requests, to stay under rate limits.
    pub pacing_millis: u64,
}

impl Default for SearchTrendsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trends.google.com".to_string(),
            geos: vec![
                "US".to_string(),
                "CN".to_string(),
                "GB".to_string(),
                "DE".to_string(),
                "JP".to_string(),
                "IN".to_string(),
            ],
            pacing_millis: 2000,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg: AppConfig = toml::from_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load using `$HOTKEYS_CONFIG_PATH`, then `config/hotkeys.toml`, then
    /// built-in defaults. A configured-but-missing path is an error; an
    /// absent default file is not.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Secrets come from the environment when present, so a committed config
    /// file never needs to carry credentials.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SOCIAL_TRENDS_BEARER_TOKEN") {
            self.social_trends.bearer_token = v;
        }
        if let Ok(v) = std::env::var("LINK_AGGREGATOR_CLIENT_ID") {
            self.link_aggregator.client_id = v;
        }
        if let Ok(v) = std::env::var("LINK_AGGREGATOR_CLIENT_SECRET") {
            self.link_aggregator.client_secret = v;
        }
    }
}
