// src/oauth.rs
// Bearer-token supply for adapters that need one. Tokens live in an explicit
// bounded store with TTL eviction, passed by reference to whoever needs it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::{ConfigError, LinkAggregatorConfig};

/// Supplies a bearer token on demand. `None` means "no token right now";
/// adapters must degrade to an empty fetch, never fail the pipeline.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Option<String>;
}

/// Always token-less. Default collaborator when credentials are absent.
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn get_token(&self) -> Option<String> {
        None
    }
}

/// Fixed token, for tests and pre-provisioned deployments.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Bounded in-memory token cache with TTL eviction on access. Capacity
/// eviction drops the entry closest to expiry.
#[derive(Debug)]
pub struct TokenStore {
    capacity: usize,
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl TokenStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.lock().expect("token store mutex poisoned");
        let now = Instant::now();
        entries.retain(|_, t| t.expires_at > now);
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, t)| t.expires_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key.to_string(),
            CachedToken {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("token store mutex poisoned");
        let now = Instant::now();
        entries.retain(|_, t| t.expires_at > now);
        entries.get(key).map(|t| t.value.clone())
    }

    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().expect("token store mutex poisoned");
        let now = Instant::now();
        entries.retain(|_, t| t.expires_at > now);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

const TOKEN_CACHE_KEY: &str = "link_aggregator";
// Refresh a little early so a token never expires mid-run.
const EXPIRY_SLACK_SECS: u64 = 60;

/// Client-credentials token exchange against the link-aggregator API, with
/// the resulting token cached until shortly before expiry.
#[derive(Debug)]
pub struct ClientCredentialsAuth {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: TokenStore,
}

impl ClientCredentialsAuth {
    /// Fails at construction when credentials are missing, so operators see
    /// "misconfigured" rather than a transient fetch error at run time.
    pub fn new(cfg: &LinkAggregatorConfig, timeout: Duration) -> Result<Self, ConfigError> {
        if cfg.client_id.is_empty() {
            return Err(ConfigError::Missing("link_aggregator.client_id"));
        }
        if cfg.client_secret.is_empty() {
            return Err(ConfigError::Missing("link_aggregator.client_secret"));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|_| ConfigError::Missing("http client"))?;
        Ok(Self {
            http,
            token_url: cfg.token_url.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            cache: TokenStore::new(8),
        })
    }

    async fn exchange(&self) -> anyhow::Result<TokenResponse> {
        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<TokenResponse>().await?)
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsAuth {
    async fn get_token(&self) -> Option<String> {
        if let Some(tok) = self.cache.get(TOKEN_CACHE_KEY) {
            return Some(tok);
        }
        match self.exchange().await {
            Ok(resp) => {
                let ttl =
                    Duration::from_secs(resp.expires_in.saturating_sub(EXPIRY_SLACK_SECS).max(1));
                self.cache.put(TOKEN_CACHE_KEY, resp.access_token.clone(), ttl);
                Some(resp.access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token exchange failed, adapter will skip this run");
                None
            }
        }
    }
}
