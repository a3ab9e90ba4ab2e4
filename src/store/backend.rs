// store/backend.rs — Durable key-value backend detection and adapters.
//
// Inspects the backend configuration once, at store construction, and
// produces a tagged handle the store switches on for the rest of the process
// lifetime. A connection or credential failure during selection is never
// fatal: it logs and degrades to the next option. Per-call failures of the
// chosen backend are handled by the store's tier fallthrough, never by
// re-selecting here.

use anyhow::{bail, Context as _, Result};
use redis::AsyncCommands;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::BackendConfig;

// ─── Backend ──────────────────────────────────────────────────────────────────

/// The selected durable backend, frozen for the process lifetime.
pub enum Backend {
    /// Direct Redis connection (tier 1).
    Redis(RedisKv),
    /// Hosted key-value service over REST (tier 2).
    HostedKv(RestKv),
    /// No durable backend configured; the store serves from file/memory only.
    None,
}

impl Backend {
    /// Attempt each configured backend in fixed priority order:
    /// Redis connection string, then hosted KV REST credentials, then none.
    pub async fn select(cfg: &BackendConfig) -> Self {
        if let Some(url) = cfg.redis_url.as_deref() {
            match RedisKv::connect(url).await {
                Ok(kv) => {
                    info!("using Redis for durable run storage");
                    return Backend::Redis(kv);
                }
                Err(e) => {
                    warn!(err = %format!("{e:#}"), "Redis connection failed, trying hosted KV");
                }
            }
        }

        if let (Some(url), Some(token)) =
            (cfg.kv_rest_api_url.as_deref(), cfg.kv_rest_api_token.as_deref())
        {
            match RestKv::new(url, token) {
                Ok(kv) => {
                    info!("using hosted KV REST API for durable run storage");
                    return Backend::HostedKv(kv);
                }
                Err(e) => {
                    warn!(err = %format!("{e:#}"), "hosted KV client unavailable, using file/memory storage");
                }
            }
        }

        info!("no durable backend configured, using file/memory storage");
        Backend::None
    }

    /// Whether a durable backend was selected.
    pub fn is_available(&self) -> bool {
        !matches!(self, Backend::None)
    }

    /// Short label for log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            Backend::Redis(_) => "redis",
            Backend::HostedKv(_) => "hosted-kv",
            Backend::None => "none",
        }
    }

    /// Fetch the value at `key`, `None` when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Backend::Redis(kv) => kv.get(key).await,
            Backend::HostedKv(kv) => kv.get(key).await,
            Backend::None => bail!("no durable backend selected"),
        }
    }

    /// Store `value` at `key`, overwriting any previous value.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Backend::Redis(kv) => kv.set(key, value).await,
            Backend::HostedKv(kv) => kv.set(key, value).await,
            Backend::None => bail!("no durable backend selected"),
        }
    }
}

// ─── RedisKv ──────────────────────────────────────────────────────────────────

/// Whole-value get/set over a live Redis connection.
///
/// `ConnectionManager` reconnects on its own after transient drops; a failure
/// that outlives its retries surfaces as a per-call error and the store falls
/// through to the file tier for that call.
pub struct RedisKv {
    manager: redis::aio::ConnectionManager,
}

impl RedisKv {
    async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid Redis connection string")?;
        let manager = client
            .get_connection_manager()
            .await
            .context("failed to connect to Redis")?;
        Ok(Self { manager })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await.context("Redis GET failed")?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(key, value).await.context("Redis SET failed")?;
        Ok(())
    }
}

// ─── RestKv ───────────────────────────────────────────────────────────────────

/// Hosted key-value service speaking the Upstash-style REST protocol:
/// `GET {base}/get/{key}` and `POST {base}/set/{key}` with a bearer token,
/// responses wrapped as `{ "result": ... }`.
pub struct RestKv {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct RestResult {
    result: Option<String>,
}

impl RestKv {
    fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build KV REST client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = format!("{}/get/{key}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("KV REST GET request failed")?
            .error_for_status()
            .context("KV REST GET returned an error status")?;
        let body: RestResult = resp.json().await.context("KV REST GET body was not JSON")?;
        Ok(body.result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let url = format!("{}/set/{key}", self.base_url);
        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await
            .context("KV REST SET request failed")?
            .error_for_status()
            .context("KV REST SET returned an error status")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_config_selects_no_backend() {
        let backend = Backend::select(&BackendConfig::default()).await;
        assert!(!backend.is_available());
        assert_eq!(backend.describe(), "none");
    }

    #[tokio::test]
    async fn unreachable_redis_degrades_without_raising() {
        let cfg = BackendConfig {
            redis_url: Some("redis://127.0.0.1:1/".to_string()),
            ..Default::default()
        };
        let backend = Backend::select(&cfg).await;
        assert!(!backend.is_available());
    }

    #[tokio::test]
    async fn kv_rest_credentials_select_hosted_kv() {
        // Client construction needs no network: selection succeeds even though
        // the endpoint is fictional. Per-call failures are the store's problem.
        let cfg = BackendConfig {
            redis_url: None,
            kv_rest_api_url: Some("https://kv.example.test/".to_string()),
            kv_rest_api_token: Some("tok".to_string()),
        };
        let backend = Backend::select(&cfg).await;
        assert_eq!(backend.describe(), "hosted-kv");
    }

    #[tokio::test]
    async fn get_on_absent_backend_is_an_error() {
        let backend = Backend::select(&BackendConfig::default()).await;
        assert!(backend.get("pilotd:runs").await.is_err());
    }
}
