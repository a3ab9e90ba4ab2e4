use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4400;
const DEFAULT_TOGETHER_MODEL: &str = "meta-llama/Llama-3-70b-chat-hf";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ProviderConfig ───────────────────────────────────────────────────────────

/// Summary-provider credentials (`[providers]` in config.toml, overridable
/// via the conventional env vars).
///
/// A provider with no key configured is silently skipped by the chain; this
/// is how deployments opt out of individual services.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Together.ai API key (`TOGETHER_API_KEY`). None = provider disabled.
    pub together_api_key: Option<String>,
    /// Together.ai chat model (`TOGETHER_MODEL`).
    pub together_model: Option<String>,
    /// Groq API key (`GROQ_API_KEY`). None = provider disabled.
    pub groq_api_key: Option<String>,
    /// Hugging Face Inference API key (`HUGGINGFACE_API_KEY`). None = disabled.
    pub huggingface_api_key: Option<String>,
}

// ─── BackendConfig ────────────────────────────────────────────────────────────

/// Durable backend settings (`[backend]` in config.toml).
///
/// Selection order at store construction: `redis_url`, then the hosted KV
/// REST pair, then no durable backend (file/memory tiers only).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Redis connection string (`REDIS_URL`), e.g. `redis://127.0.0.1:6379`.
    pub redis_url: Option<String>,
    /// Hosted key-value REST endpoint (`KV_REST_API_URL`).
    pub kv_rest_api_url: Option<String>,
    /// Bearer token for the hosted key-value REST endpoint (`KV_REST_API_TOKEN`).
    pub kv_rest_api_token: Option<String>,
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// REST server port (default: 4400).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,pilotd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Durable backend settings (`[backend]`).
    backend: Option<BackendConfig>,
    /// Summary-provider credentials (`[providers]`).
    providers: Option<ProviderConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml, using defaults");
            None
        }
    }
}

fn env_or(var: &str, toml: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty()).or(toml)
}

// ─── DaemonConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub port: u16,
    /// Bind address for the REST server (PILOTD_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Durable backend settings. The selection decision is made once at store
    /// construction and frozen for the process lifetime.
    pub backend: BackendConfig,
    /// Summary-provider credentials, consulted when assembling the chain.
    pub providers: ProviderConfig,
}

impl DaemonConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(port: Option<u16>, data_dir: Option<PathBuf>, log: Option<String>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = env_or("PILOTD_BIND", toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = env_or("PILOTD_LOG_FORMAT", toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let toml_backend = toml.backend.unwrap_or_default();
        let backend = BackendConfig {
            redis_url: env_or("REDIS_URL", toml_backend.redis_url),
            kv_rest_api_url: env_or("KV_REST_API_URL", toml_backend.kv_rest_api_url),
            kv_rest_api_token: env_or("KV_REST_API_TOKEN", toml_backend.kv_rest_api_token),
        };

        let toml_providers = toml.providers.unwrap_or_default();
        let providers = ProviderConfig {
            together_api_key: env_or("TOGETHER_API_KEY", toml_providers.together_api_key),
            together_model: env_or("TOGETHER_MODEL", toml_providers.together_model)
                .or_else(|| Some(DEFAULT_TOGETHER_MODEL.to_string())),
            groq_api_key: env_or("GROQ_API_KEY", toml_providers.groq_api_key),
            huggingface_api_key: env_or("HUGGINGFACE_API_KEY", toml_providers.huggingface_api_key),
        };

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            backend,
            providers,
        }
    }

    /// Path of the file-tier JSON document holding the whole run collection.
    pub fn runs_file(&self) -> PathBuf {
        self.data_dir.join("runs.json")
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/pilotd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("pilotd");
        }
    }

    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/pilotd or ~/.local/share/pilotd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join("pilotd");
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("share").join("pilotd");
        }
    }

    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\pilotd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("pilotd");
        }
    }

    // Last resort: data dir relative to the working directory.
    PathBuf::from(".pilotd")
}
