use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, WorkerError};
use uuid::Uuid;

const DEFAULT_CONDUCTOR_SERVER_URL: &str = "https://admin.triggerbird.com/api";
const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MISTRAL_API_BASE: &str = "https://api.mistral.ai/v1";
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_PII_SERVICE_URL: &str = "http://localhost:8001";
const DEFAULT_TRANSLATION_SERVICE_URL: &str = "http://localhost:8002";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Process-wide settings, read once at start-up and handed to the clients.
#[derive(Debug, Clone)]
pub struct Settings {
    pub conductor: ConductorSettings,
    pub groq: ProviderSettings,
    pub mistral: ProviderSettings,
    pub ollama: ProviderSettings,
    pub pii: ProviderSettings,
    pub translation: ProviderSettings,
    pub http_timeout: Duration,
    /// Local health/invoke server, disabled when unset.
    pub http_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone)]
pub struct ConductorSettings {
    pub server_url: String,
    pub auth_token: Option<String>,
    pub worker_id: String,
    pub domain: Option<String>,
    pub poll_interval: Duration,
    // polling loops per task type
    pub concurrency: usize,
    pub report_failures: bool,
}

#[derive(Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Settings {
    /// Process env first, then `.env`, then the built-in default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok().or_else(|| dotenv::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let concurrency: usize = parse_var(&get, "WORKER_CONCURRENCY", 1)?;
        if concurrency == 0 {
            return Err(WorkerError::Config(
                "Invalid value for WORKER_CONCURRENCY: must be at least 1".to_string(),
            ));
        }

        let http_addr = match get("HTTP_ADDR") {
            Some(raw) => Some(
                raw.parse::<SocketAddr>()
                    .map_err(|e| WorkerError::Config(format!("Invalid value for HTTP_ADDR: {} ({})", raw, e)))?,
            ),
            None => None,
        };

        Ok(Self {
            conductor: ConductorSettings {
                server_url: trim_slash(get_or("CONDUCTOR_SERVER_URL", DEFAULT_CONDUCTOR_SERVER_URL)),
                auth_token: get("CONDUCTOR_AUTH_TOKEN"),
                worker_id: get("WORKER_ID").unwrap_or_else(|| format!("worker-{}", Uuid::new_v4())),
                domain: get("WORKER_DOMAIN"),
                poll_interval: Duration::from_millis(parse_var(
                    &get,
                    "WORKER_POLL_INTERVAL_MS",
                    DEFAULT_POLL_INTERVAL_MS,
                )?),
                concurrency,
                report_failures: parse_bool(&get, "WORKER_REPORT_FAILURES", false)?,
            },
            groq: ProviderSettings {
                base_url: trim_slash(get_or("GROQ_API_BASE", DEFAULT_GROQ_API_BASE)),
                api_key: get("GROQ_API_KEY"),
            },
            mistral: ProviderSettings {
                base_url: trim_slash(get_or("MISTRAL_API_BASE", DEFAULT_MISTRAL_API_BASE)),
                api_key: get("MISTRAL_API_KEY"),
            },
            ollama: ProviderSettings {
                base_url: trim_slash(get_or("OLLAMA_HOST", DEFAULT_OLLAMA_HOST)),
                api_key: None,
            },
            pii: ProviderSettings {
                base_url: trim_slash(get_or("PII_SERVICE_URL", DEFAULT_PII_SERVICE_URL)),
                api_key: get("PII_SERVICE_KEY"),
            },
            translation: ProviderSettings {
                base_url: trim_slash(get_or("TRANSLATION_SERVICE_URL", DEFAULT_TRANSLATION_SERVICE_URL)),
                api_key: get("TRANSLATION_SERVICE_KEY"),
            },
            http_timeout: Duration::from_secs(parse_var(&get, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?),
            http_addr,
        })
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| WorkerError::Config(format!("Invalid value for {}: {} ({})", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        Some(v) if ["1", "true", "yes", "on"].contains(&v.as_str()) => Ok(true),
        Some(v) if ["0", "false", "no", "off"].contains(&v.as_str()) => Ok(false),
        Some(v) => Err(WorkerError::Config(format!("Invalid value for {}: {}", key, v))),
        None => Ok(default),
    }
}
