use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
///
/// Values come from built-in defaults, then `proposalgen.toml` in the working
/// directory, then `PROPOSALGEN_*` environment variables, in that order.
/// The API key is deliberately not part of this struct; it is only ever read
/// from `GEMINI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub retry: RetryConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port. The `PORT` environment variable takes precedence.
    pub port: u16,
}

/// Gemini backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Model used when discovery fails outright.
    pub default_model: String,
    /// Optional hand-curated candidate list, most capable first.
    /// When non-empty, model discovery is skipped entirely.
    pub candidate_models: Vec<String>,
    /// Per-request timeout for generation calls, in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for the model discovery call, in seconds.
    pub discovery_timeout_secs: u64,
}

/// Retry and fallback tuning for the generation sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per candidate model before advancing to the next one.
    pub max_attempts_per_candidate: u32,
    /// First backoff delay after a rate-limited attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on a single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Wall-clock ceiling for one whole invocation, in milliseconds.
    pub total_budget_ms: u64,
    /// Retry a model that returned an empty or safety-blocked response
    /// instead of advancing to the next candidate.
    pub retry_blocked: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            default_model: "models/gemini-1.5-flash".to_string(),
            candidate_models: Vec::new(),
            request_timeout_secs: 60,
            discovery_timeout_secs: 10,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_candidate: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            total_budget_ms: 120_000,
            retry_blocked: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults on any parse problem.
    pub fn load() -> Self {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("proposalgen.toml"))
            .merge(Env::prefixed("PROPOSALGEN_").split("__"));

        let mut config: AppConfig = match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load configuration: {e} — using defaults");
                AppConfig::default()
            }
        };

        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!("Ignoring unparseable PORT value {port:?}"),
            }
        }

        config
    }

    /// Resolved socket address for the HTTP listener.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or_else(|_| IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.server.port)
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.total_budget_ms)
    }
}
