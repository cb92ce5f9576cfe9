use serde::Deserialize;
use std::env;

pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub llm: LlmConfig,
    pub hints: HintsConfig,
    pub metrics_auth: String,
    pub log_format: LogFormat,
}

/// Connection settings for the OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HintsConfig {
    /// Default deadline for a whole hint generation, backend round trip included
    pub timeout_ms: u64,
    pub phrasing_review: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            llm: LlmConfig {
                base_url: DEFAULT_LLM_BASE_URL.to_string(),
                api_key: None,
                model: DEFAULT_LLM_MODEL.to_string(),
                temperature: 0.7,
                max_tokens: 256,
                request_timeout_ms: 10_000,
            },
            hints: HintsConfig {
                timeout_ms: 15_000,
                phrasing_review: true,
            },
            metrics_auth: "admin:changeme".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + ENV overrides (prefix: APP_)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_settings(&settings)
    }

    /// Resolves every key from `settings`, then the legacy environment variable, then the default.
    pub fn from_settings(settings: &config::Config) -> Result<Self, config::ConfigError> {
        let defaults = Config::default();

        let bind_addr = lookup(settings, "server.bind_addr", "BIND_ADDR")
            .unwrap_or(defaults.bind_addr);

        let base_url = lookup(settings, "llm.base_url", "LLM_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.llm.base_url);

        let api_key = lookup(settings, "llm.api_key", "LLM_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .or(defaults.llm.api_key);

        let model = lookup(settings, "llm.model", "LLM_MODEL").unwrap_or(defaults.llm.model);

        let temperature = parse_or(
            settings,
            "llm.temperature",
            "LLM_TEMPERATURE",
            defaults.llm.temperature,
        )?;
        let max_tokens = parse_or(
            settings,
            "llm.max_tokens",
            "LLM_MAX_TOKENS",
            defaults.llm.max_tokens,
        )?;
        let request_timeout_ms = parse_or(
            settings,
            "llm.request_timeout_ms",
            "LLM_REQUEST_TIMEOUT_MS",
            defaults.llm.request_timeout_ms,
        )?;

        let timeout_ms = parse_or(
            settings,
            "hints.timeout_ms",
            "HINTS_TIMEOUT_MS",
            defaults.hints.timeout_ms,
        )?;
        let phrasing_review = parse_or(
            settings,
            "hints.phrasing_review",
            "HINTS_PHRASING_REVIEW",
            defaults.hints.phrasing_review,
        )?;

        let metrics_auth =
            lookup(settings, "metrics.auth", "METRICS_AUTH").unwrap_or(defaults.metrics_auth);
        if metrics_auth == "admin:changeme" && env::var("APP_ENV").as_deref() == Ok("prod") {
            eprintln!("WARNING: /metrics is protected by the default credentials");
        }

        let log_format = match lookup(settings, "logging.format", "LOG_FORMAT") {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) if value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(value) => {
                return Err(config::ConfigError::Message(format!(
                    "Unsupported log format: {}",
                    value
                )))
            }
            None => defaults.log_format,
        };

        Ok(Config {
            bind_addr,
            llm: LlmConfig {
                base_url,
                api_key,
                model,
                temperature,
                max_tokens,
                request_timeout_ms,
            },
            hints: HintsConfig {
                timeout_ms,
                phrasing_review,
            },
            metrics_auth,
            log_format,
        })
    }
}

fn lookup(settings: &config::Config, key: &str, env_key: &str) -> Option<String> {
    settings
        .get_string(key)
        .ok()
        .or_else(|| env::var(env_key).ok())
}

fn parse_or<T>(
    settings: &config::Config,
    key: &str,
    env_key: &str,
    default: T,
) -> Result<T, config::ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(settings, key, env_key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            config::ConfigError::Message(format!("Invalid value for {}: {} ({})", key, raw, e))
        }),
        None => Ok(default),
    }
}
