use std::env;

use anyhow::{Context, anyhow};

pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TRANSPORT_RETRIES: usize = 5;

/// Runtime configuration for the gateway. Model-provider settings come from
/// the environment (optionally a `.env` file); the listen address and the
/// per-row retry budget come from the command line.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub deployment: String,
    /// Fixed at 0 so batch runs are deterministic enough to retry.
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Transport-level retry cap inside the model client, beneath the
    /// integrator's own per-row budget.
    pub max_retries: usize,
    /// Per-row retry budget of the integrator (total attempts = max_retry + 1).
    pub max_retry: usize,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Ok(GatewayConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_key: required("AZURE_API_KEY")?,
            endpoint: required("AZURE_ENDPOINT")?,
            api_version: required("OPENAI_API_VERSION")?,
            deployment: env::var("AZURE_DEPLOYMENT").unwrap_or_else(|_| DEFAULT_DEPLOYMENT.to_string()),
            temperature: 0.0,
            timeout_secs: optional("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            max_retries: optional("LLM_MAX_RETRIES", DEFAULT_TRANSPORT_RETRIES)?,
            max_retry: 0,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow!("missing required environment variable {name}"))
}

fn optional<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {name}")),
        Err(_) => Ok(default),
    }
}
