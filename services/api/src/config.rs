//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which `ContentAnalyzer` implementation backs the analysis endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyzerBackend {
    Mock,
    OpenAi,
}

impl FromStr for AnalyzerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(AnalyzerBackend::Mock),
            "openai" => Ok(AnalyzerBackend::OpenAi),
            other => Err(format!("'{}' is not one of 'mock' or 'openai'", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub analyzer_backend: AnalyzerBackend,
    pub openai_api_key: Option<String>,
    pub analysis_model: String,
    /// Simulated latency before the tutor answers a plain question.
    pub reply_delay: Duration,
    /// Simulated latency before an analysis is requested from the analyzer.
    pub analysis_delay: Duration,
    pub cors_origin: String,
    pub event_channel_capacity: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Analyzer Settings ---
        let analyzer_backend = lookup("ANALYZER_BACKEND")
            .map(|value| value.parse::<AnalyzerBackend>())
            .transpose()
            .map_err(|e| ConfigError::InvalidValue("ANALYZER_BACKEND".to_string(), e))?
            .unwrap_or(AnalyzerBackend::Mock);

        let openai_api_key = lookup("OPENAI_API_KEY");
        if analyzer_backend == AnalyzerBackend::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }
        let analysis_model =
            lookup("ANALYSIS_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        // --- Simulated Latency and Event Fan-out ---
        let reply_delay = Duration::from_millis(parse_number(&lookup, "REPLY_DELAY_MS", 1000)?);
        let analysis_delay =
            Duration::from_millis(parse_number(&lookup, "ANALYSIS_DELAY_MS", 2000)?);
        let event_channel_capacity = parse_number(&lookup, "EVENT_CHANNEL_CAPACITY", 256)?;
        if event_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "EVENT_CHANNEL_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            analyzer_backend,
            openai_api_key,
            analysis_model,
            reply_delay,
            analysis_delay,
            cors_origin,
            event_channel_capacity: event_channel_capacity as usize,
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_the_mock_analyzer() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.analyzer_backend, AnalyzerBackend::Mock);
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.reply_delay, Duration::from_millis(1000));
        assert_eq!(config.analysis_delay, Duration::from_millis(2000));
        assert_eq!(config.event_channel_capacity, 256);
    }

    #[test]
    fn openai_backend_requires_a_key() {
        let err = config_from(&[("ANALYZER_BACKEND", "openai")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "OPENAI_API_KEY"));

        let config =
            config_from(&[("ANALYZER_BACKEND", "OpenAI"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.analyzer_backend, AnalyzerBackend::OpenAi);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("REPLY_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "REPLY_DELAY_MS"));

        let err = config_from(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));

        let err = config_from(&[("ANALYZER_BACKEND", "oracle")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "ANALYZER_BACKEND"));

        let err = config_from(&[("EVENT_CHANNEL_CAPACITY", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }
}
