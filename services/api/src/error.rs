//! services/api/src/error.rs
//!
//! Defines the startup error type for the API service. Request handlers report
//! their own failures as `(StatusCode, String)`.

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configuration could not be loaded from the environment.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other startup failure, e.g. an unusable CORS origin.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn config_failures_convert_with_context() {
        let err: ApiError = Config::from_lookup(|key| match key {
            "BIND_ADDRESS" => Some("not-an-address".to_string()),
            _ => None,
        })
        .unwrap_err()
        .into();

        assert!(matches!(err, ApiError::Config(ConfigError::InvalidValue(ref key, _)) if key == "BIND_ADDRESS"));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
