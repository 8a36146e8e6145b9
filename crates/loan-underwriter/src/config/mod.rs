use secrecy::Secret;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::workflows::underwriting::oracle::gemini::GeminiConfig;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Top-level configuration for the underwriter.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oracle: OracleSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Secret::new);
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        let timeout = match env::var("GEMINI_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidTimeout { value: raw })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            oracle: OracleSettings {
                api_key,
                model,
                base_url,
                timeout,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for the remote completion oracle.
///
/// The credential stays optional here so that input validation can run
/// without one; it is only demanded when the adapter is built.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl OracleSettings {
    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;

        let mut config = GeminiConfig::from_secret(api_key)
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone());
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    InvalidTimeout { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiKey => {
                write!(f, "GEMINI_API_KEY must be set to call the completion oracle")
            }
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "GEMINI_TIMEOUT_SECS must be a positive whole number of seconds (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
