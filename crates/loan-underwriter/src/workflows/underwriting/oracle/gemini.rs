//! Gemini `generateContent` adapter.
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key).with_model("gemini-2.0-flash-lite");
//! let oracle = GeminiOracle::new(config)?;
//! let reply = oracle.complete(&prompt).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{CompletionOracle, OracleError, OracleReply};
use crate::config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for the Gemini API. The credential is passed in
/// explicitly and never read from the environment here.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// `None` waits on the service indefinitely.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(Secret::new(api_key.into()))
    }

    pub fn from_secret(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_key(&self) -> &Secret<String> {
        &self.api_key
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn single_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

pub struct GeminiOracle {
    config: GeminiConfig,
    client: Client,
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig) -> Result<Self, OracleError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(OracleError::Client)?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionOracle for GeminiOracle {
    async fn complete(&self, prompt: &str) -> Result<OracleReply, OracleError> {
        info!(model = %self.config.model, prompt_chars = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(self.config.generate_url())
            .header(API_KEY_HEADER, self.config.api_key.expose_secret().as_str())
            .json(&GenerateRequest::single_prompt(prompt))
            .send()
            .await
            .map_err(OracleError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(OracleError::Transport)?;
        debug!(%status, body_bytes = body.len(), "completion response received");

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(OracleReply::from_body(&body))
    }
}
