use log::{error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::OllamaConfig;
use crate::errors::ClientError;

/// Timeout for the lightweight connectivity probe
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Backoff cap between retry attempts
const MAX_BACKOFF_SECS: u64 = 30;

/// Delay before attempt `attempt + 1`, given that attempt `attempt` failed.
///
/// Exponential: `min(2^attempt, 30)` seconds, attempt numbering starting at 1.
pub fn backoff_delay(attempt: u32) -> Duration {
    let secs = 2u64
        .checked_pow(attempt)
        .unwrap_or(u64::MAX)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Whether to stream the response; always false here
    stream: bool,
    /// Sampling parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
}

/// Sampling options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus-sampling probability mass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Repeat penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub response: String,
    /// Context for future generations; opaque, captured but not reused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    /// Whether the generation is complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    /// Total duration of the request in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Builder methods for GenerationRequest
impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            stream: false,
            options: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling options
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// The prompt text of this request
    pub fn prompt_text(&self) -> &str {
        &self.prompt
    }
}

/// Client for the Ollama generate endpoint, with retry and backoff
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Full URL of the generate endpoint
    url: String,
    /// Model name sent with every request
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Nucleus-sampling probability mass
    top_p: f32,
    /// Repeat penalty
    repeat_penalty: f32,
    /// Default retry attempts per translation
    retries: u32,
    /// HTTP client with the configured request timeout
    client: Client,
}

impl OllamaClient {
    /// Create a client from backend configuration
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            url: config.url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            repeat_penalty: config.repeat_penalty,
            retries: config.retries,
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// The endpoint URL this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The configured default retry count
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Build a generation request for the given text and system instruction
    pub fn build_request(&self, prompt: &str, system_prompt: &str) -> GenerationRequest {
        GenerationRequest::new(&self.model, prompt)
            .system(system_prompt)
            .options(GenerationOptions {
                temperature: Some(self.temperature),
                top_p: Some(self.top_p),
                repeat_penalty: Some(self.repeat_penalty),
            })
    }

    /// Send one generation request, without retrying.
    ///
    /// Transport failures are classified as `ConnectionFailure` or `Timeout`;
    /// a non-2xx status, an unparseable body, or a body missing the
    /// `response` field all classify as `ApiError`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(ClientError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str::<GenerationResponse>(&body).map_err(|e| ClientError::ApiError {
            status_code: status.as_u16(),
            message: format!("Failed to parse response body: {}", e),
        })
    }

    /// Translate one text unit, retrying transient failures with backoff.
    ///
    /// Makes up to `retries` attempts total (the first attempt counts as
    /// attempt 1), waiting `min(2^attempt, 30)` seconds between attempts.
    /// Returns the trimmed response text; the continuation context is
    /// discarded. After exhausting the budget the last error is wrapped in
    /// an `AggregateFailure`.
    pub async fn translate(
        &self,
        text: &str,
        system_prompt: &str,
        retries: Option<u32>,
    ) -> Result<String, ClientError> {
        let retries = retries.unwrap_or(self.retries).max(1);
        let request = self.build_request(text, system_prompt);

        let mut last_error = None;
        for attempt in 1..=retries {
            match self.generate(&request).await {
                Ok(response) => return Ok(response.response.trim().to_string()),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempt, retries, e);
                    last_error = Some(e);

                    if attempt < retries {
                        let delay = backoff_delay(attempt);
                        info!("Waiting {}s before retrying...", delay.as_secs());
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ClientError::AggregateFailure {
            attempts: retries,
            source: Box::new(last_error.unwrap_or_else(|| {
                ClientError::ConnectionFailure("no attempt was made".to_string())
            })),
        })
    }

    /// Probe the backend with a minimal request.
    ///
    /// Uses a short deadline independent of the configured request timeout.
    pub async fn test_connection(&self) -> bool {
        let probe = GenerationRequest::new(&self.model, "Hello");

        match self
            .client
            .post(&self.url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .json(&probe)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!("Connection test failed: HTTP {}", response.status());
                false
            }
            Err(e) => {
                error!("Connection test failed: {}", e);
                false
            }
        }
    }
}

/// Map a reqwest transport error onto the client error taxonomy
fn classify_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout(error.to_string())
    } else {
        ClientError::ConnectionFailure(error.to_string())
    }
}
