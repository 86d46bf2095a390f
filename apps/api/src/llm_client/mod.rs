/// LLM Client: the single point of entry for all completion calls in HireFit.
///
/// ARCHITECTURAL RULE: No other module may talk to the inference server directly.
/// Pipeline stages depend on the `CompletionClient` trait, never on `LlmClient`.
///
/// Backend: a locally hosted llama.cpp-compatible server (`POST /completion`,
/// `GET /health`). The model itself is loaded and owned by that server.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const READY_PROBE_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference server error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Inference engine not ready: {0}")]
    NotReady(String),

    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Inference server unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("Inference server returned empty content")]
    EmptyContent,
}

/// "Given a prompt string, return a text completion."
///
/// Malformed output is not an error at this boundary: whatever text the model
/// produced is returned and the response parser decides what to do with it.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Runs one completion bounded by `timeout`. An elapsed timer is reported as
/// `LlmError::Timeout` so callers take the same fallback as any other failure.
pub async fn complete_within(
    client: &dyn CompletionClient,
    prompt: &str,
    timeout: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, client.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    }
}

/// Sampling parameters forwarded with every completion request.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    tokens_evaluated: Option<u32>,
    #[serde(default)]
    tokens_predicted: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
}

/// HTTP completion client for the local inference server.
/// Retries 503 (model still loading) and 5xx responses with exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    sampling: SamplingConfig,
}

impl LlmClient {
    pub fn new(
        base_url: &str,
        sampling: SamplingConfig,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(request_timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            sampling,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single readiness probe against `GET /health`.
    pub async fn check_ready(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        let status = response.status();
        let body: HealthResponse = response.json().await.unwrap_or(HealthResponse { status: None });

        if status.is_success() {
            return Ok(());
        }

        Err(LlmError::NotReady(format!(
            "status {} ({})",
            status.as_u16(),
            body.status.unwrap_or_else(|| "no status".to_string())
        )))
    }

    /// Probes the engine until it reports ready. Exhausting `attempts` is fatal
    /// for the caller: no analysis can run without a loaded model.
    pub async fn wait_until_ready(&self, attempts: u32) -> Result<(), LlmError> {
        let mut last_error = LlmError::NotReady("no readiness probe attempted".to_string());

        for attempt in 1..=attempts.max(1) {
            match self.check_ready().await {
                Ok(()) => {
                    info!("Inference engine ready at {}", self.base_url);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Inference engine not ready (attempt {attempt}/{attempts}): {e}");
                    last_error = e;
                }
            }
            if attempt < attempts {
                tokio::time::sleep(READY_PROBE_INTERVAL).await;
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = CompletionRequest {
            prompt,
            n_predict: self.sampling.max_new_tokens,
            temperature: self.sampling.temperature,
            top_k: self.sampling.top_k,
            top_p: self.sampling.top_p,
            stream: false,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Completion attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(format!("{}/completion", self.base_url))
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Inference server returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let completion: CompletionResponse = response.json().await?;

            debug!(
                "Completion succeeded: tokens_evaluated={:?}, tokens_predicted={:?}",
                completion.tokens_evaluated, completion.tokens_predicted
            );

            if completion.content.trim().is_empty() {
                return Err(LlmError::EmptyContent);
            }

            return Ok(completion.content);
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{HangingCompletion, ScriptedCompletion};
    use super::*;

    #[test]
    fn test_completion_request_uses_llama_cpp_field_names() {
        let body = CompletionRequest {
            prompt: "hi",
            n_predict: 256,
            temperature: 0.1,
            top_k: 30,
            top_p: 0.1,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["n_predict"], 256);
        assert_eq!(json["stream"], false);
        assert_eq!(json["prompt"], "hi");
    }

    #[test]
    fn test_completion_response_tolerates_missing_token_counts() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"content": "ok"}"#).unwrap();
        assert_eq!(parsed.content, "ok");
        assert!(parsed.tokens_predicted.is_none());
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = LlmClient::new(
            "http://127.0.0.1:8081/",
            SamplingConfig {
                max_new_tokens: 16,
                temperature: 0.1,
                top_k: 30,
                top_p: 0.1,
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8081");
    }

    #[tokio::test]
    async fn test_complete_within_passes_through_result() {
        let client = ScriptedCompletion::fixed("hello");
        let text = complete_within(&client, "prompt", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_within_reports_timeout() {
        let result = complete_within(&HangingCompletion, "prompt", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(LlmError::Timeout(d)) if d == Duration::from_secs(5)));
    }
}
