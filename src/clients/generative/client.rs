use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use super::models::{GenerateRequest, GenerateResponse, GenerationConfig, truncate_error_message};
use crate::config::LlmConfig;
use crate::util::retry::{RetryConfig, is_retryable_error, is_retryable_status};

/// Client for a `generateContent`-style generative-language endpoint.
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    client: Client,
    endpoint: Url,
    model: String,
    retry: RetryConfig,
}

enum AttemptError {
    Retryable(anyhow::Error),
    Fatal(anyhow::Error),
}

impl GenerativeClient {
    /// # Errors
    /// Fails when the HTTP client cannot be built or the endpoint URL is invalid.
    pub fn new(config: &LlmConfig, retry: RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build generative client")?;

        let mut endpoint = config
            .base_url()
            .join(&format!("v1beta/models/{}:generateContent", config.model()))
            .context("failed to build generateContent URL")?;
        endpoint
            .query_pairs_mut()
            .append_pair("key", config.api_key());

        Ok(Self {
            client,
            endpoint,
            model: config.model().to_string(),
            retry,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the first text part of the first candidate.
    ///
    /// # Errors
    /// Fails after exhausting retries, on a non-retryable status, or when the
    /// reply carries no text.
    pub async fn generate(&self, prompt: &str, generation: GenerationConfig) -> Result<String> {
        let request = GenerateRequest::new(prompt, generation);
        let mut attempt = 0;

        loop {
            let error = match self.attempt(&request).await {
                Ok(text) => {
                    if attempt > 0 {
                        info!(attempt, model = %self.model, "generate succeeded after retry");
                    }
                    return Ok(text);
                }
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::Retryable(error)) => error,
            };

            attempt += 1;
            if !self.retry.can_retry(attempt) {
                warn!(
                    attempt,
                    max_attempts = self.retry.max_attempts,
                    "generate failed after all retries"
                );
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis(),
                error = %error,
                "generate failed, retrying after delay"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, request: &GenerateRequest<'_>) -> Result<String, AttemptError> {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                let retryable = is_retryable_error(&error);
                let error = anyhow::Error::new(error).context("generateContent request failed");
                return Err(if retryable {
                    AttemptError::Retryable(error)
                } else {
                    AttemptError::Fatal(error)
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = anyhow!(
                "generateContent returned error status {status}: {}",
                truncate_error_message(&body)
            );
            return Err(if is_retryable_status(status) {
                AttemptError::Retryable(error)
            } else {
                AttemptError::Fatal(error)
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("failed to deserialize generateContent response")
            .map_err(AttemptError::Fatal)?;

        let text = parsed
            .into_first_text()
            .ok_or_else(|| AttemptError::Fatal(anyhow!("generateContent returned no text candidate")))?;
        debug!(model = %self.model, chars = text.len(), "received generateContent reply");
        Ok(text)
    }

    /// One-line creative description of a finished playlist.
    ///
    /// # Errors
    /// Propagates the failure of the underlying call; callers fall back to
    /// [`fallback_description`].
    pub async fn describe_playlist(
        &self,
        mood: &str,
        track_count: usize,
        total_duration_ms: u64,
    ) -> Result<String> {
        let minutes = (total_duration_ms + 30_000) / 60_000;
        let prompt = format!(
            "Generate a short, creative playlist description (max 100 characters) for a mood-based playlist.\n\
             Mood: \"{mood}\"\n\
             Tracks: {track_count}\n\
             Duration: {minutes} minutes\n\n\
             Respond with ONLY the description text, no quotes."
        );
        let text = self.generate(&prompt, GenerationConfig::DESCRIPTION).await?;
        let description = text.trim().trim_matches('"').trim().to_string();
        if description.is_empty() {
            return Err(anyhow!("empty playlist description"));
        }
        Ok(description)
    }
}

/// Description used when the generative call is unavailable.
#[must_use]
pub fn fallback_description(mood: &str) -> String {
    let head: String = mood.chars().take(50).collect();
    format!("Mood playlist: {head}")
}
