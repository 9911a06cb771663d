use std::{env, time::Duration};

use reqwest::Url;
use thiserror::Error;

use crate::pipeline::config::EngineConfig;
use crate::util::retry::RetryConfig;

/// Largest number of tracks sent to a generative collaborator in one call.
pub const MAX_SAMPLE_SIZE: usize = 50;

/// Connection settings for the generative-language API.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    base_url: Url,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl LlmConfig {
    #[must_use]
    pub fn new(base_url: Url, model: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url,
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    llm: Option<LlmConfig>,
    http_max_retries: usize,
    http_backoff_base_ms: u64,
    http_backoff_cap_ms: u64,
    rank_sample_size: usize,
    feature_sample_size: usize,
    engine: EngineConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Read process configuration from the environment.
    ///
    /// Without `MOOD_LLM_API_KEY` the remote collaborators are disabled and
    /// only the local strategies run.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a numeric value or the base URL
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let llm = match env::var("MOOD_LLM_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
        {
            Some(api_key) => {
                let base_url = parse_url(
                    "MOOD_LLM_BASE_URL",
                    "https://generativelanguage.googleapis.com/",
                )?;
                let model = env::var("MOOD_LLM_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash-lite".to_string());
                let timeout = parse_duration_ms("MOOD_LLM_TIMEOUT_MS", 30_000)?;
                Some(LlmConfig::new(base_url, model, api_key, timeout))
            }
            None => None,
        };

        // Retry settings (exponential backoff + jitter)
        let http_max_retries = parse_usize("HTTP_MAX_RETRIES", 3)?;
        let http_backoff_base_ms = parse_u64("HTTP_BACKOFF_BASE_MS", 250)?;
        let http_backoff_cap_ms = parse_u64("HTTP_BACKOFF_CAP_MS", 10_000)?;

        let rank_sample_size = parse_usize("MOOD_RANK_SAMPLE_SIZE", MAX_SAMPLE_SIZE)?.clamp(1, MAX_SAMPLE_SIZE);
        let feature_sample_size = parse_usize("MOOD_FEATURE_SAMPLE_SIZE", 30)?.clamp(1, MAX_SAMPLE_SIZE);

        Ok(Self {
            llm,
            http_max_retries,
            http_backoff_base_ms,
            http_backoff_cap_ms,
            rank_sample_size,
            feature_sample_size,
            engine: EngineConfig::from_env(),
        })
    }

    #[must_use]
    pub fn llm(&self) -> Option<&LlmConfig> {
        self.llm.as_ref()
    }

    /// The LLM settings, or an error naming the missing key.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when no API key was configured.
    pub fn require_llm(&self) -> Result<&LlmConfig, ConfigError> {
        self.llm
            .as_ref()
            .ok_or(ConfigError::Missing("MOOD_LLM_API_KEY"))
    }

    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.http_max_retries,
            self.http_backoff_base_ms,
            self.http_backoff_cap_ms,
        )
    }

    #[must_use]
    pub fn rank_sample_size(&self) -> usize {
        self.rank_sample_size
    }

    #[must_use]
    pub fn feature_sample_size(&self) -> usize {
        self.feature_sample_size
    }

    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }
}

fn parse_url(name: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    // A trailing slash keeps `Url::join` from dropping the last path segment.
    let normalized = if raw.ends_with('/') { raw } else { format!("{raw}/") };
    Url::parse(&normalized).map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    parse_u64(name, default_ms).map(Duration::from_millis)
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 9] = [
        "MOOD_LLM_API_KEY",
        "MOOD_LLM_BASE_URL",
        "MOOD_LLM_MODEL",
        "MOOD_LLM_TIMEOUT_MS",
        "HTTP_MAX_RETRIES",
        "HTTP_BACKOFF_BASE_MS",
        "HTTP_BACKOFF_CAP_MS",
        "MOOD_RANK_SAMPLE_SIZE",
        "MOOD_FEATURE_SAMPLE_SIZE",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&'static str, &'static str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = KEYS.iter().map(|key| (*key, None)).collect();
        for &(key, value) in vars {
            all.retain(|(existing, _)| *existing != key);
            all.push((key, Some(value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn defaults_disable_remote_collaborators() {
        with_env(&[], || {
            let config = Config::from_env().expect("config loads");
            assert!(config.llm().is_none());
            assert!(matches!(
                config.require_llm(),
                Err(ConfigError::Missing("MOOD_LLM_API_KEY"))
            ));
            assert_eq!(config.retry_config(), RetryConfig::new(3, 250, 10_000));
            assert_eq!(config.rank_sample_size(), 50);
            assert_eq!(config.feature_sample_size(), 30);
        });
    }

    #[test]
    fn api_key_enables_llm_with_defaults() {
        with_env(&[("MOOD_LLM_API_KEY", "secret")], || {
            let config = Config::from_env().expect("config loads");
            let llm = config.require_llm().expect("llm configured");
            assert_eq!(llm.base_url().as_str(), "https://generativelanguage.googleapis.com/");
            assert_eq!(llm.model(), "gemini-2.5-flash-lite");
            assert_eq!(llm.api_key(), "secret");
            assert_eq!(llm.timeout(), Duration::from_secs(30));
        });
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        with_env(&[("MOOD_LLM_API_KEY", "   ")], || {
            assert!(Config::from_env().expect("config loads").llm().is_none());
        });
    }

    #[test]
    fn sample_sizes_are_clamped() {
        with_env(
            &[("MOOD_RANK_SAMPLE_SIZE", "500"), ("MOOD_FEATURE_SAMPLE_SIZE", "0")],
            || {
                let config = Config::from_env().expect("config loads");
                assert_eq!(config.rank_sample_size(), 50);
                assert_eq!(config.feature_sample_size(), 1);
            },
        );
    }

    #[test]
    fn invalid_numbers_are_reported() {
        with_env(&[("HTTP_MAX_RETRIES", "many")], || {
            let error = Config::from_env().expect_err("should fail");
            assert!(matches!(
                error,
                ConfigError::Invalid {
                    name: "HTTP_MAX_RETRIES",
                    ..
                }
            ));
        });
    }

    #[test]
    fn invalid_base_url_is_reported() {
        with_env(
            &[("MOOD_LLM_API_KEY", "secret"), ("MOOD_LLM_BASE_URL", "not a url")],
            || {
                let error = Config::from_env().expect_err("should fail");
                assert!(error.to_string().contains("MOOD_LLM_BASE_URL"));
            },
        );
    }
}
