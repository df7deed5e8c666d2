use crate::classify::{classify, ErrorClass};
use crate::generation::GenerationConfig;
use crate::models::ModelCandidates;
use crate::provider::TextGenerationProvider;
use accessimind_core::{AccessiMindError, AccessiMindResult, ProviderError, Settings};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Configures retry behaviour across candidate models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per model before moving to the next one (including the first call).
    #[serde(default = "default_max_attempts_per_model")]
    pub max_attempts_per_model: u32,
    /// Base delay in milliseconds for exponential backoff.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound (exclusive) of the uniform random jitter added to each delay.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
    /// Optional limit for a single provider call. `None` waits indefinitely.
    #[serde(default)]
    pub attempt_timeout_ms: Option<u64>,
}

fn default_max_attempts_per_model() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    800
}

fn default_jitter_ms() -> u64 {
    200
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts_per_model: default_max_attempts_per_model(),
            base_delay_ms: default_base_delay_ms(),
            jitter_ms: default_jitter_ms(),
            attempt_timeout_ms: None,
        }
    }
}

impl RetryPolicy {
    /// Exponential part of the delay after a transient failure on `attempt`
    /// (1-based): `base * 2^(attempt-1)`.
    pub fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        self.base_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent))
    }

    /// Backoff delay plus a uniform jitter in `[0, jitter_ms)`.
    pub fn jittered_backoff(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.backoff_delay_ms(attempt).saturating_add(jitter))
    }

    fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }

    fn attempts_per_model(&self) -> u32 {
        self.max_attempts_per_model.max(1)
    }
}

/// Text produced by a successful call, with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub text: String,
    pub model_used: String,
}

/// Outcome of one (model, attempt) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The provider answered; stop here.
    Success(Generation),
    /// Transient failure; the same model may be retried.
    Retryable(ProviderError),
    /// The model cannot serve this request; move to the next one.
    SkipModel(ProviderError),
    /// Stop everything and report the error.
    Fatal(ProviderError),
}

impl AttemptResult {
    fn from_error(err: ProviderError) -> Self {
        match classify(&err) {
            ErrorClass::Transient => AttemptResult::Retryable(err),
            ErrorClass::ModelUnavailable => AttemptResult::SkipModel(err),
            ErrorClass::Fatal => AttemptResult::Fatal(err),
        }
    }
}

/// Generates text across a list of candidate models with bounded retries.
///
/// For each call it plans the candidate models (preferred first, then the
/// fallback roster). Within a model, transient failures are retried with
/// jittered exponential backoff up to the policy's attempt budget; retries
/// after the first use a tightened [`GenerationConfig`]. A model-unavailable
/// failure moves on to the next model at once, and a fatal failure is
/// returned immediately. If every model runs out, the call fails with
/// [`AccessiMindError::Exhausted`].
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct ResilientGenerator {
    provider: Arc<dyn TextGenerationProvider>,
    policy: RetryPolicy,
}

impl ResilientGenerator {
    /// Create a generator with the default retry policy.
    pub fn new(provider: Arc<dyn TextGenerationProvider>) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    /// Create a generator with an explicit retry policy.
    pub fn with_policy(provider: Arc<dyn TextGenerationProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run a single provider call and classify its outcome.
    pub async fn attempt(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> AttemptResult {
        let call = self.provider.generate(api_key, model, prompt, config);
        let outcome = match self.policy.attempt_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::new(format!(
                    "request timeout after {}ms",
                    limit.as_millis()
                ))),
            },
            None => call.await,
        };

        match outcome {
            Ok(text) => AttemptResult::Success(Generation {
                text,
                model_used: model.to_string(),
            }),
            Err(e) => AttemptResult::from_error(e),
        }
    }

    /// Generate text for `prompt`, falling back across models as needed.
    pub async fn generate(&self, settings: &Settings, prompt: &str) -> AccessiMindResult<Generation> {
        let candidates = ModelCandidates::plan(Some(settings.model.as_str()));
        let max_attempts = self.policy.attempts_per_model();
        let mut calls: u32 = 0;

        for model in &candidates {
            for attempt in 1..=max_attempts {
                let config = GenerationConfig::build(settings, attempt > 1);
                calls += 1;
                debug!(
                    model = %model,
                    attempt,
                    max_output_tokens = config.max_output_tokens,
                    "Calling provider"
                );

                match self.attempt(settings.api_key.trim(), model, prompt, &config).await {
                    AttemptResult::Success(generation) => {
                        info!(model = %model, attempt, calls, "Generation succeeded");
                        return Ok(generation);
                    }
                    AttemptResult::Retryable(e) => {
                        if attempt < max_attempts {
                            let delay = self.policy.jittered_backoff(attempt);
                            warn!(
                                model = %model,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                "Transient error, backing off"
                            );
                            tokio::time::sleep(delay).await;
                        } else {
                            warn!(
                                model = %model,
                                attempt,
                                error = %e,
                                "Retries exhausted, moving to next model"
                            );
                        }
                    }
                    AttemptResult::SkipModel(e) => {
                        warn!(
                            model = %model,
                            attempt,
                            error = %e,
                            "Model unavailable, moving to next model"
                        );
                        break;
                    }
                    AttemptResult::Fatal(e) => {
                        error!(model = %model, attempt, error = %e, "Non-recoverable provider error");
                        return Err(AccessiMindError::Fatal(e));
                    }
                }
            }
        }

        error!(calls, models = candidates.len(), "All candidate models exhausted");
        Err(AccessiMindError::Exhausted {
            models: candidates.into_vec(),
            attempts: calls,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
