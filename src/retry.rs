//! Whole-call retry for streaming handlers.
//!
//! Handlers never retry on their own. [`with_retry`] wraps a stream factory
//! and re-issues the entire call when it fails before producing any event.
//! Once an event has been yielded, a later failure is passed through: events
//! already handed to the caller are never replayed.

use std::time::Duration;

use futures::StreamExt;
use tracing::warn;

use crate::client::{ApiHandler, ClientError};
use crate::model::Message;
use crate::models::ApiModel;
use crate::stream::ApiStream;

/// Retry policy for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Retry every error, not only rate limits.
    pub retry_all_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            retry_all_errors: false,
        }
    }
}

impl RetryPolicy {
    /// Read the policy from `NEBIUS_MAX_RETRIES`, `NEBIUS_RETRY_BASE_DELAY_MS`
    /// and `NEBIUS_RETRY_MAX_DELAY_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_u64("NEBIUS_MAX_RETRIES")
                .map(|v| v.min(20) as u32)
                .unwrap_or(defaults.max_retries),
            base_delay: env_u64("NEBIUS_RETRY_BASE_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: env_u64("NEBIUS_RETRY_MAX_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            retry_all_errors: defaults.retry_all_errors,
        }
    }

    /// Disable retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_retry_all_errors(mut self, retry_all: bool) -> Self {
        self.retry_all_errors = retry_all;
        self
    }

    /// Exponential backoff for a zero-based retry number, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(30)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay before the next attempt. A server `Retry-After` hint wins.
    pub fn delay_for(&self, attempt: u32, err: &ClientError) -> Duration {
        err.retry_after().unwrap_or_else(|| self.backoff(attempt))
    }

    pub fn should_retry(&self, err: &ClientError) -> bool {
        self.retry_all_errors || err.is_rate_limit()
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

/// Run `make_stream`, re-running it according to `policy` when it fails
/// before its first event.
pub fn with_retry<'a, F>(policy: RetryPolicy, mut make_stream: F) -> ApiStream<'a>
where
    F: FnMut() -> ApiStream<'a> + Send + 'a,
{
    Box::pin(async_stream::stream! {
        let mut attempt = 0u32;

        'attempts: loop {
            let mut stream = make_stream();
            let mut emitted = false;

            while let Some(item) = stream.next().await {
                match item {
                    Ok(event) => {
                        emitted = true;
                        yield Ok(event);
                    }
                    Err(err) => {
                        if !emitted && attempt < policy.max_retries && policy.should_retry(&err) {
                            let delay = policy.delay_for(attempt, &err);
                            attempt += 1;
                            warn!(
                                "Retry attempt {}/{} in {:?} after error: {}",
                                attempt, policy.max_retries, delay, err
                            );
                            tokio::time::sleep(delay).await;
                            continue 'attempts;
                        }
                        yield Err(err);
                        return;
                    }
                }
            }

            return;
        }
    })
}

/// An [`ApiHandler`] whose `create_message` calls are retried as a whole.
pub struct Retrying<H> {
    inner: H,
    policy: RetryPolicy,
}

impl<H: ApiHandler> Retrying<H> {
    pub fn new(inner: H, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: ApiHandler> ApiHandler for Retrying<H> {
    fn create_message<'a>(&'a self, system_prompt: &'a str, messages: &'a [Message]) -> ApiStream<'a> {
        with_retry(self.policy, move || self.inner.create_message(system_prompt, messages))
    }

    fn get_model(&self) -> ApiModel {
        self.inner.get_model()
    }
}
