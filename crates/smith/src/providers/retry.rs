use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::base::{GenerationRequest, GenerationResult, Provider, Usage};
use crate::errors::{SmithError, SmithResult};

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Fixed-bound, fixed-delay retry on rate limiting. There is no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Wraps a provider and retries requests that were rate limited.
/// Every other failure is returned unchanged on the first attempt.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: Provider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P: Provider> Provider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        let bound = self.policy.max_attempts.max(1);
        let mut attempts = 0;

        while attempts < bound {
            match self.inner.complete(request).await {
                Ok(response) => return Ok(response),
                Err(SmithError::RateLimitExceeded) => {
                    attempts += 1;
                    if attempts < bound {
                        tracing::warn!(
                            provider = self.inner.name(),
                            attempt = attempts,
                            "Rate limit exceeded. Retrying in {}ms",
                            self.policy.delay.as_millis()
                        );
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        tracing::warn!(provider = self.inner.name(), attempts, "Max retries exceeded");
        Err(SmithError::MaxRetriesExceeded { attempts })
    }
}
