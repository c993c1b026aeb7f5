//! Bounded retry with capped exponential backoff.

use super::error::AiError;
use log::warn;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Policy with a single attempt and no waiting.
    pub fn single_attempt() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Wait after failed attempt `attempt` (1-based): `min(base * 2^attempt, max)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable
    /// error, or the attempt budget is spent.
    ///
    /// The closure receives the 1-based attempt number. On exhaustion the
    /// last attempt's error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, AiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AiError>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts || !err.is_retryable() => return Err(err),
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "event=ai_retry module=analysis status=retrying attempt={} max_attempts={} delay_ms={} error_kind={}",
                        attempt,
                        attempts,
                        delay.as_millis(),
                        err.kind().as_str()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use crate::analysis::error::AiError;
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn delays_are_non_decreasing_and_capped() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (1..=8).map(|attempt| policy.delay_after(attempt)).collect();

        assert_eq!(delays[0], Duration::from_millis(2000));
        assert_eq!(delays[1], Duration::from_millis(4000));
        assert_eq!(delays[2], Duration::from_millis(8000));
        assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(delays.iter().all(|delay| *delay <= policy.max_delay));
        assert_eq!(policy.delay_after(40), policy.max_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_attempts_returns_last_error() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result: Result<(), AiError> = policy
            .execute(|attempt| {
                calls.set(calls.get() + 1);
                async move {
                    Err(AiError::Status {
                        status: 500 + attempt as u16,
                        body: String::new(),
                    })
                }
            })
            .await;

        assert_eq!(calls.get(), 3);
        assert_eq!(
            result,
            Err(AiError::Status {
                status: 503,
                body: String::new()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_failed_attempts() {
        let policy = RetryPolicy::default();
        let started_at = tokio::time::Instant::now();
        let waits = std::cell::RefCell::new(Vec::new());

        let result: Result<(), AiError> = policy
            .execute(|_| {
                waits.borrow_mut().push(started_at.elapsed());
                async { Err(AiError::Timeout) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(
            *waits.borrow(),
            vec![
                Duration::ZERO,
                Duration::from_secs(2),
                Duration::from_secs(6)
            ]
        );
        assert_eq!(started_at.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result: Result<(), AiError> = policy
            .execute(|_| {
                calls.set(calls.get() + 1);
                async {
                    Err(AiError::Status {
                        status: 401,
                        body: String::new(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_is_not_retried() {
        let calls = Cell::new(0u32);
        let result = RetryPolicy::default()
            .execute(|attempt| {
                calls.set(calls.get() + 1);
                async move { Ok::<_, AiError>(attempt) }
            })
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.get(), 1);
    }
}
