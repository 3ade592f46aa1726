use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    Fatal(E),
    /// The error was retryable, but the configured retries were exhausted.
    AttemptsExceeded { retries: u64, last_error: E },
    /// The caller cancelled while waiting for the next attempt.
    Cancelled,
}

/// Linear backoff: the n-th consecutive retry waits `n * unit`. Uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    pub unit: Duration,
}

impl LinearBackoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    pub fn delay(&self, retry_count: u64) -> Duration {
        let factor = u32::try_from(retry_count).unwrap_or(u32::MAX);
        self.unit.saturating_mul(factor)
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u64,
    pub backoff: LinearBackoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: LinearBackoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u64, backoff: LinearBackoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Executes the operation with the configured retry policy.
    ///
    /// `retries` is the caller-owned consecutive retry counter. It is reset on
    /// success and once the retries are exhausted, so at most
    /// `max_retries + 1` attempts are made per call.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        retries: &mut u64,
        mut op: F,
        classify: Classifier,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: std::fmt::Display,
    {
        loop {
            match op().await {
                Ok(result) => {
                    *retries = 0;
                    return Ok(result);
                }
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        if *retries >= self.max_retries {
                            let exhausted = *retries;
                            *retries = 0;
                            return Err(RetryError::AttemptsExceeded {
                                retries: exhausted,
                                last_error: err,
                            });
                        }

                        *retries += 1;
                        let delay = self.backoff.delay(*retries);
                        warn!(
                            retry_count = *retries,
                            wait_duration = ?delay,
                            error = %err,
                            "Retrying after transient failure"
                        );

                        tokio::select! {
                            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                            _ = sleep(delay) => {}
                        }
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    fn always_retry(_: &String) -> RetryDisposition {
        RetryDisposition::Retry
    }

    #[test]
    fn linear_delay_grows_with_retry_count() {
        let backoff = LinearBackoff::new(Duration::from_secs(6));
        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(backoff.delay(1), Duration::from_secs(6));
        assert_eq!(backoff.delay(4), Duration::from_secs(24));
        assert_eq!(backoff.delay(u64::MAX), Duration::from_secs(6) * u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_retries_plus_one_attempts() {
        let policy = RetryPolicy::new(2, LinearBackoff::default());
        let attempts = Arc::new(AtomicU64::new(0));
        let mut retries = 0;

        let result: Result<(), _> = policy
            .run(
                &mut retries,
                || {
                    let attempts = attempts.clone();
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("rate limited".to_string())
                    }
                },
                always_retry,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(RetryError::AttemptsExceeded { retries: 2, .. })
        ));
        assert_eq!(retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_counter() {
        let policy = RetryPolicy::new(5, LinearBackoff::default());
        let attempts = Arc::new(AtomicU64::new(0));
        let mut retries = 0;

        let value = policy
            .run(
                &mut retries,
                || {
                    let attempts = attempts.clone();
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err("busy".to_string())
                        } else {
                            Ok(7)
                        }
                    }
                },
                always_retry,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(retries, 0);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let mut retries = 0;

        let result: Result<(), _> = policy
            .run(
                &mut retries,
                || async { Err::<(), _>("bad request".to_string()) },
                |_| RetryDisposition::Stop,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(RetryError::Fatal(msg)) if msg == "bad request"));
        assert_eq!(retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff_wait() {
        let policy = RetryPolicy::new(3, LinearBackoff::new(Duration::from_secs(3600)));
        let cancel = CancellationToken::new();
        let mut retries = 0;

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result: Result<(), _> = policy
            .run(
                &mut retries,
                || async { Err::<(), _>("rate limited".to_string()) },
                always_retry,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(retries, 1);
    }
}
