use crate::fetch::{FailureKind, FetchError};
use crate::notify::Notifier;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            multiplier: 2.0,
        }
    }
}

/// Position within a retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub max_attempts: u32,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
        }
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Backoff before the next retry: `min(initial * multiplier^attempt, max)`.
    pub fn delay(&self, config: &RetryConfig) -> Duration {
        let factor = config.multiplier.powi(self.attempt as i32);
        let millis = (config.initial_delay.as_millis() as f64 * factor)
            .min(config.max_delay.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    fn advance(&mut self) {
        if self.can_retry() {
            self.attempt += 1;
        }
    }
}

/// Build the user-facing message for a failure that exhausted its retries.
pub fn terminal_message(resource: &str, err: &FetchError) -> String {
    match err.kind {
        FailureKind::Timeout => format!(
            "Request timed out while loading {resource}. Please check your connection and try again."
        ),
        FailureKind::HttpError => format!(
            "Unable to load {resource}: server responded with status {}. Please check your connection and try again.",
            err.status_code.unwrap_or_default()
        ),
        FailureKind::NetworkError => format!(
            "Unable to load {resource}: {}. Please check your connection and try again.",
            err.message
        ),
    }
}

#[derive(Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
    notifier: Notifier,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            notifier: Notifier::disabled(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds or the budget is spent.
    ///
    /// The operation is invoked at most `max_attempts + 1` times. The error
    /// returned after exhaustion keeps the last failure's kind and status but
    /// carries the composite message from [`terminal_message`].
    pub async fn retry<F, Fut, T>(&self, resource: &str, operation: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.retry_if(resource, operation, |_| true).await
    }

    /// Like [`retry`](Self::retry), but a failure for which `should_retry`
    /// returns false ends the loop at once.
    pub async fn retry_if<F, Fut, T, P>(
        &self,
        resource: &str,
        operation: F,
        should_retry: P,
    ) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        P: Fn(&FetchError) -> bool,
    {
        let mut state = RetryState::new(self.config.max_attempts);

        loop {
            match operation().await {
                Ok(result) => {
                    if state.attempt > 0 {
                        info!(
                            "Loading {} succeeded after {} attempts",
                            resource,
                            state.attempt + 1
                        );
                    }
                    return Ok(result);
                }
                Err(err) if !state.can_retry() || !should_retry(&err) => {
                    warn!(
                        "Loading {} failed after {} attempts: {}",
                        resource,
                        state.attempt + 1,
                        err
                    );
                    return Err(FetchError {
                        message: terminal_message(resource, &err),
                        ..err
                    });
                }
                Err(err) => {
                    let delay = state.delay(&self.config);
                    warn!(
                        "Attempt {} for {} failed: {}. Retrying in {:?}...",
                        state.attempt + 1,
                        resource,
                        err,
                        delay
                    );
                    self.notifier.warning(format!(
                        "Failed to load {resource}. Retrying ({}/{})...",
                        state.attempt + 1,
                        state.max_attempts
                    ));
                    sleep(delay).await;
                    state.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        })
    }

    #[test]
    fn test_delay_schedule() {
        let config = RetryConfig::default();
        let delays: Vec<u64> = (0..5)
            .map(|attempt| {
                RetryState {
                    attempt,
                    max_attempts: 5,
                }
                .delay(&config)
                .as_millis() as u64
            })
            .collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000]);
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(10));
        assert_eq!(config.multiplier, 2.0);
    }

    #[test]
    fn test_state_never_exceeds_budget() {
        let mut state = RetryState::new(2);
        for _ in 0..5 {
            state.advance();
        }
        assert_eq!(state.attempt, 2);
        assert!(!state.can_retry());
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let policy = RetryPolicy::default();
        let result = policy.retry("skills", || async { Ok::<_, FetchError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fast_policy(3)
            .retry("courses", || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(FetchError::network("connection reset"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fast_policy(2)
            .retry("careers", || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(FetchError::network("connection refused"))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(err.kind, FailureKind::NetworkError);
        assert_eq!(
            err.message,
            "Unable to load careers: connection refused. Please check your connection and try again."
        );
    }

    #[tokio::test]
    async fn test_zero_budget_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fast_policy(0)
            .retry("roadmap", || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(FetchError::http(500, "boom"))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(err.status_code, Some(500));
        assert!(err.message.contains("status 500"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_use_default_backoff() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = Instant::now();

        let result = RetryPolicy::default()
            .retry("roadmap", || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(FetchError::timeout(Duration::from_secs(10)))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(err.kind, FailureKind::Timeout);
        assert!(err.message.contains("timed out"));
        // 1000 + 2000 + 4000 ms of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(7000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_kth_call_stops() {
        for k in 1..=4u32 {
            let counter = Arc::new(AtomicU32::new(0));
            let counter_clone = counter.clone();

            let result = RetryPolicy::default()
                .retry("skills", || {
                    let counter = counter_clone.clone();
                    async move {
                        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        if call < k {
                            Err(FetchError::network("flaky"))
                        } else {
                            Ok(call)
                        }
                    }
                })
                .await;

            assert_eq!(result.unwrap(), k);
            assert_eq!(counter.load(Ordering::SeqCst), k);
        }
    }

    #[tokio::test]
    async fn test_retry_emits_notification_per_retry() {
        let (notifier, mut rx) = Notifier::channel();
        let policy = fast_policy(2).with_notifier(notifier);

        let _ = policy
            .retry("certificates", || async {
                Err::<(), _>(FetchError::network("down"))
            })
            .await;

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(first.message.contains("Retrying (1/2)"));
        assert!(second.message.contains("Retrying (2/2)"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_retry_if_stops_on_rejected_failure() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fast_policy(3)
            .retry_if(
                "login",
                || {
                    let counter = counter_clone.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(
                            FetchError::http(401, "unauthorized").with_body(r#"{"error":"no"}"#),
                        )
                    }
                },
                |err| !err.is_client_error(),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(err.status_code, Some(401));
        assert_eq!(err.body.as_deref(), Some(r#"{"error":"no"}"#));
    }

    #[tokio::test]
    async fn test_retry_if_still_retries_accepted_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fast_policy(2)
            .retry_if(
                "settings",
                || {
                    let counter = counter_clone.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(FetchError::http(503, "unavailable"))
                    }
                },
                |err| !err.is_client_error(),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_terminal_message_variants() {
        let timeout = terminal_message("roadmap", &FetchError::timeout(Duration::from_secs(1)));
        let http = terminal_message("skills", &FetchError::http(404, "not found"));

        assert!(timeout.starts_with("Request timed out while loading roadmap"));
        assert!(!timeout.contains("Unable to load"));
        assert!(http.contains("status 404"));
    }
}
