//! Execution polling.
//!
//! Waiting on an execution is a loop driven from the caller's task: fetch the
//! execution, return it once it is no longer running, otherwise sleep one
//! interval and fetch again until the deadline passes. Time is read through a
//! [`Clock`] so tests can run the loop without real delays.

use crate::error::{ClientError, Result};
use crate::types::Execution;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of monotonic time and sleeping for the poll loop.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Sleep for the specified duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Clock backed by the tokio timer.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: tokio::time::Instant,
}

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Virtual clock for tests.
///
/// Time only moves through [`MockClock::advance`] or a call to `sleep`, which
/// advances the clock by the requested duration and completes immediately.
#[derive(Debug, Default)]
pub struct MockClock {
    current_nanos: AtomicU64,
    sleeps: AtomicU64,
}

impl MockClock {
    /// Create a mock clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .current_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            });
    }

    /// Number of `sleep` calls so far.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.current_nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
        Box::pin(std::future::ready(()))
    }
}

/// Interval and deadline used by a single wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls.
    pub interval: Duration,
    /// Give up once this much time has passed since the first poll.
    pub timeout: Duration,
}

impl PollPolicy {
    /// Apply per-call overrides on top of this policy.
    pub fn with_overrides(self, options: &WaitOptions) -> Self {
        Self {
            interval: options.interval.unwrap_or(self.interval),
            timeout: options.timeout.unwrap_or(self.timeout),
        }
    }
}

/// Per-call overrides for waiting on an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOptions {
    /// Poll interval; the client default when `None`.
    pub interval: Option<Duration>,
    /// Deadline; the client default when `None`.
    pub timeout: Option<Duration>,
}

impl WaitOptions {
    /// Override the deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the poll interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

/// Poll `fetch` until the execution stops running or the deadline passes.
///
/// Returns the first fetched execution whose [`Execution::is_running`] is
/// false. Fails with [`ClientError::Timeout`] once `policy.timeout` has
/// elapsed since the first fetch; no fetch is issued after that. Errors from
/// `fetch` are returned unchanged.
pub async fn wait_until_finished<F, Fut>(
    clock: &dyn Clock,
    execution_id: &str,
    policy: PollPolicy,
    mut fetch: F,
) -> Result<Execution>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Execution>>,
{
    let started = clock.now();
    let mut polls: u32 = 0;

    loop {
        let execution = fetch().await?;
        polls += 1;

        if !execution.is_running() {
            tracing::info!(
                execution_id = %execution_id,
                polls,
                status = ?execution.status,
                finished = execution.finished,
                "Execution stopped running"
            );
            return Ok(execution);
        }

        let elapsed = clock.now().saturating_sub(started);
        if elapsed >= policy.timeout {
            tracing::warn!(
                execution_id = %execution_id,
                polls,
                timeout = ?policy.timeout,
                "Gave up waiting for execution"
            );
            return Err(ClientError::Timeout {
                message: format!(
                    "Execution {execution_id} did not complete within {:?}",
                    policy.timeout
                ),
                execution_id: execution_id.to_string(),
                timeout: policy.timeout,
            });
        }

        tracing::debug!(
            execution_id = %execution_id,
            polls,
            elapsed = ?elapsed,
            "Execution still running"
        );
        clock.sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn execution(finished: bool, status: &str) -> Execution {
        serde_json::from_value(json!({
            "id": "exec-1",
            "finished": finished,
            "mode": "manual",
            "workflowId": "wf-1",
            "status": status,
        }))
        .unwrap()
    }

    fn policy(interval: u64, timeout: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        }
    }

    #[test]
    fn mock_clock_saturates_instead_of_wrapping() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(1));
        clock.advance(Duration::MAX);
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
    }

    #[tokio::test]
    async fn returns_second_fetch_when_it_is_terminal() {
        let clock = MockClock::new();
        let calls = AtomicUsize::new(0);

        let result = wait_until_finished(&clock, "exec-1", policy(2, 60), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, ClientError>(if n == 0 {
                    execution(false, "running")
                } else {
                    execution(true, "success")
                })
            }
        })
        .await
        .unwrap();

        assert!(result.is_successful());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(clock.sleep_count(), 1);
    }

    #[tokio::test]
    async fn returns_immediately_when_first_fetch_is_terminal() {
        let clock = MockClock::new();
        let calls = AtomicUsize::new(0);

        let result = wait_until_finished(&clock, "exec-1", policy(2, 60), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(execution(true, "error")) }
        })
        .await
        .unwrap();

        assert!(result.is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(clock.sleep_count(), 0);
    }

    #[tokio::test]
    async fn times_out_and_stops_fetching() {
        let clock = MockClock::new();
        let calls = AtomicUsize::new(0);

        let err = wait_until_finished(&clock, "exec-9", policy(2, 10), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(execution(false, "running")) }
        })
        .await
        .unwrap_err();

        match err {
            ClientError::Timeout {
                execution_id,
                timeout,
                ..
            } => {
                assert_eq!(execution_id, "exec-9");
                assert_eq!(timeout, Duration::from_secs(10));
            }
            other => panic!("expected timeout, got {other:?}"),
        }

        let elapsed = clock.now();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed <= Duration::from_secs(12));
        // Fetches at t = 0, 2, 4, 6, 8 and 10.
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn slow_fetches_count_toward_the_deadline() {
        let clock = MockClock::new();
        let calls = AtomicUsize::new(0);

        let err = wait_until_finished(&clock, "exec-1", policy(1, 5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            clock.advance(Duration::from_secs(3));
            async { Ok::<_, ClientError>(execution(false, "waiting")) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        // t = 3 after the first fetch, t = 7 after the second.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_errors_propagate_unchanged() {
        let clock = MockClock::new();

        let err = wait_until_finished(&clock, "gone", policy(1, 5), || async {
            Err::<Execution, _>(ClientError::not_found(
                "Execution gone not found",
                "execution_id",
                "gone",
            ))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::NotFound { .. }));
        assert_eq!(clock.sleep_count(), 0);
    }

    #[tokio::test]
    async fn unfinished_without_running_status_is_returned() {
        let clock = MockClock::new();

        let result = wait_until_finished(&clock, "exec-1", policy(1, 5), || async {
            Ok::<_, ClientError>(execution(false, "canceled"))
        })
        .await
        .unwrap();

        assert!(!result.finished);
        assert_eq!(clock.sleep_count(), 0);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let base = policy(2, 300);
        let merged = base.with_overrides(&WaitOptions::default().timeout(Duration::from_secs(30)));
        assert_eq!(merged.interval, Duration::from_secs(2));
        assert_eq!(merged.timeout, Duration::from_secs(30));
        assert_eq!(base.with_overrides(&WaitOptions::default()), base);
    }

    #[test]
    fn mock_clock_advances_on_sleep() {
        let clock = MockClock::new();
        clock.advance(Duration::from_millis(500));
        let _ = clock.sleep(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_millis(1500));
        assert_eq!(clock.sleep_count(), 1);
    }
}
