//! Bounded retries with exponential backoff.

use std::{thread, time::Duration};

use log::warn;

use crate::LearningError;

/// How often, and how patiently, a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes a single attempt.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Returns the delay after failed attempt number `attempt` (one-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `op`, retrying transient failures.
    ///
    /// Non-transient errors are returned at once. When every attempt fails transiently the
    /// last error is wrapped in [`LearningError::RetriesExhausted`], unless only one attempt
    /// was allowed, in which case it is returned unchanged.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, LearningError>,
    ) -> Result<T, LearningError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= attempts => {
                    if attempts == 1 {
                        return Err(e);
                    }
                    return Err(LearningError::RetriesExhausted {
                        attempts,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.backoff(attempt);
                    warn!("{what} failed (attempt {attempt}/{attempts}), retrying in {delay:?}: {e}");
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::PathBuf};

    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    fn launch_error() -> LearningError {
        LearningError::Launch {
            binary: PathBuf::from("ranker"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy(5);
        assert_eq!(p.backoff(1), Duration::from_millis(1));
        assert_eq!(p.backoff(2), Duration::from_millis(2));
        assert_eq!(p.backoff(3), Duration::from_millis(4));
        assert_eq!(p.backoff(10), Duration::from_millis(4));
        assert_eq!(p.backoff(u32::MAX), Duration::from_millis(4));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = policy(3).run("ranker", || {
            calls += 1;
            if calls < 3 { Err(launch_error()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let err = policy(2)
            .run("ranker", || -> Result<(), _> {
                calls += 1;
                Err(launch_error())
            })
            .unwrap_err();
        assert_eq!(calls, 2);
        assert!(matches!(err, LearningError::RetriesExhausted { attempts: 2, .. }));
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let err = policy(5)
            .run("ranker", || -> Result<(), _> {
                calls += 1;
                Err(LearningError::EmptyBatch)
            })
            .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, LearningError::EmptyBatch));
    }

    #[test]
    fn single_attempt_returns_error_unchanged() {
        let err = RetryPolicy::once()
            .run("ranker", || -> Result<(), _> { Err(launch_error()) })
            .unwrap_err();
        assert!(matches!(err, LearningError::Launch { .. }));
    }
}
