//! Retry-with-limit combinator for flaky remote operations.

use thiserror::Error;

use crate::error::{GitError, ResolveError};

/// Classifies failures for [`retry`].
///
/// Permanent failures are programmer or input errors that retrying cannot
/// fix; they propagate immediately instead of burning attempts.
pub trait RetryableError: std::error::Error {
    fn is_permanent(&self) -> bool {
        false
    }
}

impl RetryableError for GitError {
    fn is_permanent(&self) -> bool {
        matches!(self, GitError::Precondition(_))
    }
}

impl RetryableError for ResolveError {
    fn is_permanent(&self) -> bool {
        matches!(self, ResolveError::Precondition(_))
    }
}

/// Failure of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error> {
    /// The limit itself was invalid; the operation was never invoked.
    #[error("{0}")]
    Precondition(String),
    /// The operation failed with an error that must not be retried.
    #[error("{0}")]
    Permanent(E),
    /// Every attempt failed with a transient error.
    #[error("all {limit} retries were exhausted")]
    Exhausted { limit: u32 },
}

/// Runs `op` up to `limit + 1` times, returning the first success.
///
/// Transient failures are discarded and the operation retried until the
/// attempts are exhausted; a permanent failure (see
/// [`RetryableError::is_permanent`]) propagates immediately. `limit` must be
/// at least 1.
pub fn retry<T, E, F>(mut op: F, limit: u32) -> Result<T, RetryError<E>>
where
    E: RetryableError,
    F: FnMut() -> Result<T, E>,
{
    if limit == 0 {
        return Err(RetryError::Precondition(
            "at least 1 retry must be allowed".to_string(),
        ));
    }
    for attempt in 0..=limit {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_permanent() => return Err(RetryError::Permanent(err)),
            Err(err) => {
                tracing::debug!(attempt, error = %err, "retrying after transient failure");
            }
        }
    }
    Err(RetryError::Exhausted { limit })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, PartialEq, Error)]
    enum TestError {
        #[error("transient failure")]
        Transient,
        #[error("bad input")]
        Precondition,
    }

    impl RetryableError for TestError {
        fn is_permanent(&self) -> bool {
            matches!(self, TestError::Precondition)
        }
    }

    #[test]
    fn cancelled_resolutions_stay_retryable() {
        assert!(!ResolveError::Cancelled("runtime shutting down".to_string()).is_permanent());
        assert!(ResolveError::Precondition("bad input".to_string()).is_permanent());
    }

    #[test]
    fn returns_the_first_success_immediately() {
        let calls = Cell::new(0);
        let result = retry(
            || {
                calls.set(calls.get() + 1);
                Ok::<_, TestError>(42)
            },
            2,
        );
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retries_transient_failures_until_success() {
        let calls = Cell::new(0);
        let result = retry(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(TestError::Transient)
                } else {
                    Ok("done")
                }
            },
            2,
        );
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausts_after_limit_plus_one_attempts() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry(
            || {
                calls.set(calls.get() + 1);
                Err(TestError::Transient)
            },
            2,
        );
        assert!(matches!(result, Err(RetryError::Exhausted { limit: 2 })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn permanent_failures_are_never_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry(
            || {
                calls.set(calls.get() + 1);
                Err(TestError::Precondition)
            },
            5,
        );
        assert!(matches!(
            result,
            Err(RetryError::Permanent(TestError::Precondition))
        ));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn zero_limit_is_rejected_without_invoking_the_operation() {
        let calls = Cell::new(0);
        let result = retry(
            || {
                calls.set(calls.get() + 1);
                Ok::<_, TestError>(())
            },
            0,
        );
        assert!(matches!(result, Err(RetryError::Precondition(_))));
        assert_eq!(calls.get(), 0);
    }
}
