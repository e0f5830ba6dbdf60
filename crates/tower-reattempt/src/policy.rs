//! The attempt policy: when to stop, how long to wait, what to retry.

use crate::wait::WaitStrategy;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a given error should be retried.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Bounds and paces the attempts made for one decorated call.
///
/// A policy is built once, when the layer is constructed, and is never
/// mutated afterwards; every invocation of the wrapped operation reads the
/// same policy. The attempt counter itself is local to each call.
pub struct AttemptPolicy<E> {
    pub(crate) max_attempts: Option<usize>,
    pub(crate) wait: Arc<dyn WaitStrategy>,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
}

impl<E> AttemptPolicy<E> {
    /// Creates a policy. `max_attempts` counts the initial attempt;
    /// `None` means retry without bound.
    pub fn new(max_attempts: Option<usize>, wait: Arc<dyn WaitStrategy>) -> Self {
        Self {
            max_attempts: max_attempts.map(|n| n.max(1)),
            wait,
            retry_predicate: None,
        }
    }

    /// The configured attempt bound, if any.
    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    /// Whether `error` is eligible for a retry. Without a predicate every
    /// error is.
    pub fn is_retryable(&self, error: &E) -> bool {
        match &self.retry_predicate {
            Some(predicate) => predicate(error),
            None => true,
        }
    }

    /// Whether `attempts_made` has reached the bound.
    pub fn exhausted(&self, attempts_made: usize) -> bool {
        self.max_attempts.is_some_and(|max| attempts_made >= max)
    }

    /// Delay before the given retry (1-indexed).
    pub fn wait_before(&self, retry: usize) -> Duration {
        self.wait.wait_before(retry)
    }
}
