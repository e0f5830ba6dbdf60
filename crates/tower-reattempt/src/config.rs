use crate::events::ReattemptEvent;
use crate::policy::{AttemptPolicy, RetryPredicate};
use crate::wait::{ExponentialWait, FixedWait, JitteredWait, NoWait, WaitStrategy};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_reattempt_core::events::{FnListener, ListenerSet};

/// Configuration for the reattempt middleware.
///
/// Built once via [`ReattemptConfig::builder`], then turned into a
/// [`ReattemptLayer`](crate::ReattemptLayer) with [`layer`](Self::layer), or
/// used directly to drive a closure with [`run`](Self::run).
pub struct ReattemptConfig<E> {
    pub(crate) policy: AttemptPolicy<E>,
    pub(crate) listeners: ListenerSet<ReattemptEvent>,
    pub(crate) name: String,
}

impl<E> ReattemptConfig<E> {
    /// Creates a new builder with defaults.
    pub fn builder() -> ReattemptConfigBuilder<E> {
        ReattemptConfigBuilder::new()
    }

    /// Wraps this configuration in a [`ReattemptLayer`](crate::ReattemptLayer).
    pub fn layer(self) -> crate::ReattemptLayer<E> {
        crate::ReattemptLayer::new(self)
    }

    /// Runs `op` under this configuration's policy.
    ///
    /// `op` is invoked once per attempt. On success the value is returned
    /// immediately; on failure the operation is re-invoked until it
    /// succeeds, the attempt bound is reached, or the retry predicate
    /// declines the error. The final error is returned exactly as the
    /// operation produced it.
    ///
    /// Each call to `run` starts a fresh attempt counter.
    ///
    /// # Examples
    ///
    /// ```
    /// use tower_reattempt::ReattemptConfig;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let config: ReattemptConfig<&str> = ReattemptConfig::builder()
    ///     .max_attempts(3)
    ///     .build();
    ///
    /// let mut tries = 0;
    /// let result = config
    ///     .run(|| {
    ///         tries += 1;
    ///         let ok = tries >= 2;
    ///         async move { if ok { Ok(tries) } else { Err("flaky") } }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result, Ok(2));
    /// # }
    /// ```
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Attempts made so far, including the one in flight.
        let mut attempts = 1usize;

        loop {
            match op().await {
                Ok(value) => {
                    self.listeners.emit(&ReattemptEvent::Success {
                        source: self.name.clone(),
                        timestamp: Instant::now(),
                        attempts,
                    });
                    self.record_outcome("success", attempts);
                    return Ok(value);
                }
                Err(error) => {
                    if !self.policy.is_retryable(&error) {
                        self.listeners.emit(&ReattemptEvent::Filtered {
                            source: self.name.clone(),
                            timestamp: Instant::now(),
                        });
                        self.record_outcome("filtered", attempts);
                        return Err(error);
                    }

                    if self.policy.exhausted(attempts) {
                        self.listeners.emit(&ReattemptEvent::Exhausted {
                            source: self.name.clone(),
                            timestamp: Instant::now(),
                            attempts,
                        });
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            source = %self.name,
                            attempts,
                            "attempts exhausted, returning last error"
                        );
                        self.record_outcome("exhausted", attempts);
                        return Err(error);
                    }

                    let wait = self.policy.wait_before(attempts);
                    self.listeners.emit(&ReattemptEvent::Retry {
                        source: self.name.clone(),
                        timestamp: Instant::now(),
                        attempt: attempts,
                        wait,
                    });
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        source = %self.name,
                        attempt = attempts,
                        wait_ms = wait.as_millis() as u64,
                        "attempt failed, retrying"
                    );
                    #[cfg(feature = "metrics")]
                    metrics::counter!(
                        "reattempt_retries_total",
                        "reattempt" => self.name.clone()
                    )
                    .increment(1);

                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    attempts += 1;
                }
            }
        }
    }

    #[allow(unused_variables)]
    fn record_outcome(&self, result: &'static str, attempts: usize) {
        #[cfg(feature = "metrics")]
        {
            metrics::counter!(
                "reattempt_calls_total",
                "reattempt" => self.name.clone(),
                "result" => result
            )
            .increment(1);
            metrics::histogram!(
                "reattempt_attempts",
                "reattempt" => self.name.clone()
            )
            .record(attempts as f64);
        }
    }
}

/// Builder for [`ReattemptConfig`].
pub struct ReattemptConfigBuilder<E> {
    max_attempts: Option<usize>,
    wait: Option<Arc<dyn WaitStrategy>>,
    retry_predicate: Option<RetryPredicate<E>>,
    listeners: ListenerSet<ReattemptEvent>,
    name: String,
}

impl<E> Default for ReattemptConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ReattemptConfigBuilder<E> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - attempts: unbounded (retry until success)
    /// - wait: none (failed attempts are retried immediately)
    /// - predicate: retry every error
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_attempts: None,
            wait: None,
            retry_predicate: None,
            listeners: ListenerSet::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Bounds the total number of attempts, counting the initial one.
    ///
    /// `max_attempts(3)` means 1 initial attempt plus at most 2 retries;
    /// `max_attempts(1)` disables retrying entirely. Values below 1 are
    /// treated as 1.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Applies the same delay before every retry.
    pub fn fixed_wait(mut self, interval: Duration) -> Self {
        self.wait = Some(Arc::new(FixedWait::new(interval)));
        self
    }

    /// Applies exponentially growing delays with default settings.
    pub fn exponential_wait(mut self, initial: Duration) -> Self {
        self.wait = Some(Arc::new(ExponentialWait::new(initial)));
        self
    }

    /// Applies exponentially growing delays with uniform jitter.
    pub fn jittered_wait(mut self, initial: Duration) -> Self {
        self.wait = Some(Arc::new(JitteredWait::new(initial)));
        self
    }

    /// Sets a custom wait strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tower_reattempt::{FnWait, ReattemptConfig};
    ///
    /// let config: ReattemptConfig<std::io::Error> = ReattemptConfig::builder()
    ///     .max_attempts(4)
    ///     .wait(FnWait::new(|retry| Duration::from_millis(50 * retry as u64)))
    ///     .build();
    /// ```
    pub fn wait<W>(mut self, wait: W) -> Self
    where
        W: WaitStrategy + 'static,
    {
        self.wait = Some(Arc::new(wait));
        self
    }

    /// Restricts retries to errors matching `predicate`.
    ///
    /// An error the predicate rejects is returned to the caller after a
    /// single failed attempt, without retrying.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::{Error, ErrorKind};
    /// use tower_reattempt::ReattemptConfig;
    ///
    /// let config: ReattemptConfig<Error> = ReattemptConfig::builder()
    ///     .max_attempts(5)
    ///     .retry_if(|err: &Error| {
    ///         matches!(err.kind(), ErrorKind::ConnectionRefused | ErrorKind::TimedOut)
    ///     })
    ///     .build();
    /// ```
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }

    /// Names this instance. The name appears in events, metrics labels,
    /// and tracing output.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each retry.
    ///
    /// The callback receives the number of failed attempts so far
    /// (1 = first retry) and the delay about to be applied.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ReattemptEvent::Retry { attempt, wait, .. } = event {
                f(*attempt, *wait);
            }
        }));
        self
    }

    /// Registers a callback invoked when a call succeeds.
    ///
    /// The callback receives the total attempts made: 1 means the first
    /// try succeeded, anything higher means retries were needed.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ReattemptEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when the attempt bound is reached and
    /// the last error is about to be returned.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ReattemptEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when an error is returned without
    /// retrying because the retry predicate declined it.
    pub fn on_filtered<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if matches!(event, ReattemptEvent::Filtered { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ReattemptConfig<E> {
        let wait = self.wait.unwrap_or_else(|| Arc::new(NoWait));

        let mut policy = AttemptPolicy::new(self.max_attempts, wait);
        policy.retry_predicate = self.retry_predicate;

        ReattemptConfig {
            policy,
            listeners: self.listeners,
            name: self.name,
        }
    }
}
