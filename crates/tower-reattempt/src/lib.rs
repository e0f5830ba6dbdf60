//! Bounded retry middleware for Tower services.
//!
//! Wraps a [`tower::Service`] (or a plain async closure) so that failed
//! calls are re-invoked according to an attempt policy. The final failure
//! is returned to the caller exactly as the wrapped operation produced it;
//! the middleware never wraps or translates errors.
//!
//! # Features
//!
//! - **Attempt bound**: `max_attempts(n)` counts the initial attempt;
//!   unset means retry until success.
//! - **Wait strategies**: no wait (the default), fixed, exponential,
//!   exponential with jitter, or a custom function.
//! - **Retry predicates**: restrict retries to errors worth repeating.
//! - **Events**: listener hooks for retries, successes, exhaustion, and
//!   filtered errors.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//! use tower_reattempt::ReattemptConfig;
//!
//! # #[derive(Debug, Clone)]
//! # struct MyError;
//! # async fn example() {
//! let config: ReattemptConfig<MyError> = ReattemptConfig::builder()
//!     .max_attempts(3)
//!     .fixed_wait(Duration::from_millis(100))
//!     .on_retry(|attempt, wait| {
//!         println!("retry {attempt} after {wait:?}");
//!     })
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(config.layer())
//!     .service(tower::service_fn(|req: String| async move {
//!         Ok::<_, MyError>(format!("response: {req}"))
//!     }));
//! # }
//! ```

mod config;
mod events;
mod layer;
mod policy;
mod wait;

pub use config::{ReattemptConfig, ReattemptConfigBuilder};
pub use events::ReattemptEvent;
pub use layer::ReattemptLayer;
pub use policy::{AttemptPolicy, RetryPredicate};
pub use wait::{ExponentialWait, FixedWait, FnWait, JitteredWait, NoWait, WaitStrategy};

use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// A Tower [`Service`] that re-invokes failed calls.
///
/// Each call runs a fresh attempt counter; concurrent and successive calls
/// retry independently. The request is cloned once per attempt.
pub struct Reattempt<S, E> {
    inner: S,
    config: Arc<ReattemptConfig<E>>,
}

impl<S, E> Reattempt<S, E> {
    /// Creates a new `Reattempt` wrapping the given service.
    pub fn new(inner: S, config: Arc<ReattemptConfig<E>>) -> Self {
        Self { inner, config }
    }
}

impl<S, E> Clone for Reattempt<S, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Req, E> Service<Req> for Reattempt<S, E>
where
    S: Service<Req, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Clone + Send + 'static,
    E: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            config
                .run(move || {
                    let mut service = service.clone();
                    let req = req.clone();
                    async move { service.call(req).await }
                })
                .await
        })
    }
}
