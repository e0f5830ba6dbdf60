use crate::{Reattempt, ReattemptConfig};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that wraps services with the reattempt middleware.
///
/// The configuration is shared by `Arc`, so cloning the layer or the
/// services it produces is cheap and all of them observe the same policy.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tower::ServiceBuilder;
/// use tower_reattempt::ReattemptConfig;
///
/// # #[derive(Debug, Clone)]
/// # struct MyError;
/// # async fn example() {
/// let layer = ReattemptConfig::<MyError>::builder()
///     .max_attempts(3)
///     .fixed_wait(Duration::from_millis(100))
///     .build()
///     .layer();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(tower::service_fn(|req: String| async move {
///         Ok::<_, MyError>(req)
///     }));
/// # }
/// ```
pub struct ReattemptLayer<E> {
    config: Arc<ReattemptConfig<E>>,
}

impl<E> ReattemptLayer<E> {
    /// Creates a layer from a finished configuration.
    pub fn new(config: ReattemptConfig<E>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<E> Clone for ReattemptLayer<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, E> Layer<S> for ReattemptLayer<E> {
    type Service = Reattempt<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        Reattempt::new(service, Arc::clone(&self.config))
    }
}
