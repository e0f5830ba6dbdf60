//! End-to-end scenarios against a mocked, rate-limited cloud API.
//!
//! The client exposes a single `list_instances` operation that either
//! returns instance ids or fails with a classified rate-limit error. The
//! tests assert on the outcome and on how many times the underlying
//! operation was invoked.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::{Layer, Service, ServiceExt};
use tower_reattempt::ReattemptConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
struct ApiError {
    code: String,
    message: String,
}

fn rate_limited() -> ApiError {
    ApiError {
        code: "RateLimitExceeded".to_string(),
        message: "Your requests have exceeded the rate limit. Please try again.".to_string(),
    }
}

#[tokio::test]
async fn rate_limit_surfaces_after_three_attempts() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let list_instances = tower::service_fn(move |_req: ()| {
        let cc = Arc::clone(&cc);
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            Err::<Vec<u32>, _>(rate_limited())
        }
    });

    let config: ReattemptConfig<ApiError> = ReattemptConfig::builder().max_attempts(3).build();
    let mut service = config.layer().layer(list_instances);

    let result = service.ready().await.unwrap().call(()).await;

    // The rate-limit error comes back untranslated, code and message intact.
    assert_eq!(result.unwrap_err(), rate_limited());
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn second_attempt_returns_instances() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let list_instances = tower::service_fn(move |_req: ()| {
        let cc = Arc::clone(&cc);
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count == 0 {
                Err(rate_limited())
            } else {
                Ok::<_, ApiError>(vec![1, 2, 3])
            }
        }
    });

    // No attempt bound configured: retry until the API lets us through.
    let config: ReattemptConfig<ApiError> = ReattemptConfig::builder().build();
    let mut service = config.layer().layer(list_instances);

    let result = service.ready().await.unwrap().call(()).await;

    assert_eq!(result.unwrap(), vec![1, 2, 3]);
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn undecorated_call_fails_on_first_attempt() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let mut list_instances = tower::service_fn(move |_req: ()| {
        let cc = Arc::clone(&cc);
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            Err::<Vec<u32>, _>(rate_limited())
        }
    });

    let result = list_instances.ready().await.unwrap().call(()).await;

    assert_eq!(result.unwrap_err(), rate_limited());
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn absorbed_failure_succeeds_without_retrying() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    // The operation swallows its own failure and reports None instead.
    // From the middleware's point of view the first attempt succeeds, so
    // the three-attempt bound never comes into play.
    let list_instances = tower::service_fn(move |_req: ()| {
        let cc = Arc::clone(&cc);
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            let raw: Result<Vec<u32>, ApiError> = Err(rate_limited());
            Ok::<_, ApiError>(raw.ok())
        }
    });

    let config: ReattemptConfig<ApiError> = ReattemptConfig::builder().max_attempts(3).build();
    let mut service = config.layer().layer(list_instances);

    let result = service.ready().await.unwrap().call(()).await;

    assert_eq!(result.unwrap(), None);
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}
