//! Retrying calls against a rate-limited API.
//!
//! Run with: cargo run --example flaky_api

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};
use tower_reattempt::ReattemptConfig;

#[derive(Debug, Clone, thiserror::Error)]
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

#[tokio::main]
async fn main() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    // An instance-listing API that rejects the first two calls.
    let list_instances = tower::service_fn(move |_req: ()| {
        let cc = Arc::clone(&cc);
        async move {
            let attempt = cc.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  call {attempt} to list_instances");
            if attempt < 3 {
                Err(rate_limited())
            } else {
                Ok::<_, ApiError>(vec![1, 2, 3])
            }
        }
    });

    let config: ReattemptConfig<ApiError> = ReattemptConfig::builder()
        .name("list-instances")
        .max_attempts(5)
        .fixed_wait(Duration::from_millis(100))
        .on_retry(|attempt, wait| {
            println!("  [retry] attempt {attempt} failed, waiting {wait:?}");
        })
        .on_success(|attempts| {
            println!("  [success] after {attempts} attempts");
        })
        .build();

    let mut service = config.layer().layer(list_instances);

    println!("Listing instances with retries:");
    match service.ready().await.unwrap().call(()).await {
        Ok(instances) => println!("  instances: {instances:?}\n"),
        Err(e) => println!("  gave up: {e}\n"),
    }

    // The same policy can drive a plain closure.
    println!("Driving a closure with the same policy:");
    let closure_config: ReattemptConfig<ApiError> =
        ReattemptConfig::builder().max_attempts(3).build();

    let mut calls = 0;
    let result = closure_config
        .run(|| {
            calls += 1;
            println!("  closure call {calls}");
            async move { Err::<(), _>(rate_limited()) }
        })
        .await;

    match result {
        Ok(()) => println!("  succeeded"),
        Err(e) => println!("  gave up after {calls} calls: {e}"),
    }
}
