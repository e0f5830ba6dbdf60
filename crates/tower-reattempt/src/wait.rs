//! Wait strategies: how long to pause before each retry.
//!
//! The default strategy is [`NoWait`]: a failed attempt is retried
//! immediately. The other strategies are opt-in via
//! [`ReattemptConfigBuilder`](crate::ReattemptConfigBuilder).

use rand::Rng as _;
use std::time::Duration;

const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Computes the delay to apply before a retry.
///
/// `retry` is 1-indexed: 1 is the first retry (i.e. the second attempt).
pub trait WaitStrategy: Send + Sync {
    fn wait_before(&self, retry: usize) -> Duration;
}

/// No delay between attempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

impl WaitStrategy for NoWait {
    fn wait_before(&self, _retry: usize) -> Duration {
        Duration::ZERO
    }
}

/// The same delay before every retry.
#[derive(Debug, Clone, Copy)]
pub struct FixedWait {
    interval: Duration,
}

impl FixedWait {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl WaitStrategy for FixedWait {
    fn wait_before(&self, _retry: usize) -> Duration {
        self.interval
    }
}

/// Exponentially growing delay: `initial * multiplier^(retry - 1)`, capped.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialWait {
    initial: Duration,
    multiplier: f64,
    max: Duration,
}

impl ExponentialWait {
    /// Creates a strategy with a multiplier of 2.0 and a 30s cap.
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            multiplier: DEFAULT_MULTIPLIER,
            max: DEFAULT_MAX_WAIT,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    fn uncapped(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        Duration::from_secs_f64(self.initial.as_secs_f64() * self.multiplier.powi(exponent))
    }
}

impl WaitStrategy for ExponentialWait {
    fn wait_before(&self, retry: usize) -> Duration {
        self.uncapped(retry).min(self.max)
    }
}

/// Exponential delay with uniform jitter.
///
/// Each delay is sampled uniformly from
/// `[base * (1 - randomization), base * (1 + randomization)]` where `base`
/// grows exponentially. Jitter spreads out retries from callers that failed
/// at the same moment.
#[derive(Debug, Clone, Copy)]
pub struct JitteredWait {
    base: ExponentialWait,
    randomization: f64,
}

impl JitteredWait {
    /// Creates a strategy with a randomization factor of 0.5.
    pub fn new(initial: Duration) -> Self {
        Self {
            base: ExponentialWait::new(initial),
            randomization: 0.5,
        }
    }

    /// Sets the randomization factor, clamped to `[0.0, 1.0]`.
    pub fn with_randomization(mut self, randomization: f64) -> Self {
        self.randomization = randomization.clamp(0.0, 1.0);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.base = self.base.with_multiplier(multiplier);
        self
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.base = self.base.with_max(max);
        self
    }
}

impl WaitStrategy for JitteredWait {
    fn wait_before(&self, retry: usize) -> Duration {
        let base = self.base.uncapped(retry).as_secs_f64();
        let spread = base * self.randomization;
        let low = (base - spread).max(0.0);
        let high = base + spread;
        let sampled = if high > low {
            rand::rng().random_range(low..=high)
        } else {
            base
        };
        Duration::from_secs_f64(sampled).min(self.base.max)
    }
}

/// A strategy backed by a plain function of the retry index.
pub struct FnWait<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    f: F,
}

impl<F> FnWait<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> WaitStrategy for FnWait<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn wait_before(&self, retry: usize) -> Duration {
        (self.f)(retry)
    }
}
