use std::time::{Duration, Instant};
use tower_reattempt_core::events::MiddlewareEvent;

/// Events emitted by the reattempt middleware.
#[derive(Debug, Clone)]
pub enum ReattemptEvent {
    /// An attempt failed and a retry is about to be made.
    Retry {
        source: String,
        timestamp: Instant,
        /// Number of attempts that have failed so far (1 = first retry).
        attempt: usize,
        /// Delay applied before the next attempt.
        wait: Duration,
    },
    /// The operation succeeded, on the first attempt or after retries.
    Success {
        source: String,
        timestamp: Instant,
        /// Total attempts made, including the successful one.
        attempts: usize,
    },
    /// The operation failed and the attempt bound was reached.
    Exhausted {
        source: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// An error occurred but the retry predicate declined to retry it.
    Filtered { source: String, timestamp: Instant },
}

impl MiddlewareEvent for ReattemptEvent {
    fn kind(&self) -> &'static str {
        match self {
            ReattemptEvent::Retry { .. } => "Retry",
            ReattemptEvent::Success { .. } => "Success",
            ReattemptEvent::Exhausted { .. } => "Exhausted",
            ReattemptEvent::Filtered { .. } => "Filtered",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ReattemptEvent::Retry { timestamp, .. }
            | ReattemptEvent::Success { timestamp, .. }
            | ReattemptEvent::Exhausted { timestamp, .. }
            | ReattemptEvent::Filtered { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            ReattemptEvent::Retry { source, .. }
            | ReattemptEvent::Success { source, .. }
            | ReattemptEvent::Exhausted { source, .. }
            | ReattemptEvent::Filtered { source, .. } => source,
        }
    }
}
