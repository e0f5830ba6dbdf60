//! Shared infrastructure for tower-reattempt.
//!
//! Currently this is the event system: a small trait for events emitted by
//! middleware instances, plus listener plumbing that configs can hand out
//! to callers for observability.

pub mod events;

pub use events::{EventListener, MiddlewareEvent};
