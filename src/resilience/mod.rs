//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (enforce wait-time bound)
//!     → On elapse: caller maps DeadlineElapsed to 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries: a failed or timed-out attempt is reported once and the caller resubmits

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineElapsed};
