//! Clock and timer collaborators for the time based operators.
//!
//! Operators such as `delayed`, `once_every` and `time_buffer` never manage
//! timers themselves; they ask a [`Scheduler`] for the current time and for
//! deferred execution.
//!
//! - [`ManualScheduler`]: virtual time advanced by the host, e.g. once per
//!   frame, and by tests.
//! - [`TokioLocalScheduler`] (feature `tokio-scheduler`): wall-clock time on a
//!   tokio `LocalSet`.
pub use std::time::Duration;

use crate::subscription::Subscription;

mod manual_scheduler;
pub use manual_scheduler::ManualScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioLocalScheduler;

pub trait Scheduler: Clone + 'static {
  /// Time elapsed since the scheduler's origin.
  fn now(&self) -> Duration;

  /// Run `task` once `delay` has passed. Cancelling the returned subscription
  /// before that prevents the run.
  fn after<F>(&self, delay: Duration, task: F) -> Subscription
  where
    F: FnOnce() + 'static;
}
