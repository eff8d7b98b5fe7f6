use futures::future::{AbortHandle, Abortable};
use tokio::time::Instant;

use super::{Duration, Scheduler};
use crate::subscription::Subscription;

/// Wall-clock scheduler for tokio's single-threaded `LocalSet`.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so `after` must be
/// called from inside a `LocalSet`.
#[derive(Clone, Copy)]
pub struct TokioLocalScheduler {
  origin: Instant,
}

impl TokioLocalScheduler {
  pub fn new() -> Self { TokioLocalScheduler { origin: Instant::now() } }
}

impl Default for TokioLocalScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for TokioLocalScheduler {
  fn now(&self) -> Duration { self.origin.elapsed() }

  fn after<F>(&self, delay: Duration, task: F) -> Subscription
  where
    F: FnOnce() + 'static,
  {
    let (handle, registration) = AbortHandle::new_pair();
    let subscription = Subscription::new(move || handle.abort());
    let weak = subscription.downgrade();
    let delayed = async move {
      tokio::time::sleep(delay).await;
      // Deactivate the handle before running, as the manual scheduler does.
      if weak.upgrade().is_none_or(|s| s.cancel()) {
        task();
      }
    };
    tokio::task::spawn_local(Abortable::new(delayed, registration));
    subscription
  }
}
