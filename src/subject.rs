//! Producers that callers push values into directly.
//!
//! The three subjects only differ in what happens to values pushed while
//! nobody listens:
//!
//! | Subject | Values pushed with zero subscribers |
//! |---------|-------------------------------------|
//! | [`Subject`] | lost |
//! | [`ReplaySubject`] | kept, every new subscriber receives the whole backlog |
//! | [`CacheSubject`] | kept until the first subscriber arrives, then flushed |
use std::panic::Location;

use crate::{
  error::PublishError,
  observable::{Observable, Publisher},
  subscription::Subscription,
};

mod cache_subject;
mod replay_subject;
pub use cache_subject::CacheSubject;
pub use replay_subject::ReplaySubject;

/// A plain multicast producer.
pub struct Subject<A> {
  observable: Observable<A>,
}

impl<A: Clone + 'static> Subject<A> {
  pub fn new() -> Self { Subject { observable: Observable::sink() } }

  /// Deliver `value` to every current subscriber.
  ///
  /// # Panics
  ///
  /// Panics if the subject was finished. Use [`Subject::try_push`] to get the
  /// value back instead.
  #[track_caller]
  pub fn push(&self, value: A) {
    if let Err(err) = self.try_push(value) {
      panic!("{err}");
    }
  }

  pub fn try_push(&self, value: A) -> Result<(), PublishError<A>> { self.observable.try_publish(value) }

  /// Cancel all subscriptions. Pushing afterwards is an error.
  pub fn finish(&self) { self.observable.finish() }

  pub fn is_finished(&self) -> bool { self.observable.is_finished() }

  /// Read-only view of this subject.
  pub fn as_observable(&self) -> Observable<A> { self.observable.clone() }
}

impl<A: Clone + 'static> Default for Subject<A> {
  fn default() -> Self { Self::new() }
}

impl<A> Clone for Subject<A> {
  fn clone(&self) -> Self { Subject { observable: self.observable.clone() } }
}

impl<A: Clone + 'static> Publisher for Subject<A> {
  type Item = A;

  fn subscribe_at<F>(&self, location: &'static Location<'static>, callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    self.observable.subscribe_at(location, callback)
  }

  fn subscriber_count(&self) -> usize { self.observable.subscriber_count() }
}
