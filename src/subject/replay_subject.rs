use std::{collections::VecDeque, panic::Location};

use crate::{
  error::PublishError,
  observable::{Observable, Publisher},
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

/// A subject that remembers what it was pushed.
///
/// Every new subscriber first receives the backlog, oldest first, then live
/// values. [`ReplaySubject::bounded`] keeps only the most recent values.
pub struct ReplaySubject<A> {
  observable: Observable<A>,
  backlog: MutRc<VecDeque<A>>,
  capacity: Option<usize>,
}

impl<A: Clone + 'static> ReplaySubject<A> {
  pub fn new() -> Self { Self::with_capacity(None) }

  /// Replay at most the last `capacity` values.
  pub fn bounded(capacity: usize) -> Self { Self::with_capacity(Some(capacity)) }

  fn with_capacity(capacity: Option<usize>) -> Self {
    ReplaySubject {
      observable: Observable::sink(),
      backlog: MutRc::own(VecDeque::new()),
      capacity,
    }
  }

  /// # Panics
  ///
  /// Panics if the subject was finished.
  #[track_caller]
  pub fn push(&self, value: A) {
    if let Err(err) = self.try_push(value) {
      panic!("{err}");
    }
  }

  pub fn try_push(&self, value: A) -> Result<(), PublishError<A>> {
    if self.observable.is_finished() {
      return self.observable.try_publish(value);
    }
    {
      let mut backlog = self.backlog.rc_deref_mut();
      backlog.push_back(value.clone());
      if let Some(capacity) = self.capacity {
        while backlog.len() > capacity {
          backlog.pop_front();
        }
      }
    }
    self.observable.try_publish(value)
  }

  /// Forget the backlog. Current subscriptions are not affected.
  pub fn clear(&self) { self.backlog.rc_deref_mut().clear(); }

  pub fn backlog_len(&self) -> usize { self.backlog.rc_deref().len() }

  /// Cancel all subscriptions. Later subscribers still receive the backlog.
  pub fn finish(&self) { self.observable.finish() }

  pub fn is_finished(&self) -> bool { self.observable.is_finished() }
}

impl<A: Clone + 'static> Default for ReplaySubject<A> {
  fn default() -> Self { Self::new() }
}

impl<A> Clone for ReplaySubject<A> {
  fn clone(&self) -> Self {
    ReplaySubject {
      observable: self.observable.clone(),
      backlog: self.backlog.clone(),
      capacity: self.capacity,
    }
  }
}

impl<A: Clone + 'static> Publisher for ReplaySubject<A> {
  type Item = A;

  fn subscribe_at<F>(&self, location: &'static Location<'static>, mut callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    let backlog: Vec<A> = self.backlog.rc_deref().iter().cloned().collect();
    if self.observable.is_finished() {
      backlog.into_iter().for_each(&mut callback);
      return Subscription::empty();
    }
    self.observable.subscribe_with_replay(location, callback, backlog, true)
  }

  fn subscriber_count(&self) -> usize { self.observable.subscriber_count() }
}
