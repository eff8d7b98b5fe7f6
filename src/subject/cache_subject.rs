use std::{collections::VecDeque, mem, panic::Location};

use crate::{
  error::PublishError,
  observable::{Observable, Publisher},
  rc::{MutRc, RcDerefMut},
  subscription::Subscription,
};

/// A subject that holds values back while nobody listens.
///
/// Values pushed with zero subscribers are cached. The next subscriber
/// receives the cache in order, after which the cache is empty and the subject
/// behaves like a plain [`Subject`](crate::subject::Subject).
pub struct CacheSubject<A> {
  observable: Observable<A>,
  cache: MutRc<VecDeque<A>>,
}

impl<A: Clone + 'static> CacheSubject<A> {
  pub fn new() -> Self {
    CacheSubject {
      observable: Observable::sink(),
      cache: MutRc::own(VecDeque::new()),
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
    self.observable.reap_leaked();
    if !self.observable.is_finished() && self.observable.subscriber_count() == 0 {
      self.cache.rc_deref_mut().push_back(value);
      return Ok(());
    }
    self.observable.try_publish(value)
  }

  pub fn finish(&self) { self.observable.finish() }

  pub fn is_finished(&self) -> bool { self.observable.is_finished() }
}

impl<A: Clone + 'static> Default for CacheSubject<A> {
  fn default() -> Self { Self::new() }
}

impl<A> Clone for CacheSubject<A> {
  fn clone(&self) -> Self {
    CacheSubject {
      observable: self.observable.clone(),
      cache: self.cache.clone(),
    }
  }
}

impl<A: Clone + 'static> Publisher for CacheSubject<A> {
  type Item = A;

  fn subscribe_at<F>(&self, location: &'static Location<'static>, mut callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    let cached = mem::take(&mut *self.cache.rc_deref_mut());
    if self.observable.is_finished() {
      cached.into_iter().for_each(&mut callback);
      return Subscription::empty();
    }
    self.observable.subscribe_with_replay(location, callback, cached, false)
  }

  fn subscriber_count(&self) -> usize { self.observable.subscriber_count() }
}
