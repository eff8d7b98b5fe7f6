//! The delivery engine.
//!
//! An [`Observable`] owns a table of subscribers and pushes every published
//! value to them in subscription order. Delivery is re-entrant safe: a value
//! published from inside a subscriber callback is queued and delivered after
//! the running pass is over, so every subscriber sees the same order of
//! events.
//!
//! Observables come in two shapes:
//!
//! - sinks, fed directly by a producer such as a
//!   [`Subject`](crate::subject::Subject) or an [`RxVal`](crate::rx_val::RxVal);
//! - operator observables built with [`Observable::new`], which subscribe to
//!   their upstream when the first subscriber arrives and cancel that
//!   subscription when the last one leaves.
use std::{
  any::Any,
  cell::{Cell, RefCell},
  collections::VecDeque,
  fmt::{Debug, Formatter},
  mem,
  panic::{self, AssertUnwindSafe, Location},
  rc::{Rc, Weak},
};

use tracing::{error, trace, warn};

use crate::{
  error::{PublishError, StreamId},
  subscription::Subscription,
};

pub(crate) mod subscribers;
use subscribers::{Callback, HandleRef, HandleState, Subscribers};

/// Anything that can be subscribed to.
pub trait Publisher {
  type Item;

  /// Subscribe with an explicit call site, reported in diagnostics about this
  /// subscriber.
  fn subscribe_at<F>(&self, location: &'static Location<'static>, callback: F) -> Subscription
  where
    F: FnMut(Self::Item) + 'static;

  /// Subscribers that are registered and not waiting for removal.
  fn subscriber_count(&self) -> usize;

  /// Register `callback` for every future event.
  ///
  /// Events keep flowing while the returned [`Subscription`] is alive and
  /// active.
  #[track_caller]
  fn subscribe<F>(&self, callback: F) -> Subscription
  where
    F: FnMut(Self::Item) + 'static,
  {
    self.subscribe_at(Location::caller(), callback)
  }
}

type SubscribeFn<A> = Box<dyn Fn(Emitter<A>) -> Subscription>;

pub struct Observable<A> {
  core: Rc<ObservableCore<A>>,
}

pub(crate) struct ObservableCore<A> {
  id: StreamId,
  table: RefCell<Subscribers<A>>,
  pending: RefCell<VecDeque<A>>,
  lifecycle: Cell<Lifecycle>,
  subscribe_fn: Option<SubscribeFn<A>>,
  upstream: RefCell<Upstream>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Lifecycle {
  Open,
  /// `finish` was called during a delivery pass.
  FinishRequested,
  Finished,
}

enum Upstream {
  Idle,
  /// Inside the subscribe function.
  Connecting,
  Connected(Subscription),
}

/// Write end handed to the subscribe function of an operator observable.
///
/// It does not keep the observable alive; emitting after the observable is
/// gone is a no-op.
pub struct Emitter<A>(Weak<ObservableCore<A>>);

impl<A> Clone for Emitter<A> {
  fn clone(&self) -> Self { Emitter(self.0.clone()) }
}

impl<A> Clone for Observable<A> {
  fn clone(&self) -> Self { Observable { core: self.core.clone() } }
}

impl<A: Clone + 'static> Emitter<A> {
  /// Publish `value` downstream. Returns `false` if nobody can receive it any
  /// more.
  pub fn emit(&self, value: A) -> bool {
    let Some(core) = self.0.upgrade() else {
      return false;
    };
    match core.try_publish(value) {
      Ok(()) => true,
      Err(err) => {
        warn!(
          stream = %err.stream(),
          item = std::any::type_name::<A>(),
          "emit into a finished stream ignored"
        );
        false
      }
    }
  }
}

impl<A: Clone + 'static> Observable<A> {
  /// An operator observable.
  ///
  /// `subscribe_fn` is called with an [`Emitter`] when the subscriber count
  /// goes from zero to one, and the subscription it returns is cancelled when
  /// the count drops back to zero.
  pub fn new(subscribe_fn: impl Fn(Emitter<A>) -> Subscription + 'static) -> Self {
    Self::with_source(Some(Box::new(subscribe_fn)))
  }

  /// An observable that never emits. Subscriptions to it are returned
  /// inactive.
  pub fn empty() -> Self {
    let observable = Self::sink();
    observable.finish();
    observable
  }

  /// An observable fed only by its owner.
  pub(crate) fn sink() -> Self { Self::with_source(None) }

  fn with_source(subscribe_fn: Option<SubscribeFn<A>>) -> Self {
    Observable {
      core: Rc::new(ObservableCore {
        id: StreamId::next(),
        table: RefCell::new(Subscribers::default()),
        pending: RefCell::new(VecDeque::new()),
        lifecycle: Cell::new(Lifecycle::Open),
        subscribe_fn,
        upstream: RefCell::new(Upstream::Idle),
      }),
    }
  }

  #[inline]
  pub fn id(&self) -> StreamId { self.core.id }

  /// `true` once the stream was finished, including a finish that waits for
  /// the running delivery pass.
  pub fn is_finished(&self) -> bool { self.core.lifecycle.get() != Lifecycle::Open }

  pub(crate) fn try_publish(&self, value: A) -> Result<(), PublishError<A>> {
    self.core.try_publish(value)
  }

  /// Cancel every subscription and the upstream. Later publishes fail and
  /// later subscriptions are returned inactive.
  pub(crate) fn finish(&self) { self.core.finish() }

  /// Take out subscribers whose handles were dropped without being cancelled,
  /// so [`Publisher::subscriber_count`] only counts live ones. Does nothing
  /// during a delivery pass.
  pub(crate) fn reap_leaked(&self) { self.core.reap_leaked() }

  /// Subscribe and hand `replay` to the new subscriber before any event
  /// published after this call.
  ///
  /// Set `replay_has_queued` when `replay` was taken from state that already
  /// holds the events still queued for delivery, as a replay backlog or a
  /// current value does. The new subscriber then skips those events instead of
  /// receiving them twice.
  pub(crate) fn subscribe_with_replay<F>(
    &self, location: &'static Location<'static>, callback: F, replay: impl IntoIterator<Item = A>,
    replay_has_queued: bool,
  ) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    let callback: Callback<A> = Rc::new(RefCell::new(callback));
    let subscription = self.core.register(location, callback.clone(), replay_has_queued);
    if !subscription.is_active() {
      return subscription;
    }

    let owns_pass = self.core.begin_pass();
    for value in replay {
      if !subscription.is_active() {
        break;
      }
      if !self.core.invoke(&callback, location, value) {
        subscription.cancel();
      }
    }
    if owns_pass {
      self.core.run_pending();
    }
    subscription
  }
}

impl<A: Clone + 'static> Publisher for Observable<A> {
  type Item = A;

  fn subscribe_at<F>(&self, location: &'static Location<'static>, callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    self.core.register(location, Rc::new(RefCell::new(callback)), false)
  }

  fn subscriber_count(&self) -> usize { self.core.table.borrow().count() }
}

impl<A> Debug for Observable<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Observable")
      .field("id", &self.core.id)
      .field("subscribers", &self.core.table.borrow().count())
      .field("lifecycle", &self.core.lifecycle.get())
      .finish()
  }
}

impl<A: Clone + 'static> ObservableCore<A> {
  fn register(
    self: &Rc<Self>, location: &'static Location<'static>, callback: Callback<A>, skip_queued: bool,
  ) -> Subscription {
    if self.lifecycle.get() != Lifecycle::Open {
      return Subscription::empty();
    }
    let skip = if skip_queued { self.pending.borrow().len() } else { 0 };
    let id = self.table.borrow_mut().reserve_id();
    let core = self.clone();
    let subscription = Subscription::new(move || core.remove(id));
    self
      .table
      .borrow_mut()
      .insert(id, callback, HandleRef::new(&subscription), location, skip);
    self.connect();
    subscription
  }

  fn remove(self: &Rc<Self>, id: usize) {
    let (removed, empty) = {
      let mut table = self.table.borrow_mut();
      table.mark_removed(id);
      if table.iterating {
        (Vec::new(), false)
      } else {
        (table.compact(), table.count() == 0)
      }
    };
    drop(removed);
    if empty {
      self.disconnect();
    }
  }

  fn connect(self: &Rc<Self>) {
    let Some(subscribe_fn) = &self.subscribe_fn else {
      return;
    };
    {
      let mut upstream = self.upstream.borrow_mut();
      if !matches!(*upstream, Upstream::Idle) {
        return;
      }
      *upstream = Upstream::Connecting;
    }
    trace!(stream = %self.id, "subscribing upstream");
    let subscription = subscribe_fn(Emitter(Rc::downgrade(self)));
    *self.upstream.borrow_mut() = Upstream::Connected(subscription);
    if self.table.borrow().count() == 0 {
      self.disconnect();
    }
  }

  fn disconnect(&self) {
    let upstream = {
      let mut upstream = self.upstream.borrow_mut();
      if !matches!(*upstream, Upstream::Connected(_)) {
        return;
      }
      mem::replace(&mut *upstream, Upstream::Idle)
    };
    if let Upstream::Connected(subscription) = upstream {
      trace!(stream = %self.id, "unsubscribing upstream");
      subscription.cancel();
    }
  }

  fn try_publish(self: &Rc<Self>, value: A) -> Result<(), PublishError<A>> {
    if self.lifecycle.get() != Lifecycle::Open {
      return Err(PublishError::Finished { stream: self.id, value });
    }
    if !self.begin_pass() {
      self.pending.borrow_mut().push_back(value);
      return Ok(());
    }
    self.deliver(value);
    self.run_pending();
    Ok(())
  }

  /// Returns `false` if a pass is already running.
  fn begin_pass(&self) -> bool {
    let mut table = self.table.borrow_mut();
    if table.iterating {
      false
    } else {
      table.iterating = true;
      true
    }
  }

  fn run_pending(self: &Rc<Self>) {
    while let Some(value) = self.end_pass() {
      self.deliver(value);
    }
  }

  /// Clean up after a pass. Returns the next queued event, in which case the
  /// pass continues with it.
  fn end_pass(self: &Rc<Self>) -> Option<A> {
    let (removed, empty, next) = {
      let mut table = self.table.borrow_mut();
      let removed = table.compact();
      let next = self.pending.borrow_mut().pop_front();
      if next.is_none() {
        table.iterating = false;
      }
      (removed, table.count() == 0, next)
    };
    drop(removed);
    if empty {
      self.disconnect();
    }
    if next.is_none() && self.lifecycle.get() == Lifecycle::FinishRequested {
      self.finish();
    }
    next
  }

  fn deliver(&self, value: A) {
    let len = self.table.borrow().len();
    for idx in 0..len {
      let target = {
        let mut table = self.table.borrow_mut();
        let record = &mut table.records[idx];
        if !record.active || record.removed {
          continue;
        }
        match record.handle.state() {
          HandleState::Active if record.skip > 0 => {
            record.skip -= 1;
            None
          }
          HandleState::Active => Some((record.callback.clone(), record.location)),
          HandleState::Cancelled => {
            table.mark_removed_at(idx);
            None
          }
          HandleState::Leaked => {
            warn!(
              stream = %self.id,
              subscribed_at = %record.location,
              "active subscription was dropped without being cancelled, unsubscribing"
            );
            table.mark_removed_at(idx);
            None
          }
        }
      };
      let Some((callback, location)) = target else {
        continue;
      };
      if !self.invoke(&callback, location, value.clone()) {
        let handle = self.table.borrow().records[idx].handle.upgrade();
        if let Some(handle) = handle {
          handle.cancel();
        }
      }
    }
  }

  /// Run one subscriber callback. Returns `false` if it panicked.
  fn invoke(&self, callback: &Callback<A>, location: &'static Location<'static>, value: A) -> bool {
    let Ok(mut callback) = callback.try_borrow_mut() else {
      warn!(stream = %self.id, subscribed_at = %location, "subscriber is already running, event skipped");
      return true;
    };
    match panic::catch_unwind(AssertUnwindSafe(|| (*callback)(value))) {
      Ok(()) => true,
      Err(payload) => {
        error!(
          stream = %self.id,
          subscribed_at = %location,
          panic = panic_message(payload.as_ref()),
          "subscriber panicked on event, unsubscribing"
        );
        false
      }
    }
  }

  fn reap_leaked(self: &Rc<Self>) {
    let (removed, empty) = {
      let mut table = self.table.borrow_mut();
      if table.iterating {
        return;
      }
      for idx in 0..table.len() {
        let record = &table.records[idx];
        if record.removed || !matches!(record.handle.state(), HandleState::Leaked) {
          continue;
        }
        warn!(
          stream = %self.id,
          subscribed_at = %record.location,
          "active subscription was dropped without being cancelled, unsubscribing"
        );
        table.mark_removed_at(idx);
      }
      (table.compact(), table.count() == 0)
    };
    drop(removed);
    if empty {
      self.disconnect();
    }
  }

  fn finish(self: &Rc<Self>) {
    if self.lifecycle.get() == Lifecycle::Finished {
      return;
    }
    if self.table.borrow().iterating {
      self.lifecycle.set(Lifecycle::FinishRequested);
      return;
    }
    self.lifecycle.set(Lifecycle::Finished);
    self.pending.borrow_mut().clear();
    let records = self.table.borrow_mut().drain();
    trace!(stream = %self.id, subscribers = records.len(), "finished");
    let handles: Vec<_> = records.iter().filter_map(|r| r.handle.upgrade()).collect();
    drop(records);
    for handle in handles {
      handle.cancel();
    }
    self.disconnect();
  }
}

impl<A> Drop for ObservableCore<A> {
  fn drop(&mut self) {
    if let Upstream::Connected(subscription) = mem::replace(self.upstream.get_mut(), Upstream::Idle) {
      subscription.cancel();
    }
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
  if let Some(msg) = payload.downcast_ref::<&str>() {
    msg
  } else if let Some(msg) = payload.downcast_ref::<String>() {
    msg.as_str()
  } else {
    "<non-string panic payload>"
  }
}
