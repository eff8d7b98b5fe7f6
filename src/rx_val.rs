//! Values that change over time.
//!
//! An [`RxVal`] always has a current value. Subscribing hands the current
//! value to the new subscriber right away, then every change after it. Setting
//! a value equal to the current one (per the value's comparer) is not a change
//! and notifies nobody.
//!
//! Derived values ([`RxVal::map`], [`RxVal::zip`], ...) compute their first
//! value eagerly and then follow their sources:
//!
//! - the derived value owns its subscription to the source, so a chain stays
//!   alive as long as its last link is reachable;
//! - the source only reaches the derived value through a weak link, so
//!   dropping the last handle to a derived value (its subscriptions count as
//!   handles) cancels the source subscription on the spot.
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use rxstream::prelude::*;
//!
//! let count = RxRef::new(1);
//! let label = count.as_val().map(|c| format!("{c} items"));
//! assert_eq!(label.value(), "1 items");
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//! let _s = label.subscribe(move |v| c_seen.borrow_mut().push(v));
//! count.set(2);
//! count.set(2);
//! assert_eq!(*seen.borrow(), vec!["1 items", "2 items"]);
//! ```
use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  panic::Location,
  rc::{Rc, Weak},
};

use tracing::warn;

use crate::{
  error::StreamId,
  observable::{Observable, Publisher},
  subscription::Subscription,
};

pub mod cache;
pub mod ops;
pub mod rx_ref;

pub use cache::RxValCache;
pub use rx_ref::RxRef;

/// A [`Publisher`] that also knows its current value.
pub trait ValueHolder: Publisher {
  fn value(&self) -> Self::Item;

  /// Subscribe to changes only, skipping the current value.
  fn subscribe_without_emit_at<F>(
    &self, location: &'static Location<'static>, callback: F,
  ) -> Subscription
  where
    F: FnMut(Self::Item) + 'static;

  #[track_caller]
  fn subscribe_without_emit<F>(&self, callback: F) -> Subscription
  where
    F: FnMut(Self::Item) + 'static,
  {
    self.subscribe_without_emit_at(Location::caller(), callback)
  }
}

pub(crate) type Comparer<A> = Rc<dyn Fn(&A, &A) -> bool>;

/// A value with change notification. Clones share the value.
pub struct RxVal<A> {
  core: Rc<RxValCore<A>>,
}

struct RxValCore<A> {
  value: RefCell<A>,
  eq: Comparer<A>,
  changes: Observable<A>,
  upstream: RefCell<Option<Subscription>>,
}

/// Write access handed to the source of an [`RxVal`].
///
/// Holds the value weakly; setting a value that was dropped does nothing.
pub struct RxValSetter<A>(Weak<RxValCore<A>>);

impl<A> Clone for RxValSetter<A> {
  fn clone(&self) -> Self { RxValSetter(self.0.clone()) }
}

impl<A: Clone + 'static> RxValSetter<A> {
  /// Returns `true` if the value changed.
  pub fn set(&self, value: A) -> bool { self.0.upgrade().is_some_and(|core| core.set(value)) }
}

impl<A: Clone + 'static> RxVal<A> {
  /// A value that never changes.
  pub fn constant(value: A) -> Self { Self::from_parts(value, Rc::new(|_: &A, _: &A| true)) }

  /// A value fed by `subscribe_fn`, compared with `PartialEq`.
  ///
  /// `subscribe_fn` runs once, right away. The subscription it returns is
  /// held until the value is dropped.
  pub fn new(initial: A, subscribe_fn: impl FnOnce(RxValSetter<A>) -> Subscription) -> Self
  where
    A: PartialEq,
  {
    Self::with_comparer(initial, <A as PartialEq>::eq, subscribe_fn)
  }

  pub fn with_comparer(
    initial: A, eq: impl Fn(&A, &A) -> bool + 'static,
    subscribe_fn: impl FnOnce(RxValSetter<A>) -> Subscription,
  ) -> Self {
    let val = Self::from_parts(initial, Rc::new(eq));
    let upstream = subscribe_fn(val.setter());
    *val.core.upstream.borrow_mut() = Some(upstream);
    val
  }

  pub(crate) fn from_parts(initial: A, eq: Comparer<A>) -> Self {
    RxVal {
      core: Rc::new(RxValCore {
        value: RefCell::new(initial),
        eq,
        changes: Observable::sink(),
        upstream: RefCell::new(None),
      }),
    }
  }

  pub(crate) fn setter(&self) -> RxValSetter<A> { RxValSetter(Rc::downgrade(&self.core)) }

  pub(crate) fn set(&self, value: A) -> bool { self.core.set(value) }

  /// `true` if both handles share the same value.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.core, &other.core) }

  /// Read the current value without cloning it.
  pub fn with_value<R>(&self, f: impl FnOnce(&A) -> R) -> R { f(&*self.core.value.borrow()) }

  #[inline]
  pub fn id(&self) -> StreamId { self.core.changes.id() }

  /// The changes of this value as a plain event stream, without the current
  /// value on subscribe. The stream keeps the value alive.
  #[track_caller]
  pub fn to_event_source(&self) -> Observable<A> {
    let location = Location::caller();
    let val = self.clone();
    Observable::new(move |emit| {
      val.subscribe_without_emit_at(location, move |v| {
        emit.emit(v);
      })
    })
  }

  /// Tie `subscription` to the lifetime of this value.
  fn keep_alive(&self, subscription: Subscription) -> Subscription {
    if !subscription.is_active() {
      return subscription;
    }
    let core = self.core.clone();
    subscription.and_then(move || drop(core))
  }
}

impl<A: Clone + 'static> RxValCore<A> {
  fn set(&self, value: A) -> bool {
    if (self.eq)(&*self.value.borrow(), &value) {
      return false;
    }
    *self.value.borrow_mut() = value.clone();
    if let Err(err) = self.changes.try_publish(value) {
      warn!(stream = %err.stream(), "value change on a finished stream dropped");
    }
    true
  }
}

impl<A> Drop for RxValCore<A> {
  fn drop(&mut self) {
    if let Some(upstream) = self.upstream.get_mut().take() {
      upstream.cancel();
    }
  }
}

impl<A> Clone for RxVal<A> {
  fn clone(&self) -> Self { RxVal { core: self.core.clone() } }
}

impl<A: Clone + 'static> Publisher for RxVal<A> {
  type Item = A;

  /// The callback receives the current value before this returns.
  fn subscribe_at<F>(&self, location: &'static Location<'static>, callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    let current = self.value();
    let subscription = self
      .core
      .changes
      .subscribe_with_replay(location, callback, [current], true);
    self.keep_alive(subscription)
  }

  fn subscriber_count(&self) -> usize { self.core.changes.subscriber_count() }
}

impl<A: Clone + 'static> ValueHolder for RxVal<A> {
  fn value(&self) -> A { self.core.value.borrow().clone() }

  fn subscribe_without_emit_at<F>(
    &self, location: &'static Location<'static>, callback: F,
  ) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    let subscription = self.core.changes.subscribe_at(location, callback);
    self.keep_alive(subscription)
  }
}

impl<A: Clone + Debug + 'static> Debug for RxVal<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RxVal")
      .field("id", &self.core.changes.id())
      .field("value", &*self.core.value.borrow())
      .finish()
  }
}
