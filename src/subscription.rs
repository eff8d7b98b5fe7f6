use std::{
  cell::{Cell, RefCell},
  fmt::{Debug, Formatter},
  rc::{Rc, Weak},
};

/// Handle returned by every `subscribe` call.
///
/// A subscription is single-shot: [`cancel`](Subscription::cancel) flips it
/// from active to inactive once and runs its cancel action once. Clones share
/// the same state.
///
/// The observable only keeps a weak link to the handle. Dropping every clone
/// without cancelling is treated as a leaked subscription: the observable
/// reports it and removes the subscriber on its next delivery. Keep the handle
/// (or a [`SubscriptionGuard`]) for as long as events should flow.
#[derive(Clone)]
#[must_use = "dropping a subscription without cancelling it is reported as a leak"]
pub struct Subscription(Rc<SubscriptionInner>);

pub(crate) struct SubscriptionInner {
  active: Cell<bool>,
  on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Non-owning link to a [`Subscription`].
#[derive(Clone)]
pub struct WeakSubscription(Weak<SubscriptionInner>);

impl Subscription {
  /// An active subscription that runs `on_cancel` when cancelled.
  pub fn new(on_cancel: impl FnOnce() + 'static) -> Self {
    Subscription(Rc::new(SubscriptionInner {
      active: Cell::new(true),
      on_cancel: RefCell::new(Some(Box::new(on_cancel))),
    }))
  }

  /// An already cancelled subscription.
  pub fn empty() -> Self {
    Subscription(Rc::new(SubscriptionInner {
      active: Cell::new(false),
      on_cancel: RefCell::new(None),
    }))
  }

  /// Cancel the subscription.
  ///
  /// Returns `true` if this call made the transition from active to inactive,
  /// `false` if it was already inactive.
  pub fn cancel(&self) -> bool {
    if !self.0.active.replace(false) {
      return false;
    }
    let on_cancel = self.0.on_cancel.borrow_mut().take();
    if let Some(on_cancel) = on_cancel {
      on_cancel();
    }
    true
  }

  #[inline]
  pub fn is_active(&self) -> bool { self.0.active.get() }

  /// A subscription that cancels `self` and then runs `action`.
  pub fn and_then(self, action: impl FnOnce() + 'static) -> Subscription {
    Subscription::new(move || {
      self.cancel();
      action();
    })
  }

  /// A subscription that cancels both `self` and `other`.
  pub fn join(self, other: Subscription) -> Subscription {
    Subscription::new(move || {
      self.cancel();
      other.cancel();
    })
  }

  /// A subscription that cancels every member, in order.
  pub fn join_all(subscriptions: impl IntoIterator<Item = Subscription>) -> Subscription {
    let subscriptions: Vec<_> = subscriptions.into_iter().collect();
    Subscription::new(move || {
      for s in &subscriptions {
        s.cancel();
      }
    })
  }

  /// Activates "RAII" behavior for this subscription. That means `cancel()`
  /// will be called automatically as soon as the returned value goes out of
  /// scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `cancel()` is called immediately, which is probably not what you want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  pub fn downgrade(&self) -> WeakSubscription { WeakSubscription(Rc::downgrade(&self.0)) }
}

impl WeakSubscription {
  /// `None` once every owning handle is gone.
  pub fn upgrade(&self) -> Option<Subscription> { self.0.upgrade().map(Subscription) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.is_active())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be cancelled.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(subscription) }

  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.cancel(); }
}
