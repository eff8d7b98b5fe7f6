//! The subscriber table behind every observable.
//!
//! Records are never removed while a delivery pass walks the table. A record
//! added mid-pass starts inactive, a record cancelled mid-pass is flagged, and
//! both are resolved by [`Subscribers::compact`] once the pass is over. Indices
//! of existing records are therefore stable for the whole pass.
use std::{cell::RefCell, panic::Location, rc::Rc};

use smallvec::SmallVec;

#[cfg(feature = "strong-subscriptions")]
use crate::subscription::Subscription;
#[cfg(not(feature = "strong-subscriptions"))]
use crate::subscription::{Subscription, WeakSubscription};

pub(crate) type Callback<A> = Rc<RefCell<dyn FnMut(A)>>;

/// How a record refers to the subscription handle it was created with.
#[cfg(not(feature = "strong-subscriptions"))]
pub(crate) struct HandleRef(WeakSubscription);
#[cfg(feature = "strong-subscriptions")]
pub(crate) struct HandleRef(Subscription);

pub(crate) enum HandleState {
  Active,
  Cancelled,
  /// Every owning handle was dropped without cancelling.
  Leaked,
}

#[cfg(not(feature = "strong-subscriptions"))]
impl HandleRef {
  pub(crate) fn new(subscription: &Subscription) -> Self { HandleRef(subscription.downgrade()) }

  pub(crate) fn upgrade(&self) -> Option<Subscription> { self.0.upgrade() }

  pub(crate) fn state(&self) -> HandleState {
    match self.0.upgrade() {
      Some(s) if s.is_active() => HandleState::Active,
      Some(_) => HandleState::Cancelled,
      None => HandleState::Leaked,
    }
  }
}

#[cfg(feature = "strong-subscriptions")]
impl HandleRef {
  pub(crate) fn new(subscription: &Subscription) -> Self { HandleRef(subscription.clone()) }

  pub(crate) fn upgrade(&self) -> Option<Subscription> { Some(self.0.clone()) }

  pub(crate) fn state(&self) -> HandleState {
    if self.0.is_active() { HandleState::Active } else { HandleState::Cancelled }
  }
}

pub(crate) struct SubscriberRecord<A> {
  pub(crate) id: usize,
  pub(crate) callback: Callback<A>,
  /// `false` until the pass during which the record was added is over.
  pub(crate) active: bool,
  pub(crate) removed: bool,
  /// Deliveries to drop once active, for events its replay already covered.
  pub(crate) skip: usize,
  pub(crate) handle: HandleRef,
  pub(crate) location: &'static Location<'static>,
}

type Records<A> = SmallVec<[SubscriberRecord<A>; 2]>;

pub(crate) struct Subscribers<A> {
  next_id: usize,
  pub(crate) records: Records<A>,
  pub(crate) iterating: bool,
  pending_activations: usize,
  pending_removals: usize,
}

impl<A> Default for Subscribers<A> {
  fn default() -> Self {
    Self {
      next_id: 0,
      records: SmallVec::new(),
      iterating: false,
      pending_activations: 0,
      pending_removals: 0,
    }
  }
}

impl<A> Subscribers<A> {
  /// Reserve the id of the next record, needed by its subscription before the
  /// record itself exists.
  #[inline]
  pub(crate) fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  pub(crate) fn insert(
    &mut self, id: usize, callback: Callback<A>, handle: HandleRef,
    location: &'static Location<'static>, skip: usize,
  ) {
    let active = !self.iterating;
    if !active {
      self.pending_activations += 1;
    }
    self
      .records
      .push(SubscriberRecord { id, callback, active, removed: false, skip, handle, location });
  }

  /// Flag a record for removal. Returns `false` if it was already gone.
  pub(crate) fn mark_removed(&mut self, id: usize) -> bool {
    match self.records.iter_mut().find(|r| r.id == id) {
      Some(record) if !record.removed => {
        record.removed = true;
        self.pending_removals += 1;
        true
      }
      _ => false,
    }
  }

  pub(crate) fn mark_removed_at(&mut self, idx: usize) {
    let record = &mut self.records[idx];
    if !record.removed {
      record.removed = true;
      self.pending_removals += 1;
    }
  }

  /// Promote records added during the last pass and take out flagged ones.
  ///
  /// The removed records are returned so the caller can drop them, and the
  /// callbacks they own, after releasing the table.
  pub(crate) fn compact(&mut self) -> Vec<SubscriberRecord<A>> {
    if self.pending_activations > 0 {
      self.records.iter_mut().for_each(|r| r.active = true);
      self.pending_activations = 0;
    }
    if self.pending_removals == 0 {
      return Vec::new();
    }
    self.pending_removals = 0;
    let (kept, removed): (Records<A>, Records<A>) = std::mem::take(&mut self.records)
      .into_iter()
      .partition(|r| !r.removed);
    self.records = kept;
    removed.into_vec()
  }

  /// Take out every record.
  pub(crate) fn drain(&mut self) -> Vec<SubscriberRecord<A>> {
    self.pending_activations = 0;
    self.pending_removals = 0;
    self.records.drain(..).collect()
  }

  /// Subscribers that are not waiting for removal, including the ones added
  /// during the current pass.
  #[inline]
  pub(crate) fn count(&self) -> usize { self.records.len() - self.pending_removals }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.records.len() }
}
