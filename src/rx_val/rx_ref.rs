use std::{
  fmt::{Debug, Formatter},
  panic::Location,
  rc::Rc,
};

use super::{RxVal, ValueHolder};
use crate::{observable::Publisher, subscription::Subscription};

/// A value that is set directly by its owner.
///
/// `set` notifies subscribers only when the new value differs from the
/// current one. Clones share the value.
pub struct RxRef<A> {
  val: RxVal<A>,
}

impl<A: Clone + PartialEq + 'static> RxRef<A> {
  pub fn new(value: A) -> Self { RxRef { val: RxVal::from_parts(value, Rc::new(<A as PartialEq>::eq)) } }
}

impl<A: Clone + 'static> RxRef<A> {
  pub fn with_comparer(value: A, eq: impl Fn(&A, &A) -> bool + 'static) -> Self {
    RxRef { val: RxVal::from_parts(value, Rc::new(eq)) }
  }

  /// Returns `true` if the value changed and subscribers were notified.
  pub fn set(&self, value: A) -> bool { self.val.set(value) }

  /// Set the value computed from the current one.
  pub fn update(&self, f: impl FnOnce(&A) -> A) -> bool {
    let next = self.val.with_value(f);
    self.set(next)
  }

  pub fn with_value<R>(&self, f: impl FnOnce(&A) -> R) -> R { self.val.with_value(f) }

  /// A read-only handle to the same value.
  pub fn as_val(&self) -> RxVal<A> { self.val.clone() }
}

impl<A> Clone for RxRef<A> {
  fn clone(&self) -> Self { RxRef { val: self.val.clone() } }
}

impl<A: Clone + 'static> Publisher for RxRef<A> {
  type Item = A;

  fn subscribe_at<F>(&self, location: &'static Location<'static>, callback: F) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    self.val.subscribe_at(location, callback)
  }

  fn subscriber_count(&self) -> usize { self.val.subscriber_count() }
}

impl<A: Clone + 'static> ValueHolder for RxRef<A> {
  fn value(&self) -> A { self.val.value() }

  fn subscribe_without_emit_at<F>(
    &self, location: &'static Location<'static>, callback: F,
  ) -> Subscription
  where
    F: FnMut(A) + 'static,
  {
    self.val.subscribe_without_emit_at(location, callback)
  }
}

impl<A: Clone + Debug + 'static> Debug for RxRef<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("RxRef").field(&self.val).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  fn recorder<A: 'static>(log: &Rc<RefCell<Vec<A>>>) -> impl FnMut(A) + 'static {
    let log = log.clone();
    move |v| log.borrow_mut().push(v)
  }

  #[rxstream_macro::test]
  fn equal_value_is_not_a_change() {
    let value = RxRef::new(5);
    let log = Rc::new(RefCell::new(vec![]));
    let _s = value.subscribe_without_emit(recorder(&log));

    assert!(!value.set(5));
    assert!(log.borrow().is_empty());
    assert_eq!(value.value(), 5);

    assert!(value.set(6));
    assert_eq!(*log.borrow(), vec![6]);
  }

  #[rxstream_macro::test]
  fn subscribe_emits_current_immediately() {
    let value = RxRef::new("x");
    let log = Rc::new(RefCell::new(vec![]));
    let _s = value.subscribe(recorder(&log));
    assert_eq!(*log.borrow(), vec!["x"]);
  }

  #[rxstream_macro::test]
  fn update_from_current() {
    let counter = RxRef::new(1);
    assert!(counter.update(|v| v + 1));
    assert!(!counter.update(|v| *v));
    assert_eq!(counter.value(), 2);
  }

  #[rxstream_macro::test]
  fn comparer_decides_what_changes() {
    let name = RxRef::with_comparer(String::from("Ann"), |a: &String, b: &String| {
      a.eq_ignore_ascii_case(b)
    });
    assert!(!name.set("ANN".into()));
    assert_eq!(name.value(), "Ann");
    assert!(name.set("Bob".into()));
  }

  #[rxstream_macro::test]
  fn set_inside_subscriber_is_delivered_in_order() {
    let value = RxRef::new(0);
    let log = Rc::new(RefCell::new(vec![]));
    let c_value = value.clone();
    let _bump = value.subscribe_without_emit(move |v| {
      if v == 1 {
        c_value.set(2);
      }
    });
    let _s = value.subscribe(recorder(&log));

    value.set(1);
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
    assert_eq!(value.value(), 2);
  }
}
