use std::{cell::RefCell, collections::HashMap, hash::Hash};

use super::RxVal;

/// Shared constant values.
///
/// Hands out one [`RxVal::constant`] per distinct value. The cache is an
/// ordinary object: create it where it is needed and pass it along.
pub struct RxValCache<A> {
  values: RefCell<HashMap<A, RxVal<A>>>,
}

impl<A: Clone + Eq + Hash + 'static> RxValCache<A> {
  pub fn new() -> Self { RxValCache { values: RefCell::new(HashMap::new()) } }

  pub fn get(&self, value: A) -> RxVal<A> {
    self
      .values
      .borrow_mut()
      .entry(value)
      .or_insert_with_key(|v| RxVal::constant(v.clone()))
      .clone()
  }

  pub fn len(&self) -> usize { self.values.borrow().len() }

  pub fn is_empty(&self) -> bool { self.values.borrow().is_empty() }

  pub fn clear(&self) { self.values.borrow_mut().clear(); }
}

impl<A: Clone + Eq + Hash + 'static> Default for RxValCache<A> {
  fn default() -> Self { Self::new() }
}
