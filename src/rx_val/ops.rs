//! Deriving values from values.
//!
//! Every derived value computes its first value right away, so
//! [`ValueHolder::value`] is correct before anyone subscribes.
use std::{panic::Location, rc::Rc};

use super::{RxVal, ValueHolder};
use crate::{
  observable::Publisher,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

impl<A: Clone + 'static> RxVal<A> {
  #[track_caller]
  pub fn map<B, F>(&self, f: F) -> RxVal<B>
  where
    B: Clone + PartialEq + 'static,
    F: Fn(A) -> B + 'static,
  {
    let location = Location::caller();
    let initial = f(self.value());
    RxVal::new(initial, move |setter| {
      self.subscribe_without_emit_at(location, move |v| {
        setter.set(f(v));
      })
    })
  }

  /// Follow the value produced by `f` for the current value. When this value
  /// changes, the previous inner value is dropped and the new one followed.
  #[track_caller]
  pub fn flat_map<B, F>(&self, f: F) -> RxVal<B>
  where
    B: Clone + PartialEq + 'static,
    F: Fn(A) -> RxVal<B> + 'static,
  {
    let location = Location::caller();
    let first = f(self.value());
    let initial = first.value();
    RxVal::new(initial, move |setter| {
      let c_setter = setter.clone();
      let inner = MutRc::own(first.subscribe_without_emit_at(location, move |b| {
        c_setter.set(b);
      }));
      let c_inner = inner.clone();
      let outer = self.subscribe_without_emit_at(location, move |a| {
        let setter = setter.clone();
        let next = f(a).subscribe_at(location, move |b| {
          setter.set(b);
        });
        c_inner.replace(next).cancel();
      });
      outer.join(Subscription::new(move || {
        inner.replace(Subscription::empty()).cancel();
      }))
    })
  }

  #[track_caller]
  pub fn zip<O>(&self, other: &O) -> RxVal<(A, O::Item)>
  where
    A: PartialEq,
    O: ValueHolder<Item: Clone + PartialEq + 'static>,
  {
    let location = Location::caller();
    let initial = (self.value(), other.value());
    let latest = MutRc::own(initial.clone());
    RxVal::new(initial, move |setter| {
      let (c_latest, c_setter) = (latest.clone(), setter.clone());
      let left = self.subscribe_without_emit_at(location, move |a| {
        let next = {
          let mut state = c_latest.rc_deref_mut();
          state.0 = a;
          state.clone()
        };
        c_setter.set(next);
      });
      let right = other.subscribe_without_emit_at(location, move |b| {
        let next = {
          let mut state = latest.rc_deref_mut();
          state.1 = b;
          state.clone()
        };
        setter.set(next);
      });
      left.join(right)
    })
  }

  #[track_caller]
  pub fn zip3<O1, O2>(&self, o1: &O1, o2: &O2) -> RxVal<(A, O1::Item, O2::Item)>
  where
    A: PartialEq,
    O1: ValueHolder<Item: Clone + PartialEq + 'static>,
    O2: ValueHolder<Item: Clone + PartialEq + 'static>,
  {
    self.zip(o1).zip(o2).map(|((a, b), c)| (a, b, c))
  }

  #[track_caller]
  #[allow(clippy::type_complexity)]
  pub fn zip4<O1, O2, O3>(
    &self, o1: &O1, o2: &O2, o3: &O3,
  ) -> RxVal<(A, O1::Item, O2::Item, O3::Item)>
  where
    A: PartialEq,
    O1: ValueHolder<Item: Clone + PartialEq + 'static>,
    O2: ValueHolder<Item: Clone + PartialEq + 'static>,
    O3: ValueHolder<Item: Clone + PartialEq + 'static>,
  {
    self.zip(o1).zip(o2).zip(o3).map(|(((a, b), c), d)| (a, b, c, d))
  }

  /// Keep values accepted by `predicate`; anything else is replaced by
  /// `on_filtered()`.
  #[track_caller]
  pub fn filter<P, F>(&self, predicate: P, on_filtered: F) -> RxVal<A>
  where
    A: PartialEq,
    P: Fn(&A) -> bool + 'static,
    F: Fn() -> A + 'static,
  {
    self.map(move |a| if predicate(&a) { a } else { on_filtered() })
  }

  /// Combine any number of values with `f`, recomputed whenever one of them
  /// changes.
  #[track_caller]
  pub fn traverse<S, B, F>(vals: impl IntoIterator<Item = S>, f: F) -> RxVal<B>
  where
    S: ValueHolder<Item = A>,
    B: Clone + PartialEq + 'static,
    F: Fn(&[A]) -> B + 'static,
  {
    let location = Location::caller();
    let vals: Vec<S> = vals.into_iter().collect();
    let latest = MutRc::own(vals.iter().map(ValueHolder::value).collect::<Vec<_>>());
    let initial = f(latest.rc_deref().as_slice());
    let f = Rc::new(f);
    RxVal::new(initial, move |setter| {
      Subscription::join_all(vals.iter().enumerate().map(|(idx, val)| {
        let (latest, setter, f) = (latest.clone(), setter.clone(), f.clone());
        val.subscribe_without_emit_at(location, move |v| {
          let next = {
            let mut state = latest.rc_deref_mut();
            state[idx] = v;
            f(state.as_slice())
          };
          setter.set(next);
        })
      }))
    })
  }

  /// The first value, by position, that satisfies `predicate`.
  #[track_caller]
  pub fn any_that<S, P>(vals: impl IntoIterator<Item = S>, predicate: P) -> RxVal<Option<A>>
  where
    S: ValueHolder<Item = A>,
    A: PartialEq,
    P: Fn(&A) -> bool + 'static,
  {
    RxVal::traverse(vals, move |values: &[A]| values.iter().find(|&v| predicate(v)).cloned())
  }
}

impl RxVal<bool> {
  /// `true` while at least one of `vals` equals `search_for`.
  #[track_caller]
  pub fn any_of<S>(vals: impl IntoIterator<Item = S>, search_for: bool) -> RxVal<bool>
  where
    S: ValueHolder<Item = bool>,
  {
    RxVal::traverse(vals, move |values: &[bool]| values.contains(&search_for))
  }
}
