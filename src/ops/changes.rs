//! Change detection operators.
//!
//! All three remember the previous value of their subscription and compare
//! it with the incoming one through an equality function. The previous value
//! is updated on every event, whether it was emitted or not.
use std::{panic::Location, rc::Rc};

use crate::observable::{Emitter, Observable, Publisher};

fn changes_base<S, B, E, D>(
  source: &S, location: &'static Location<'static>, eq: E, decide: D,
) -> Observable<B>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  B: Clone + 'static,
  E: Fn(&S::Item, &S::Item) -> bool + 'static,
  D: Fn(&Emitter<B>, Option<S::Item>, S::Item, &E) + 'static,
{
  let source = source.clone();
  let eq = Rc::new(eq);
  let decide = Rc::new(decide);
  Observable::new(move |emit: Emitter<B>| {
    let (eq, decide) = (eq.clone(), decide.clone());
    let mut last: Option<S::Item> = None;
    source.subscribe_at(location, move |v| {
      let previous = last.replace(v.clone());
      decide(&emit, previous, v, &eq);
    })
  })
}

pub(crate) fn changes_opt<S, E>(
  source: &S, location: &'static Location<'static>, eq: E,
) -> Observable<(Option<S::Item>, S::Item)>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  E: Fn(&S::Item, &S::Item) -> bool + 'static,
{
  changes_base(source, location, eq, |emit, previous, v, eq| {
    let changed = previous.as_ref().is_none_or(|p| !eq(p, &v));
    if changed {
      emit.emit((previous, v));
    }
  })
}

pub(crate) fn changes<S, E>(
  source: &S, location: &'static Location<'static>, eq: E,
) -> Observable<(S::Item, S::Item)>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  E: Fn(&S::Item, &S::Item) -> bool + 'static,
{
  changes_base(source, location, eq, |emit, previous, v, eq| {
    if let Some(previous) = previous {
      if !eq(&previous, &v) {
        emit.emit((previous, v));
      }
    }
  })
}

pub(crate) fn changed_values<S, E>(
  source: &S, location: &'static Location<'static>, eq: E,
) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  E: Fn(&S::Item, &S::Item) -> bool + 'static,
{
  changes_base(source, location, eq, |emit, previous, v, eq| {
    if previous.is_none_or(|p| !eq(&p, &v)) {
      emit.emit(v);
    }
  })
}
