use std::panic::Location;

use crate::{
  observable::{Emitter, Observable, Publisher},
  subscription::Subscription,
};

pub(crate) fn join<S, O>(source: &S, other: &O, location: &'static Location<'static>) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  O: Publisher<Item = S::Item> + Clone + 'static,
{
  let (source, other) = (source.clone(), other.clone());
  Observable::new(move |emit: Emitter<S::Item>| {
    let c_emit = emit.clone();
    let first = source.subscribe_at(location, move |v| {
      c_emit.emit(v);
    });
    let second = other.subscribe_at(location, move |v| {
      emit.emit(v);
    });
    first.join(second)
  })
}

/// Merge every source into one stream that forwards their events as they
/// happen.
#[track_caller]
pub fn join_all<S>(sources: impl IntoIterator<Item = S>) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + 'static,
{
  let location = Location::caller();
  let sources: Vec<S> = sources.into_iter().collect();
  Observable::new(move |emit: Emitter<S::Item>| {
    Subscription::join_all(sources.iter().map(|source| {
      let emit = emit.clone();
      source.subscribe_at(location, move |v| {
        emit.emit(v);
      })
    }))
  })
}
