use std::panic::Location;

use crate::observable::{Emitter, Observable, Publisher};

pub(crate) fn skip<S>(source: &S, location: &'static Location<'static>, count: usize) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
{
  let source = source.clone();
  Observable::new(move |emit: Emitter<S::Item>| {
    let mut remaining = count;
    source.subscribe_at(location, move |v| {
      if remaining > 0 {
        remaining -= 1;
      } else {
        emit.emit(v);
      }
    })
  })
}
