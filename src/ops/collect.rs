use std::{panic::Location, rc::Rc};

use crate::observable::{Emitter, Observable, Publisher};

pub(crate) fn collect<S, B, F>(source: &S, location: &'static Location<'static>, f: F) -> Observable<B>
where
  S: Publisher + Clone + 'static,
  B: Clone + 'static,
  F: Fn(S::Item) -> Option<B> + 'static,
{
  let source = source.clone();
  let f = Rc::new(f);
  Observable::new(move |emit: Emitter<B>| {
    let f = f.clone();
    source.subscribe_at(location, move |v| {
      if let Some(b) = f(v) {
        emit.emit(b);
      }
    })
  })
}
