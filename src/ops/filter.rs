use std::{panic::Location, rc::Rc};

use crate::observable::{Emitter, Observable, Publisher};

pub(crate) fn filter<S, F>(
  source: &S, location: &'static Location<'static>, predicate: F,
) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  F: Fn(&S::Item) -> bool + 'static,
{
  let source = source.clone();
  let predicate = Rc::new(predicate);
  Observable::new(move |emit: Emitter<S::Item>| {
    let predicate = predicate.clone();
    source.subscribe_at(location, move |v| {
      if predicate(&v) {
        emit.emit(v);
      }
    })
  })
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxstream_macro::test]
  fn keeps_matching_values() {
    let subject = Subject::<i32>::new();
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    let _s = subject
      .filter(|v: &i32| v % 2 == 0)
      .subscribe(move |v| c_result.borrow_mut().push(v));

    (0..6).for_each(|v| subject.push(v));
    assert_eq!(*result.borrow(), vec![0, 2, 4]);
  }
}
