use std::{panic::Location, rc::Rc};

use crate::observable::{Emitter, Observable, Publisher};

pub(crate) fn map<S, B, F>(source: &S, location: &'static Location<'static>, f: F) -> Observable<B>
where
  S: Publisher + Clone + 'static,
  B: Clone + 'static,
  F: Fn(S::Item) -> B + 'static,
{
  let source = source.clone();
  let f = Rc::new(f);
  Observable::new(move |emit: Emitter<B>| {
    let f = f.clone();
    source.subscribe_at(location, move |v| {
      emit.emit(f(v));
    })
  })
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxstream_macro::test]
  fn primitive_type() {
    let subject = Subject::new();
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    let _s = subject
      .map(|v: i32| v * 2)
      .subscribe(move |v| c_result.borrow_mut().push(v));

    (1..=3).for_each(|v| subject.push(v));
    assert_eq!(*result.borrow(), vec![2, 4, 6]);
  }

  #[rxstream_macro::test]
  fn changes_type() {
    let subject = Subject::new();
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    let _s = subject
      .map(|v: i32| format!("#{v}"))
      .subscribe(move |v| c_result.borrow_mut().push(v));

    subject.push(7);
    assert_eq!(*result.borrow(), vec!["#7".to_string()]);
  }

  #[rxstream_macro::test]
  fn discard_value_signals_unit() {
    let subject = Subject::<&str>::new();
    let count = Rc::new(RefCell::new(0));
    let c_count = count.clone();
    let _s = subject.discard_value().subscribe(move |()| *c_count.borrow_mut() += 1);

    subject.push("a");
    subject.push("b");
    assert_eq!(*count.borrow(), 2);
  }

  #[rxstream_macro::test]
  fn upstream_released_with_last_subscriber() {
    let subject = Subject::<i32>::new();
    let mapped = subject.map(|v| v + 1);
    let a = mapped.subscribe(|_| {});
    let b = mapped.subscribe(|_| {});
    assert_eq!(subject.subscriber_count(), 1);

    a.cancel();
    assert_eq!(subject.subscriber_count(), 1);
    b.cancel();
    assert_eq!(subject.subscriber_count(), 0);
  }
}
