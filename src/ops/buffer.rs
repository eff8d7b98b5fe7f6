use std::{collections::VecDeque, panic::Location};

use crate::observable::{Emitter, Observable, Publisher};

/// Sliding window over the last `size` values.
///
/// Unlike a chunking buffer, every event emits the current window, including
/// partial windows before `size` values arrived.
pub(crate) fn buffer<S>(
  source: &S, location: &'static Location<'static>, size: usize,
) -> Observable<Vec<S::Item>>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
{
  let source = source.clone();
  Observable::new(move |emit: Emitter<Vec<S::Item>>| {
    let mut window = VecDeque::with_capacity(size + 1);
    source.subscribe_at(location, move |v| {
      window.push_back(v);
      if window.len() > size {
        window.pop_front();
      }
      emit.emit(window.iter().cloned().collect());
    })
  })
}
