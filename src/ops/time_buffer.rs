use std::{collections::VecDeque, panic::Location};

use crate::{
  observable::{Emitter, Observable, Publisher},
  scheduler::{Duration, Scheduler},
};

/// Timestamped window that only emits once it spans `duration`.
///
/// Each value is stored with the scheduler's time. When the oldest entry is at
/// least `duration` older than the newest, entries older than `duration` are
/// evicted and the window is emitted.
pub(crate) fn time_buffer<S, Sch>(
  source: &S, location: &'static Location<'static>, duration: Duration, scheduler: Sch,
) -> Observable<Vec<(S::Item, Duration)>>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  Sch: Scheduler,
{
  let source = source.clone();
  Observable::new(move |emit: Emitter<Vec<(S::Item, Duration)>>| {
    let scheduler = scheduler.clone();
    let mut window: VecDeque<(S::Item, Duration)> = VecDeque::new();
    source.subscribe_at(location, move |v| {
      let now = scheduler.now();
      window.push_back((v, now));
      let Some((_, oldest)) = window.front() else {
        return;
      };
      if *oldest + duration > now {
        return;
      }
      while window.front().is_some_and(|(_, t)| *t + duration < now) {
        window.pop_front();
      }
      emit.emit(window.iter().cloned().collect());
    })
  })
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  #[rxstream_macro::test]
  fn withholds_until_window_spans_duration() {
    let scheduler = ManualScheduler::new();
    let subject = Subject::<char>::new();
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    let _s = subject
      .time_buffer(ms(100), scheduler.clone())
      .subscribe(move |w: Vec<(char, Duration)>| {
        c_result
          .borrow_mut()
          .push(w.into_iter().map(|(v, _)| v).collect::<String>())
      });

    subject.push('a');
    scheduler.advance_by(ms(50));
    subject.push('b');
    assert!(result.borrow().is_empty());

    scheduler.advance_by(ms(50));
    subject.push('c');
    scheduler.advance_by(ms(30));
    subject.push('d');
    assert_eq!(*result.borrow(), vec!["abc", "bcd"]);
  }
}
