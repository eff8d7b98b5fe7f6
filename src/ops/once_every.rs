use std::panic::Location;

use crate::{
  observable::{Emitter, Observable, Publisher},
  scheduler::{Duration, Scheduler},
};

/// Leading-edge rate limiter.
pub(crate) fn once_every<S, Sch>(
  source: &S, location: &'static Location<'static>, duration: Duration, scheduler: Sch,
) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  Sch: Scheduler,
{
  let source = source.clone();
  Observable::new(move |emit: Emitter<S::Item>| {
    let scheduler = scheduler.clone();
    let mut last_emit: Option<Duration> = None;
    source.subscribe_at(location, move |v| {
      let now = scheduler.now();
      if last_emit.is_some_and(|last| last + duration > now) {
        return;
      }
      last_emit = Some(now);
      emit.emit(v);
    })
  })
}
