use std::{mem, panic::Location};

use crate::{
  observable::{Emitter, Observable, Publisher},
  rc::{MutRc, RcDerefMut},
  scheduler::{Duration, Scheduler},
  subscription::Subscription,
};

/// Re-emit each value `delay` after it arrived. Cancelling the downstream
/// subscription drops values still waiting.
pub(crate) fn delayed<S, Sch>(
  source: &S, location: &'static Location<'static>, delay: Duration, scheduler: Sch,
) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  Sch: Scheduler,
{
  let source = source.clone();
  Observable::new(move |emit: Emitter<S::Item>| {
    let timers: MutRc<Vec<Subscription>> = MutRc::own(Vec::new());
    let c_timers = timers.clone();
    let scheduler = scheduler.clone();
    let upstream = source.subscribe_at(location, move |v| {
      let emit = emit.clone();
      let timer = scheduler.after(delay, move || {
        emit.emit(v);
      });
      let mut timers = c_timers.rc_deref_mut();
      timers.retain(Subscription::is_active);
      timers.push(timer);
    });
    upstream.and_then(move || {
      let pending = mem::take(&mut *timers.rc_deref_mut());
      for timer in pending {
        timer.cancel();
      }
    })
  })
}
