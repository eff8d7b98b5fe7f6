use std::panic::Location;

use crate::{
  observable::{Emitter, Observable, Publisher},
  rc::{MutRc, RcDerefMut},
};

pub(crate) fn once_per_tick<S, T>(
  source: &S, tick: &T, location: &'static Location<'static>,
) -> Observable<S::Item>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  T: Publisher + Clone + 'static,
{
  let (source, tick) = (source.clone(), tick.clone());
  Observable::new(move |emit: Emitter<S::Item>| {
    let latest: MutRc<Option<S::Item>> = MutRc::own(None);
    let c_latest = latest.clone();
    let values = source.subscribe_at(location, move |v| {
      *c_latest.rc_deref_mut() = Some(v);
    });
    let ticks = tick.subscribe_at(location, move |_| {
      let value = latest.rc_deref_mut().take();
      if let Some(value) = value {
        emit.emit(value);
      }
    });
    values.join(ticks)
  })
}
