use std::panic::Location;

use super::{buffer::buffer, filter::filter, map::map};
use crate::{
  observable::{Observable, Publisher},
  scheduler::{Duration, Scheduler},
};

/// `count` values that all happened within `timeframe` of the newest one,
/// e.g. a double click.
pub(crate) fn within_timeframe<S, Sch>(
  source: &S, location: &'static Location<'static>, count: usize, timeframe: Duration,
  scheduler: Sch,
) -> Observable<Vec<(S::Item, Duration)>>
where
  S: Publisher<Item: Clone + 'static> + Clone + 'static,
  Sch: Scheduler,
{
  let stamped = map(source, location, move |v| (v, scheduler.now()));
  let windows = buffer(&stamped, location, count);
  filter(&windows, location, move |window: &Vec<(S::Item, Duration)>| {
    let Some((_, newest)) = window.last() else {
      return false;
    };
    window.len() == count && window.iter().all(|(_, t)| *newest - *t <= timeframe)
  })
}
