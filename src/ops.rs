//! Operators over anything that implements [`Publisher`].
//!
//! Every operator builds a new operator [`Observable`] whose subscribe
//! function subscribes to the source(s) with an adapter callback. State that
//! belongs to one subscription (a buffer, the last value seen, a skip counter)
//! is created inside the subscribe function, so it starts fresh whenever the
//! derived observable reconnects.
use std::panic::Location;

use crate::{
  observable::{Observable, Publisher},
  rx_val::RxVal,
  scheduler::{Duration, Scheduler},
  subscription::Subscription,
};

pub mod buffer;
pub mod changes;
pub mod collect;
pub mod delay;
pub mod filter;
pub mod flat_map;
pub mod join;
pub mod map;
pub mod once_every;
pub mod once_per_tick;
pub mod skip;
pub mod subscribe_with_handle;
pub mod time_buffer;
pub mod to_future;
pub mod within_timeframe;
pub mod zip;

pub use join::join_all;
pub use to_future::FirstEvent;

/// Operator methods, available on every clonable [`Publisher`] with clonable
/// items: [`Observable`], the subjects, [`RxVal`] and
/// [`RxRef`](crate::rx_val::RxRef).
///
/// Operators borrow their source and keep a clone of it inside the returned
/// observable.
pub trait ObservableExt: Publisher<Item: Clone + 'static> + Clone + 'static {
  /// Like `subscribe`, but the callback also receives its own subscription.
  #[track_caller]
  fn subscribe_with_handle<F>(&self, callback: F) -> Subscription
  where
    F: FnMut(Self::Item, &Subscription) + 'static,
  {
    subscribe_with_handle::subscribe_with_handle(self, Location::caller(), callback)
  }

  /// Receive only the next event. The subscription cancels itself once the
  /// event was delivered.
  #[track_caller]
  fn subscribe_for_one_event<F>(&self, callback: F) -> Subscription
  where
    F: FnOnce(Self::Item) + 'static,
  {
    subscribe_with_handle::subscribe_for_one_event(self, Location::caller(), callback)
  }

  #[track_caller]
  fn map<B, F>(&self, f: F) -> Observable<B>
  where
    B: Clone + 'static,
    F: Fn(Self::Item) -> B + 'static,
  {
    map::map(self, Location::caller(), f)
  }

  #[track_caller]
  fn filter<F>(&self, predicate: F) -> Observable<Self::Item>
  where
    F: Fn(&Self::Item) -> bool + 'static,
  {
    filter::filter(self, Location::caller(), predicate)
  }

  /// Map and filter in one step: `None` results are dropped.
  #[track_caller]
  fn collect<B, F>(&self, f: F) -> Observable<B>
  where
    B: Clone + 'static,
    F: Fn(Self::Item) -> Option<B> + 'static,
  {
    collect::collect(self, Location::caller(), f)
  }

  #[track_caller]
  fn discard_value(&self) -> Observable<()> { map::map(self, Location::caller(), |_| ()) }

  /// Switch to the publisher produced by `f` for each value. Only the latest
  /// inner publisher is subscribed.
  #[track_caller]
  fn flat_map<P, F>(&self, f: F) -> Observable<P::Item>
  where
    P: Publisher<Item: Clone + 'static> + 'static,
    F: Fn(Self::Item) -> P + 'static,
  {
    flat_map::flat_map(self, Location::caller(), f)
  }

  /// Emit every element of the collection produced by `f`.
  #[track_caller]
  fn flat_map_iter<I, F>(&self, f: F) -> Observable<I::Item>
  where
    I: IntoIterator<Item: Clone + 'static>,
    F: Fn(Self::Item) -> I + 'static,
  {
    flat_map::flat_map_iter(self, Location::caller(), f)
  }

  #[track_caller]
  fn zip<O>(&self, other: &O) -> Observable<(Self::Item, O::Item)>
  where
    O: ObservableExt,
  {
    zip::zip2(Location::caller(), self, other, |a, b| (a, b))
  }

  #[track_caller]
  fn zip_with<O, R, F>(&self, other: &O, zipper: F) -> Observable<R>
  where
    O: ObservableExt,
    R: Clone + 'static,
    F: Fn(Self::Item, O::Item) -> R + 'static,
  {
    zip::zip2(Location::caller(), self, other, zipper)
  }

  #[track_caller]
  fn zip3<O1, O2>(&self, o1: &O1, o2: &O2) -> Observable<(Self::Item, O1::Item, O2::Item)>
  where
    O1: ObservableExt,
    O2: ObservableExt,
  {
    zip::zip3(Location::caller(), self, o1, o2, |a, b, c| (a, b, c))
  }

  #[track_caller]
  #[allow(clippy::type_complexity)]
  fn zip4<O1, O2, O3>(
    &self, o1: &O1, o2: &O2, o3: &O3,
  ) -> Observable<(Self::Item, O1::Item, O2::Item, O3::Item)>
  where
    O1: ObservableExt,
    O2: ObservableExt,
    O3: ObservableExt,
  {
    zip::zip4(Location::caller(), self, o1, o2, o3, |a, b, c, d| (a, b, c, d))
  }

  /// Emit the last `size` values, oldest first, on every event.
  #[track_caller]
  fn buffer(&self, size: usize) -> Observable<Vec<Self::Item>> {
    buffer::buffer(self, Location::caller(), size)
  }

  /// Emit timestamped values once they span at least `duration`.
  #[track_caller]
  fn time_buffer<S: Scheduler>(
    &self, duration: Duration, scheduler: S,
  ) -> Observable<Vec<(Self::Item, Duration)>> {
    time_buffer::time_buffer(self, Location::caller(), duration, scheduler)
  }

  #[track_caller]
  fn skip(&self, count: usize) -> Observable<Self::Item> { skip::skip(self, Location::caller(), count) }

  /// Drop values that arrive less than `duration` after the last forwarded
  /// one.
  #[track_caller]
  fn once_every<S: Scheduler>(&self, duration: Duration, scheduler: S) -> Observable<Self::Item> {
    once_every::once_every(self, Location::caller(), duration, scheduler)
  }

  /// Emit the last `count` timestamped values whenever all of them are within
  /// `timeframe` of the newest.
  #[track_caller]
  fn within_timeframe<S: Scheduler>(
    &self, count: usize, timeframe: Duration, scheduler: S,
  ) -> Observable<Vec<(Self::Item, Duration)>> {
    within_timeframe::within_timeframe(self, Location::caller(), count, timeframe, scheduler)
  }

  /// Re-emit every value after `delay`.
  #[track_caller]
  fn delayed<S: Scheduler>(&self, delay: Duration, scheduler: S) -> Observable<Self::Item> {
    delay::delayed(self, Location::caller(), delay, scheduler)
  }

  /// `(previous, current)` on every change. The first value counts as a
  /// change from `None`.
  #[track_caller]
  fn changes_opt(&self) -> Observable<(Option<Self::Item>, Self::Item)>
  where
    Self::Item: PartialEq,
  {
    changes::changes_opt(self, Location::caller(), <Self::Item as PartialEq>::eq)
  }

  #[track_caller]
  fn changes_opt_by<E>(&self, eq: E) -> Observable<(Option<Self::Item>, Self::Item)>
  where
    E: Fn(&Self::Item, &Self::Item) -> bool + 'static,
  {
    changes::changes_opt(self, Location::caller(), eq)
  }

  /// `(previous, current)` on every change after the first value.
  #[track_caller]
  fn changes(&self) -> Observable<(Self::Item, Self::Item)>
  where
    Self::Item: PartialEq,
  {
    changes::changes(self, Location::caller(), <Self::Item as PartialEq>::eq)
  }

  #[track_caller]
  fn changes_by<E>(&self, eq: E) -> Observable<(Self::Item, Self::Item)>
  where
    E: Fn(&Self::Item, &Self::Item) -> bool + 'static,
  {
    changes::changes(self, Location::caller(), eq)
  }

  /// The first value and every value different from its predecessor.
  #[track_caller]
  fn changed_values(&self) -> Observable<Self::Item>
  where
    Self::Item: PartialEq,
  {
    changes::changed_values(self, Location::caller(), <Self::Item as PartialEq>::eq)
  }

  #[track_caller]
  fn changed_values_by<E>(&self, eq: E) -> Observable<Self::Item>
  where
    E: Fn(&Self::Item, &Self::Item) -> bool + 'static,
  {
    changes::changed_values(self, Location::caller(), eq)
  }

  /// Forward the events of both sources as they happen.
  #[track_caller]
  fn join<O>(&self, other: &O) -> Observable<Self::Item>
  where
    O: Publisher<Item = Self::Item> + Clone + 'static,
  {
    join::join(self, other, Location::caller())
  }

  /// Signal whenever either source emits.
  #[track_caller]
  fn join_discard<O>(&self, other: &O) -> Observable<()>
  where
    O: ObservableExt,
  {
    let location = Location::caller();
    join::join(&map::map(self, location, |_| ()), &map::map(other, location, |_| ()), location)
  }

  /// A future that resolves with the next event, or `None` if the stream
  /// finishes first.
  #[track_caller]
  fn to_future(&self) -> FirstEvent<Self::Item> { to_future::to_future(self, Location::caller()) }

  /// Hold the latest event as a value, starting with `initial`.
  #[track_caller]
  fn to_rx_val(&self, initial: Self::Item) -> RxVal<Self::Item>
  where
    Self::Item: PartialEq,
  {
    let location = Location::caller();
    let source = self.clone();
    RxVal::new(initial, move |setter| {
      source.subscribe_at(location, move |v| {
        setter.set(v);
      })
    })
  }

  /// Remember the latest value and emit it when `tick` fires. Several values
  /// between two ticks collapse into the last one.
  #[track_caller]
  fn once_per_tick<T>(&self, tick: &T) -> Observable<Self::Item>
  where
    T: ObservableExt,
  {
    once_per_tick::once_per_tick(self, tick, Location::caller())
  }
}

impl<S> ObservableExt for S
where
  S: Publisher + Clone + 'static,
  S::Item: Clone + 'static,
{
}
