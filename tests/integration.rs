//! Integration tests for rxstream
//!
//! Exercises the public API end to end: delivery guarantees, subjects,
//! operator chains, derived values and virtual time.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use rxstream::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_test_writer()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();
}

fn recorder<A: 'static>(log: &Rc<RefCell<Vec<A>>>) -> impl FnMut(A) + 'static {
  let log = log.clone();
  move |v| log.borrow_mut().push(v)
}

// ==================== Delivery ====================

#[rxstream_macro::test]
fn reentrant_publish_is_delivered_breadth_first() {
  let subject = Subject::<i32>::new();
  let log = Rc::new(RefCell::new(vec![]));

  let (c_subject, c_log) = (subject.clone(), log.clone());
  let _s1 = subject.subscribe(move |v| {
    c_log.borrow_mut().push(("s1", v));
    if v == 0 {
      c_subject.push(1);
    }
  });
  let c_log = log.clone();
  let _s2 = subject.subscribe(move |v| c_log.borrow_mut().push(("s2", v)));

  subject.push(0);
  assert_eq!(*log.borrow(), vec![("s1", 0), ("s2", 0), ("s1", 1), ("s2", 1)]);
}

#[rxstream_macro::test]
fn listener_added_during_event_hears_the_next_one() {
  let subject = Subject::<i32>::new();
  let late = Rc::new(RefCell::new(vec![]));
  let held = Rc::new(RefCell::new(vec![]));

  let (c_subject, c_late, c_held) = (subject.clone(), late.clone(), held.clone());
  let _s = subject.subscribe(move |v| {
    if v == 1 {
      c_held.borrow_mut().push(c_subject.subscribe(recorder(&c_late)));
    }
  });

  subject.push(1);
  subject.push(2);
  assert_eq!(*late.borrow(), vec![2]);
}

#[rxstream_macro::test]
fn replay_listener_added_during_event_sees_each_value_once() {
  let subject = ReplaySubject::<i32>::new();
  let late = Rc::new(RefCell::new(vec![]));
  let held = Rc::new(RefCell::new(vec![]));

  let (c_subject, c_late, c_held) = (subject.clone(), late.clone(), held.clone());
  let _s = subject.subscribe(move |v| {
    if v == 1 {
      c_subject.push(2);
      c_held.borrow_mut().push(c_subject.subscribe(recorder(&c_late)));
    }
  });

  subject.push(1);
  subject.push(3);
  assert_eq!(*late.borrow(), vec![1, 2, 3]);
}

#[rxstream_macro::test]
fn cache_listener_added_during_event_sees_each_value_once() {
  let subject = CacheSubject::<i32>::new();
  let late = Rc::new(RefCell::new(vec![]));
  let held = Rc::new(RefCell::new(vec![]));

  let (c_subject, c_late, c_held) = (subject.clone(), late.clone(), held.clone());
  let _s = subject.subscribe(move |v| {
    if v == 1 {
      c_subject.push(2);
      c_held.borrow_mut().push(c_subject.subscribe(recorder(&c_late)));
    }
  });

  subject.push(1);
  subject.push(3);
  assert_eq!(*late.borrow(), vec![2, 3]);
}

#[rxstream_macro::test]
fn value_listener_added_during_change_sees_each_value_once() {
  let count = RxRef::new(0);
  let late = Rc::new(RefCell::new(vec![]));
  let held = Rc::new(RefCell::new(vec![]));

  let (c_count, c_late, c_held) = (count.clone(), late.clone(), held.clone());
  let _s = count.subscribe(move |v| {
    if v == 1 {
      c_count.set(2);
      c_held.borrow_mut().push(c_count.subscribe(recorder(&c_late)));
    }
  });

  count.set(1);
  count.set(2);
  count.set(3);
  assert_eq!(*late.borrow(), vec![2, 3]);
}

#[rxstream_macro::test]
fn derived_listener_added_during_change_sees_each_value_once() {
  let count = RxRef::new(0);
  let tens = count.as_val().map(|v| v * 10);
  let late = Rc::new(RefCell::new(vec![]));
  let held = Rc::new(RefCell::new(vec![]));

  let (c_count, c_tens, c_late, c_held) = (count.clone(), tens.clone(), late.clone(), held.clone());
  let _s = tens.subscribe(move |v| {
    if v == 10 {
      c_count.set(2);
      c_held.borrow_mut().push(c_tens.subscribe(recorder(&c_late)));
    }
  });

  count.set(1);
  assert_eq!(*late.borrow(), vec![10, 20]);
  assert_eq!(tens.value(), 20);
}

#[rxstream_macro::test]
fn cancel_during_event_spares_the_rest() {
  let subject = Subject::<i32>::new();
  let log = Rc::new(RefCell::new(vec![]));
  let target: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

  let (c_target, c_log) = (target.clone(), log.clone());
  let _first = subject.subscribe(move |v| {
    c_log.borrow_mut().push(("first", v));
    if let Some(s) = c_target.borrow().as_ref() {
      s.cancel();
    }
  });
  let c_log = log.clone();
  *target.borrow_mut() = Some(subject.subscribe(move |v| c_log.borrow_mut().push(("second", v))));
  let c_log = log.clone();
  let _third = subject.subscribe(move |v| c_log.borrow_mut().push(("third", v)));

  subject.push(1);
  subject.push(2);
  assert_eq!(
    *log.borrow(),
    vec![("first", 1), ("third", 1), ("first", 2), ("third", 2)]
  );
}

#[rxstream_macro::test]
fn cancel_is_idempotent() {
  let runs = Rc::new(Cell::new(0));
  let c_runs = runs.clone();
  let s = Subscription::new(move || c_runs.set(c_runs.get() + 1));
  assert!(s.cancel());
  assert!(!s.cancel());
  assert_eq!(runs.get(), 1);
}

#[rxstream_macro::test]
fn panicking_subscriber_does_not_stop_the_event() {
  init_tracing();
  let subject = Subject::<i32>::new();
  let log = Rc::new(RefCell::new(vec![]));
  let faulty = subject.subscribe(|v| {
    if v == 2 {
      panic!("cannot handle {v}");
    }
  });
  let _healthy = subject.subscribe(recorder(&log));

  (1..=3).for_each(|v| subject.push(v));
  assert_eq!(*log.borrow(), vec![1, 2, 3]);
  assert!(!faulty.is_active());
  assert_eq!(subject.subscriber_count(), 1);
}

#[rxstream_macro::test]
fn finished_subject_reports_the_rejected_value() {
  let subject = Subject::<&str>::new();
  subject.finish();
  let err = subject.try_push("late").unwrap_err();
  assert_eq!(err.to_string(), format!("publish on finished stream {}", err.stream()));
  assert_eq!(err.into_value(), "late");
}

// ==================== Operators ====================

#[rxstream_macro::test]
fn buffer_of_three() {
  let subject = Subject::<i32>::new();
  let windows = Rc::new(RefCell::new(vec![]));
  let _s = subject.buffer(3).subscribe(recorder(&windows));

  (1..=5).for_each(|v| subject.push(v));
  assert_eq!(
    *windows.borrow(),
    vec![vec![1], vec![1, 2], vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]]
  );
}

#[rxstream_macro::test]
fn zip_waits_for_both_sides() {
  let a = Subject::<i32>::new();
  let b = Subject::<&str>::new();
  let pairs = Rc::new(RefCell::new(vec![]));
  let _s = a.zip(&b).subscribe(recorder(&pairs));

  a.push(1);
  a.push(2);
  b.push("x");
  assert_eq!(*pairs.borrow(), vec![(2, "x")]);
}

#[rxstream_macro::test]
fn upstream_is_subscribed_once_per_active_period() {
  let source = Subject::<i32>::new();
  let derived = source.map(|v| v + 1);

  let first = derived.subscribe(|_| {});
  let second = derived.subscribe(|_| {});
  assert_eq!(source.subscriber_count(), 1);
  first.cancel();
  let third = derived.subscribe(|_| {});
  assert_eq!(source.subscriber_count(), 1);
  second.cancel();
  third.cancel();
  assert_eq!(source.subscriber_count(), 0);
}

#[rxstream_macro::test]
fn chain_over_replay_subject() {
  let subject = ReplaySubject::<i32>::new();
  (1..=6).for_each(|v| subject.push(v));

  let log = Rc::new(RefCell::new(vec![]));
  let _s = subject
    .filter(|v| v % 2 == 0)
    .skip(1)
    .map(|v| v * 100)
    .subscribe(recorder(&log));
  subject.push(8);
  assert_eq!(*log.borrow(), vec![400, 600, 800]);
}

#[rxstream_macro::test]
fn cache_subject_flushes_to_first_listener() {
  let subject = CacheSubject::<&str>::new();
  subject.push("a");
  subject.push("b");
  let log = Rc::new(RefCell::new(vec![]));
  let _s = subject.changed_values().subscribe(recorder(&log));
  subject.push("b");
  subject.push("c");
  assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}

#[rxstream_macro::test]
fn join_all_merges_sources() {
  let sources: Vec<_> = (0..3).map(|_| Subject::<usize>::new()).collect();
  let log = Rc::new(RefCell::new(vec![]));
  let _s = join_all(sources.clone()).subscribe(recorder(&log));
  for (idx, source) in sources.iter().enumerate().rev() {
    source.push(idx);
  }
  assert_eq!(*log.borrow(), vec![2, 1, 0]);
}

// ==================== Time ====================

#[rxstream_macro::test]
fn time_operators_on_virtual_clock() {
  let scheduler = ManualScheduler::new();
  let taps = Subject::<u32>::new();
  let delayed = Rc::new(RefCell::new(vec![]));
  let throttled = Rc::new(RefCell::new(vec![]));
  let _d = taps
    .delayed(Duration::from_millis(100), scheduler.clone())
    .subscribe(recorder(&delayed));
  let _t = taps
    .once_every(Duration::from_millis(50), scheduler.clone())
    .subscribe(recorder(&throttled));

  taps.push(1);
  scheduler.advance_by(Duration::from_millis(30));
  taps.push(2);
  scheduler.advance_by(Duration::from_millis(30));
  taps.push(3);
  assert!(delayed.borrow().is_empty());
  assert_eq!(*throttled.borrow(), vec![1, 3]);

  scheduler.flush();
  assert_eq!(*delayed.borrow(), vec![1, 2, 3]);
}

#[rxstream_macro::test]
fn double_tap_detection() {
  let scheduler = ManualScheduler::new();
  let taps = Subject::<()>::new();
  let detected = Rc::new(Cell::new(0));
  let c_detected = detected.clone();
  let _s = taps
    .within_timeframe(2, Duration::from_millis(300), scheduler.clone())
    .subscribe(move |_| c_detected.set(c_detected.get() + 1));

  taps.push(());
  scheduler.advance_by(Duration::from_millis(500));
  taps.push(());
  assert_eq!(detected.get(), 0);
  scheduler.advance_by(Duration::from_millis(200));
  taps.push(());
  assert_eq!(detected.get(), 1);
}

// ==================== Values ====================

#[rxstream_macro::test]
fn rx_ref_dedup() {
  let value = RxRef::new(5);
  let log = Rc::new(RefCell::new(vec![]));
  let _s = value.subscribe_without_emit(recorder(&log));

  value.set(5);
  assert!(log.borrow().is_empty());
  assert_eq!(value.value(), 5);
  value.set(6);
  assert_eq!(*log.borrow(), vec![6]);
}

#[rxstream_macro::test]
fn rx_val_emits_current_on_subscribe() {
  let value = RxVal::constant("X");
  let log = Rc::new(RefCell::new(vec![]));
  let _s = value.subscribe(recorder(&log));
  assert_eq!(*log.borrow(), vec!["X"]);
}

#[rxstream_macro::test]
fn derived_values_are_released_with_their_last_handle() {
  let width = RxRef::new(2);
  let height = RxRef::new(3);
  let area = width.as_val().zip(&height).map(|(w, h)| w * h);
  let log = Rc::new(RefCell::new(vec![]));
  let s = area.subscribe(recorder(&log));
  drop(area);

  width.set(4);
  height.set(3);
  assert_eq!(*log.borrow(), vec![6, 12]);

  s.cancel();
  assert_eq!(width.subscriber_count(), 0);
  assert_eq!(height.subscriber_count(), 0);
}

#[rxstream_macro::test]
fn event_stream_to_value_and_back() {
  let subject = Subject::<i32>::new();
  let value = subject.map(|v| v.signum()).to_rx_val(0);
  let log = Rc::new(RefCell::new(vec![]));
  let _s = value.to_event_source().subscribe(recorder(&log));

  [3, 5, -1, -7, 0].into_iter().for_each(|v| subject.push(v));
  assert_eq!(*log.borrow(), vec![1, -1, 0]);
  assert_eq!(value.value(), 0);
}

#[rxstream_macro::test]
async fn next_event_as_future() {
  let subject = Subject::<i32>::new();
  let next = subject.filter(|v| *v > 1).to_future();
  (1..=3).for_each(|v| subject.push(v));
  assert_eq!(next.await, Some(2));
}
