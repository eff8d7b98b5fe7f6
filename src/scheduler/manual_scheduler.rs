//! Virtual time scheduler driven by its owner.
//!
//! Time only moves when the host calls [`ManualScheduler::advance_by`] (a game
//! loop does so once per frame) or [`ManualScheduler::flush`]. Due tasks run
//! synchronously inside those calls, ordered by due time and then by the order
//! they were scheduled in.
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use rxstream::scheduler::{Duration, ManualScheduler, Scheduler};
//!
//! let scheduler = ManualScheduler::new();
//! let fired = Rc::new(Cell::new(false));
//! let c_fired = fired.clone();
//! let _task = scheduler.after(Duration::from_millis(100), move || c_fired.set(true));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(!fired.get());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert!(fired.get());
//! ```
use std::{cmp::Ordering, collections::BinaryHeap, mem};

use super::{Duration, Scheduler};
use crate::{
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

// ==================== Internal State ====================

struct ManualState {
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  due: Duration,
  task_id: usize,
  task: Box<dyn FnOnce()>,
  handle: Subscription,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.task_id == other.task_id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

impl ManualState {
  /// Take cancelled tasks out of the queue and hand them back to be dropped.
  fn prune_cancelled(&mut self) -> Vec<ScheduledTask> {
    if self.queue.iter().all(|t| t.handle.is_active()) {
      return Vec::new();
    }
    let (live, cancelled): (Vec<_>, Vec<_>) = mem::take(&mut self.queue)
      .into_vec()
      .into_iter()
      .partition(|t| t.handle.is_active());
    self.queue = BinaryHeap::from(live);
    cancelled
  }
}

// ==================== ManualScheduler ====================

/// A scheduler whose clock is advanced explicitly.
///
/// Clones share the same clock and task queue.
#[derive(Clone)]
pub struct ManualScheduler(MutRc<ManualState>);

impl ManualScheduler {
  pub fn new() -> Self {
    ManualScheduler(MutRc::own(ManualState {
      now: Duration::ZERO,
      queue: BinaryHeap::new(),
      next_task_id: 0,
    }))
  }

  /// Number of scheduled tasks that were neither run nor cancelled.
  pub fn pending_tasks(&self) -> usize {
    self
      .0
      .rc_deref()
      .queue
      .iter()
      .filter(|t| t.handle.is_active())
      .count()
  }

  /// Advance the clock by `duration`, running every task that becomes due.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.0.rc_deref().now + duration;
    self.advance_to(target);
  }

  /// Advance the clock to `time`. Moving backwards is ignored.
  pub fn advance_to(&self, time: Duration) {
    self.run_until(Some(time));
    let mut state = self.0.rc_deref_mut();
    if state.now < time {
      state.now = time;
    }
  }

  /// Run every scheduled task, including tasks scheduled by the tasks
  /// themselves, moving the clock to each task's due time.
  pub fn flush(&self) { self.run_until(None); }

  fn run_until(&self, limit: Option<Duration>) {
    loop {
      let next = {
        let mut state = self.0.rc_deref_mut();
        let stop = state
          .queue
          .peek()
          .is_none_or(|peek| limit.is_some_and(|limit| peek.due > limit));
        if stop {
          None
        } else {
          let scheduled = state.queue.pop();
          if let Some(scheduled) = &scheduled {
            if state.now < scheduled.due {
              state.now = scheduled.due;
            }
          }
          scheduled
        }
      };

      let Some(scheduled) = next else {
        break;
      };
      // A cancelled handle means the task must not run.
      if scheduled.handle.cancel() {
        (scheduled.task)();
      }
    }
  }
}

impl Default for ManualScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for ManualScheduler {
  fn now(&self) -> Duration { self.0.rc_deref().now }

  fn after<F>(&self, delay: Duration, task: F) -> Subscription
  where
    F: FnOnce() + 'static,
  {
    let handle = Subscription::new(|| {});
    let cancelled = {
      let mut state = self.0.rc_deref_mut();
      let cancelled = state.prune_cancelled();
      let task_id = state.next_task_id;
      state.next_task_id += 1;
      let due = state.now + delay;
      state.queue.push(ScheduledTask { due, task_id, task: Box::new(task), handle: handle.clone() });
      cancelled
    };
    // Dropped tasks may own anything, including this scheduler.
    drop(cancelled);
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  fn log_task(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> impl FnOnce() + 'static {
    let log = log.clone();
    move || log.borrow_mut().push(name)
  }

  // ==================== Time Advancement ====================

  #[rxstream_macro::test]
  fn advance_by_is_cumulative() {
    let scheduler = ManualScheduler::new();
    assert_eq!(scheduler.now(), Duration::ZERO);

    scheduler.advance_by(Duration::from_millis(100));
    scheduler.advance_by(Duration::from_millis(50));
    assert_eq!(scheduler.now(), Duration::from_millis(150));
  }

  #[rxstream_macro::test]
  fn runs_due_tasks_in_time_then_fifo_order() {
    let scheduler = ManualScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let _late = scheduler.after(Duration::from_millis(20), log_task(&log, "late"));
    let _first = scheduler.after(Duration::from_millis(10), log_task(&log, "first"));
    let _second = scheduler.after(Duration::from_millis(10), log_task(&log, "second"));

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*log.borrow(), vec!["first", "second"]);
    assert_eq!(scheduler.pending_tasks(), 1);

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*log.borrow(), vec!["first", "second", "late"]);
  }

  #[rxstream_macro::test]
  fn clock_reads_due_time_inside_task() {
    let scheduler = ManualScheduler::new();
    let seen = Rc::new(RefCell::new(None));
    let (c_seen, c_scheduler) = (seen.clone(), scheduler.clone());
    let _t = scheduler.after(Duration::from_millis(30), move || {
      *c_seen.borrow_mut() = Some(c_scheduler.now());
    });

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*seen.borrow(), Some(Duration::from_millis(30)));
    assert_eq!(scheduler.now(), Duration::from_millis(100));
  }

  #[rxstream_macro::test]
  fn cancelled_task_never_runs() {
    let scheduler = ManualScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let task = scheduler.after(Duration::from_millis(5), log_task(&log, "task"));
    assert!(task.cancel());
    assert_eq!(scheduler.pending_tasks(), 0);

    scheduler.flush();
    assert!(log.borrow().is_empty());
  }

  #[rxstream_macro::test]
  fn scheduling_drops_cancelled_tasks() {
    let scheduler = ManualScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let cancelled: Vec<_> = (0..3)
      .map(|i| scheduler.after(Duration::from_secs(60 + i), log_task(&log, "cancelled")))
      .collect();
    cancelled.iter().for_each(|t| {
      t.cancel();
    });
    assert_eq!(scheduler.0.rc_deref().queue.len(), 3);

    let _kept = scheduler.after(Duration::from_millis(1), log_task(&log, "kept"));
    assert_eq!(scheduler.0.rc_deref().queue.len(), 1);
    assert_eq!(Rc::strong_count(&log), 2);

    scheduler.flush();
    assert_eq!(*log.borrow(), vec!["kept"]);
  }

  #[rxstream_macro::test]
  fn flush_runs_tasks_scheduled_by_tasks() {
    let scheduler = ManualScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    let _outer = scheduler.after(Duration::from_millis(5), move || {
      c_log.borrow_mut().push("outer");
      let log = c_log.clone();
      let inner = c_scheduler.after(Duration::from_millis(5), move || log.borrow_mut().push("inner"));
      drop(inner);
    });

    scheduler.flush();
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    assert_eq!(scheduler.now(), Duration::from_millis(10));
  }

  #[rxstream_macro::test]
  fn handle_is_inactive_after_run() {
    let scheduler = ManualScheduler::new();
    let task = scheduler.after(Duration::ZERO, || {});
    assert!(task.is_active());
    scheduler.advance_by(Duration::ZERO);
    assert!(!task.is_active());
  }
}
