//! # rxstream: push-based reactive event streams
//!
//! Single-threaded observables with deterministic, re-entrant-safe delivery,
//! plus values that change over time.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use rxstream::prelude::*;
//!
//! let clicks = Subject::<i32>::new();
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//! let _s = clicks
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .subscribe(move |v| c_seen.borrow_mut().push(v));
//!
//! (1..=4).for_each(|v| clicks.push(v));
//! assert_eq!(*seen.borrow(), vec![20, 40]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Delivers events to its subscribers in subscription order |
//! | [`Subscription`] | Handle that stops delivery when cancelled |
//! | [`Subject`] / [`ReplaySubject`] / [`CacheSubject`] | Producers you push values into |
//! | [`RxVal`] / [`RxRef`] | Values with change notification |
//! | [`ObservableExt`] | Operators available on every publisher |
//!
//! ## Delivery Guarantees
//!
//! - A value published from inside a subscriber callback is queued and
//!   delivered once the running pass is over, to every subscriber, in order.
//! - A subscriber added during a pass first hears about the next event.
//! - A subscriber cancelled during a pass is never called again, not even for
//!   the event being delivered.
//! - A panicking subscriber is logged through `tracing` and unsubscribed; the
//!   other subscribers still receive the event.
//!
//! ## Feature Flags
//!
//! - **`tokio-scheduler`**: [`TokioLocalScheduler`](scheduler::TokioLocalScheduler),
//!   a wall-clock scheduler for tokio's `LocalSet`
//! - **`strong-subscriptions`**: subscriber records own their subscription,
//!   so dropping a [`Subscription`] without cancelling it keeps it running
//!
//! [`Observable`]: observable::Observable
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`ReplaySubject`]: subject::ReplaySubject
//! [`CacheSubject`]: subject::CacheSubject
//! [`RxVal`]: rx_val::RxVal
//! [`RxRef`]: rx_val::RxRef
//! [`ObservableExt`]: ops::ObservableExt

pub mod error;
pub mod observable;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod rx_val;
pub mod scheduler;
pub mod subject;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
