//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Errors
pub use crate::error::{PublishError, StreamId};
// Core types and traits
pub use crate::observable::{Emitter, Observable, Publisher};
// Operators
pub use crate::ops::{join_all, FirstEvent, ObservableExt};
// Values
pub use crate::rx_val::{RxRef, RxVal, RxValCache, RxValSetter, ValueHolder};
// Schedulers
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
pub use crate::scheduler::{Duration, ManualScheduler, Scheduler};
// Subjects
pub use crate::subject::*;
// Subscription
pub use crate::subscription::*;
