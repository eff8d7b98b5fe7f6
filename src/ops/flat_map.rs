//! FlatMap operators
//!
//! `flat_map` turns each source value into an inner publisher and forwards
//! the events of the most recent one. Producing a new inner publisher cancels
//! the subscription to the previous one; events it would have emitted later
//! are not replayed.
//!
//! ```rust
//! use rxstream::prelude::*;
//!
//! let selected = Subject::<usize>::new();
//! let channels = [Subject::<&str>::new(), Subject::<&str>::new()];
//! let c_channels = channels.clone();
//! let _s = selected
//!   .flat_map(move |idx| c_channels[idx].clone())
//!   .subscribe(|msg| println!("{msg}"));
//!
//! selected.push(0);
//! channels[0].push("from 0");
//! selected.push(1);
//! channels[0].push("ignored");
//! ```
use std::{cell::Cell, panic::Location, rc::Rc};

use crate::{
  observable::{Emitter, Observable, Publisher},
  rc::{MutRc, RcDerefMut},
  subscription::Subscription,
};

pub(crate) fn flat_map<S, P, F>(
  source: &S, location: &'static Location<'static>, f: F,
) -> Observable<P::Item>
where
  S: Publisher + Clone + 'static,
  P: Publisher<Item: Clone + 'static> + 'static,
  F: Fn(S::Item) -> P + 'static,
{
  let source = source.clone();
  let f = Rc::new(f);
  Observable::new(move |emit: Emitter<P::Item>| {
    let inner: MutRc<Option<Subscription>> = MutRc::own(None);
    let closed = Rc::new(Cell::new(false));
    let f = f.clone();
    let (c_inner, c_closed) = (inner.clone(), closed.clone());
    let outer = source.subscribe_at(location, move |v| {
      let previous = c_inner.rc_deref_mut().take();
      if let Some(previous) = previous {
        previous.cancel();
      }
      let emit = emit.clone();
      let subscription = f(v).subscribe_at(location, move |b| {
        emit.emit(b);
      });
      // Downstream may have left while the new inner publisher emitted.
      if c_closed.get() {
        subscription.cancel();
      } else {
        *c_inner.rc_deref_mut() = Some(subscription);
      }
    });
    outer.and_then(move || {
      closed.set(true);
      let current = inner.rc_deref_mut().take();
      if let Some(current) = current {
        current.cancel();
      }
    })
  })
}

pub(crate) fn flat_map_iter<S, I, F>(
  source: &S, location: &'static Location<'static>, f: F,
) -> Observable<I::Item>
where
  S: Publisher + Clone + 'static,
  I: IntoIterator<Item: Clone + 'static>,
  F: Fn(S::Item) -> I + 'static,
{
  let source = source.clone();
  let f = Rc::new(f);
  Observable::new(move |emit: Emitter<I::Item>| {
    let f = f.clone();
    source.subscribe_at(location, move |v| {
      for b in f(v) {
        if !emit.emit(b) {
          break;
        }
      }
    })
  })
}
