use std::panic::Location;

use crate::{
  observable::Publisher,
  rc::{MutRc, RcDerefMut},
  subscription::Subscription,
};

/// Subscribe with a callback that can cancel its own subscription.
///
/// The returned handle wraps the real subscription. The callback only sees it
/// through a weak link, so dropping the handle is still reported as a leak.
pub(crate) fn subscribe_with_handle<S, F>(
  source: &S, location: &'static Location<'static>, mut callback: F,
) -> Subscription
where
  S: Publisher,
  F: FnMut(S::Item, &Subscription) + 'static,
{
  let inner: MutRc<Option<Subscription>> = MutRc::own(None);
  let c_inner = inner.clone();
  let handle = Subscription::new(move || {
    let inner = c_inner.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.cancel();
    }
  });

  let weak_handle = handle.downgrade();
  let subscription = source.subscribe_at(location, move |v| {
    if let Some(handle) = weak_handle.upgrade() {
      if handle.is_active() {
        callback(v, &handle);
      }
    }
  });
  if handle.is_active() {
    *inner.rc_deref_mut() = Some(subscription);
  } else {
    subscription.cancel();
  }
  handle
}

pub(crate) fn subscribe_for_one_event<S, F>(
  source: &S, location: &'static Location<'static>, callback: F,
) -> Subscription
where
  S: Publisher,
  F: FnOnce(S::Item) + 'static,
{
  let mut callback = Some(callback);
  subscribe_with_handle(source, location, move |v, handle| {
    handle.cancel();
    if let Some(callback) = callback.take() {
      callback(v);
    }
  })
}
