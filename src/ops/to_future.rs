use std::{
  future::Future,
  panic::Location,
  pin::Pin,
  task::{Context, Poll},
};

use futures::channel::oneshot;

use crate::{
  observable::Publisher,
  subscription::{Subscription, SubscriptionGuard},
};

/// Future returned by [`ObservableExt::to_future`](crate::ops::ObservableExt::to_future).
///
/// Resolves with the next event, or with `None` if the stream finished before
/// emitting. Dropping the future cancels the underlying subscription.
#[must_use = "futures do nothing unless polled"]
pub struct FirstEvent<A> {
  receiver: oneshot::Receiver<A>,
  _subscription: SubscriptionGuard,
}

pub(crate) fn to_future<S>(source: &S, location: &'static Location<'static>) -> FirstEvent<S::Item>
where
  S: Publisher,
  S::Item: 'static,
{
  let (sender, receiver) = oneshot::channel();
  let subscription: Subscription =
    super::subscribe_with_handle::subscribe_for_one_event(source, location, move |v| {
      // The receiver may already be gone.
      let _ = sender.send(v);
    });
  FirstEvent { receiver, _subscription: subscription.unsubscribe_when_dropped() }
}

impl<A> Future for FirstEvent<A> {
  type Output = Option<A>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
  }
}
