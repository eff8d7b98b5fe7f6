//! Error types reported by producers.
use std::{
  cell::Cell,
  fmt::{Debug, Display, Formatter},
};

use thiserror::Error;

/// Identity of one observable, used in diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StreamId(u64);

thread_local! {
  static NEXT_STREAM_ID: Cell<u64> = const { Cell::new(0) };
}

impl StreamId {
  pub(crate) fn next() -> Self {
    NEXT_STREAM_ID.with(|id| {
      let v = id.get();
      id.set(v + 1);
      StreamId(v)
    })
  }
}

impl Display for StreamId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

/// Returned when a value is published into a stream that refuses it.
///
/// The rejected value is handed back to the caller through
/// [`value`](PublishError::value) and [`into_value`](PublishError::into_value).
/// Neither `Display` nor `Debug` prints it, since items need not be `Debug`.
#[derive(Error)]
pub enum PublishError<A> {
  #[error("publish on finished stream {stream}")]
  Finished { stream: StreamId, value: A },
}

impl<A> PublishError<A> {
  pub fn stream(&self) -> StreamId {
    match self {
      PublishError::Finished { stream, .. } => *stream,
    }
  }

  pub fn value(&self) -> &A {
    match self {
      PublishError::Finished { value, .. } => value,
    }
  }

  pub fn into_value(self) -> A {
    match self {
      PublishError::Finished { value, .. } => value,
    }
  }
}

impl<A> Debug for PublishError<A> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      PublishError::Finished { stream, .. } => f
        .debug_struct("Finished")
        .field("stream", stream)
        .finish_non_exhaustive(),
    }
  }
}
