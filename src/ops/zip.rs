//! Zip operators
//!
//! Keep the latest value of every source. Nothing is emitted until each
//! source produced at least one value; from then on every update of any
//! source emits the combination of the latest values.
use std::{panic::Location, rc::Rc};

use crate::{
  observable::{Emitter, Observable, Publisher},
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

macro_rules! impl_zip {
  ($name: ident; $($src: ident: $S: ident => $idx: tt),+) => {
    pub(crate) fn $name<$($S,)+ R, F>(
      location: &'static Location<'static>, $($src: &$S,)+ zipper: F,
    ) -> Observable<R>
    where
      $($S: Publisher<Item: Clone + 'static> + Clone + 'static,)+
      R: Clone + 'static,
      F: Fn($($S::Item),+) -> R + 'static,
    {
      $(let $src = $src.clone();)+
      let zipper = Rc::new(zipper);
      Observable::new(move |emit: Emitter<R>| {
        let latest: MutRc<($(Option<$S::Item>,)+)> = MutRc::own(Default::default());
        let try_emit = {
          let latest = latest.clone();
          let zipper = zipper.clone();
          Rc::new(move || {
            let ready = match &*latest.rc_deref() {
              ($(Some($src),)+) => Some(($($src.clone(),)+)),
              _ => None,
            };
            if let Some(($($src,)+)) = ready {
              emit.emit(zipper($($src),+));
            }
          })
        };
        let subscriptions = [$({
          let latest = latest.clone();
          let try_emit = try_emit.clone();
          $src.subscribe_at(location, move |v| {
            latest.rc_deref_mut().$idx = Some(v);
            try_emit();
          })
        }),+];
        Subscription::join_all(subscriptions)
      })
    }
  };
}

impl_zip!(zip2; a: A => 0, b: B => 1);
impl_zip!(zip3; a: A => 0, b: B => 1, c: C => 2);
impl_zip!(zip4; a: A => 0, b: B => 1, c: C => 2, d: D => 3);
