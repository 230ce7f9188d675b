// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use super::{Core, Progress};

/// Settlement handle of a `Future`.
///
/// Only the first `resolve` or `reject` has an effect; `notify` is
/// ignored once the future is settled.
pub struct Deferred<T, E>(Arc<Core<T, E>>);

impl<T, E> Deferred<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    pub(crate) fn with_core(core: Arc<Core<T, E>>) -> Deferred<T, E> {
        Deferred(core)
    }

    pub fn resolve(&self, value: T) {
        if self.0.claim() {
            self.0.done.fire(value);
        } else {
            trace!("Deferred: resolve() on a settled future ignored");
        }
    }

    pub fn reject(&self, error: E) {
        if self.0.claim() {
            self.0.fail.fire(error);
        } else {
            trace!("Deferred: reject() on a settled future ignored");
        }
    }

    pub fn notify(&self, progress: Progress) {
        self.0.progress.fire(progress);
    }

    /// Settle with `Ok(T)` or `Err(E)`
    pub fn settle(&self, result: Result<T, E>) {
        match result {
            Ok(value) => self.resolve(value),
            Err(error) => self.reject(error),
        }
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Deferred<T, E> {
        Deferred(self.0.clone())
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deferred({:p})", Arc::as_ptr(&self.0))
    }
}
