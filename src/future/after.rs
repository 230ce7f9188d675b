// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Duration;

use crate::timer::Schedule;
use super::{Deferred, Future, Progress};

impl<T, E> Future<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    /// Derive a future that repeats this one's success, failure and
    /// progress, each `delay` later, scheduled on `scheduler`.
    pub fn after<S>(&self, scheduler: S, delay: Duration) -> Future<T, E>
        where S: Schedule + Clone + Send + 'static
    {
        Future::new(|deferred: Deferred<T, E>| {
            let (resolve, timer) = (deferred.clone(), scheduler.clone());
            self.on_success(move |value: &T| {
                let (resolve, value) = (resolve.clone(), value.clone());
                timer.schedule_after(delay, Box::new(move || resolve.resolve(value)));
            });

            let (reject, timer) = (deferred.clone(), scheduler.clone());
            self.on_failure(move |error: &E| {
                let (reject, error) = (reject.clone(), error.clone());
                timer.schedule_after(delay, Box::new(move || reject.reject(error)));
            });

            self.on_progress(move |progress: &Progress| {
                let (notify, progress) = (deferred.clone(), *progress);
                scheduler.schedule_after(delay, Box::new(move || notify.notify(progress)));
            });
        })
    }
}
