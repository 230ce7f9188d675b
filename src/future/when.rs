// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::mem;
use std::sync::Arc;

use crate::sync::Spinlock;
use super::{Deferred, Future, Progress};

struct Join<T> {
    remaining: usize,
    results: Vec<Option<T>>,
}

/// Join several futures into one.
///
/// The joined future resolves once every input resolved, with the values
/// at the index of their future. It rejects with the first error among
/// the inputs, and relays every progress report of every input. An empty
/// input resolves right away with an empty vector.
pub fn when<T, E, I>(futures: I) -> Future<Vec<Option<T>>, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static,
          I: IntoIterator<Item = Future<T, E>>
{
    let futures: Vec<Future<T, E>> = futures.into_iter().collect();

    Future::new(move |deferred: Deferred<Vec<Option<T>>, E>| {
        if futures.is_empty() {
            deferred.resolve(Vec::new());
            return;
        }

        let join = Arc::new(Spinlock::new(Join {
            remaining: futures.len(),
            results: vec![None; futures.len()],
        }));

        for (index, future) in futures.iter().enumerate() {
            let resolve = deferred.clone();
            let join = join.clone();
            future.on_success(move |value: &T| {
                let results = {
                    let mut join = join.lock();
                    join.results[index] = Some(value.clone());
                    join.remaining -= 1;
                    if join.remaining == 0 {
                        Some(mem::replace(&mut join.results, Vec::new()))
                    } else {
                        None
                    }
                };

                if let Some(results) = results {
                    trace!("when(): all {} futures resolved", results.len());
                    resolve.resolve(results);
                }
            });

            let reject = deferred.clone();
            future.on_failure(move |error: &E| reject.reject(error.clone()));

            let notify = deferred.clone();
            future.on_progress(move |progress: &Progress| notify.notify(*progress));
        }
    })
}

impl<T, E> Future<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    /// See `when()`
    pub fn when<I>(futures: I) -> Future<Vec<Option<T>>, E>
        where I: IntoIterator<Item = Future<T, E>>
    {
        when(futures)
    }
}
