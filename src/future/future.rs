// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::sync::Spinlock;
use super::{Core, Deferred, Progress, State};

/// Result of a success continuation passed to `chain()`
enum Step<U, E> {
    Value(U),
    Chain(Future<U, E>),
}

/// Single-settlement asynchronous result.
///
/// Cloning a `Future` yields another handle to the same result.
pub struct Future<T, E = Error>(Arc<Core<T, E>>);

impl<T, E> Future<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    pub(crate) fn with_core(core: Arc<Core<T, E>>) -> Future<T, E> {
        Future(core)
    }

    /// Create a future and run `setup` with its settlement handle.
    ///
    /// `setup` runs synchronously; it usually hands the `Deferred` to some
    /// asynchronous work which settles it later.
    pub fn new<F>(setup: F) -> Future<T, E>
        where F: FnOnce(Deferred<T, E>)
    {
        let core = Core::new();
        setup(Deferred::with_core(core.clone()));
        Future(core)
    }

    pub fn resolved(value: T) -> Future<T, E> {
        Future::new(|deferred| deferred.resolve(value))
    }

    pub fn rejected(error: E) -> Future<T, E> {
        Future::new(|deferred| deferred.reject(error))
    }

    pub fn on_success<F>(&self, callback: F) -> &Self
        where F: FnMut(&T) + Send + 'static
    {
        self.0.done.add(callback);
        self
    }

    pub fn on_failure<F>(&self, callback: F) -> &Self
        where F: FnMut(&E) + Send + 'static
    {
        self.0.fail.add(callback);
        self
    }

    pub fn on_progress<F>(&self, callback: F) -> &Self
        where F: FnMut(&Progress) + Send + 'static
    {
        self.0.progress.add(callback);
        self
    }

    /// Run `callback` once with the outcome, whichever it is
    pub fn on_settled<F>(&self, callback: F) -> &Self
        where F: FnOnce(Result<&T, &E>) + Send + 'static
    {
        let success = Arc::new(Spinlock::new(Some(callback)));
        let failure = success.clone();

        self.on_success(move |value: &T| {
            let callback = success.lock().take();
            if let Some(callback) = callback {
                callback(Ok(value));
            }
        });
        self.on_failure(move |error: &E| {
            let callback = failure.lock().take();
            if let Some(callback) = callback {
                callback(Err(error));
            }
        })
    }

    /// Derive a future resolved with the value returned by `on_success`.
    ///
    /// An `Err` returned by `on_success` rejects the derived future. Errors
    /// and progress of this future pass through unchanged.
    pub fn then<U, S>(&self, on_success: S) -> Future<U, E>
        where U: Clone + Send + 'static,
              S: FnOnce(T) -> Result<U, E> + Send + 'static
    {
        self.then_with(on_success, |error| error, |progress| progress)
    }

    /// Like `then()`, transforming errors and progress on their way through
    pub fn then_with<U, S, F, P>(&self, on_success: S, on_failure: F, on_progress: P) -> Future<U, E>
        where U: Clone + Send + 'static,
              S: FnOnce(T) -> Result<U, E> + Send + 'static,
              F: FnOnce(E) -> E + Send + 'static,
              P: FnMut(Progress) -> Progress + Send + 'static
    {
        self.chain(move |value| on_success(value).map(Step::Value),
                   on_failure,
                   on_progress)
    }

    /// Derive a future that follows the future returned by `on_success`
    pub fn and_then<U, S>(&self, on_success: S) -> Future<U, E>
        where U: Clone + Send + 'static,
              S: FnOnce(T) -> Result<Future<U, E>, E> + Send + 'static
    {
        self.and_then_with(on_success, |error| error, |progress| progress)
    }

    /// Like `and_then()`, transforming errors and progress of this future
    pub fn and_then_with<U, S, F, P>(&self,
                                     on_success: S,
                                     on_failure: F,
                                     on_progress: P)
                                     -> Future<U, E>
        where U: Clone + Send + 'static,
              S: FnOnce(T) -> Result<Future<U, E>, E> + Send + 'static,
              F: FnOnce(E) -> E + Send + 'static,
              P: FnMut(Progress) -> Progress + Send + 'static
    {
        self.chain(move |value| on_success(value).map(Step::Chain),
                   on_failure,
                   on_progress)
    }

    fn chain<U, S, F, P>(&self, on_success: S, on_failure: F, mut on_progress: P) -> Future<U, E>
        where U: Clone + Send + 'static,
              S: FnOnce(T) -> Result<Step<U, E>, E> + Send + 'static,
              F: FnOnce(E) -> E + Send + 'static,
              P: FnMut(Progress) -> Progress + Send + 'static
    {
        Future::new(|deferred: Deferred<U, E>| {
            let next = deferred.clone();
            let mut on_success = Some(on_success);
            self.on_success(move |value: &T| {
                let on_success = match on_success.take() {
                    Some(f) => f,
                    None => return,
                };

                match on_success(value.clone()) {
                    Ok(Step::Value(value)) => next.resolve(value),
                    Ok(Step::Chain(future)) => {
                        future.forward(&next);
                    }
                    Err(error) => next.reject(error),
                }
            });

            let next = deferred.clone();
            let mut on_failure = Some(on_failure);
            self.on_failure(move |error: &E| {
                if let Some(on_failure) = on_failure.take() {
                    next.reject(on_failure(error.clone()));
                }
            });

            self.on_progress(move |progress: &Progress| deferred.notify(on_progress(*progress)));
        })
    }

    /// Settle `deferred` the way this future settles, relaying progress
    pub fn forward(&self, deferred: &Deferred<T, E>) -> &Self {
        let (resolve, reject, notify) = (deferred.clone(), deferred.clone(), deferred.clone());
        self.on_success(move |value: &T| resolve.resolve(value.clone()))
            .on_failure(move |error: &E| reject.reject(error.clone()))
            .on_progress(move |progress: &Progress| notify.notify(*progress))
    }

    pub fn is_pending(&self) -> bool {
        match *self.0.state.lock() {
            State::Pending => true,
            _ => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_resolved(&self) -> bool {
        match *self.0.state.lock() {
            State::Resolved(..) => true,
            _ => false,
        }
    }

    pub fn is_rejected(&self) -> bool {
        match *self.0.state.lock() {
            State::Rejected(..) => true,
            _ => false,
        }
    }

    /// A copy of the outcome, if the future is settled
    pub fn result(&self) -> Option<Result<T, E>> {
        match *self.0.state.lock() {
            State::Pending => None,
            State::Resolved(ref value) => Some(Ok(value.clone())),
            State::Rejected(ref error) => Some(Err(error.clone())),
        }
    }
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Future<T, E> {
        Future(self.0.clone())
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.state.try_lock() {
            Some(state) => write!(f, "Future {{ state: {:?} }}", &*state),
            None => write!(f, "Future {{ <locked> }}"),
        }
    }
}
