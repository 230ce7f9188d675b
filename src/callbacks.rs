// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ordered multi-subscriber callback lists
//!
//! A `CallbackList` calls every registered callback, in insertion order,
//! with each argument passed to `fire`. Its `Options` decide whether it
//! can fire more than once, whether callbacks added later get the last
//! argument replayed, and whether a callback may cut a dispatch short.
//!
//! Callbacks always run without the list's lock held. A `fire` issued
//! while a dispatch is running (from a callback, or from another thread)
//! is queued and delivered by the running dispatcher, in FIFO order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::options::Options;
use crate::sync::spinlock::Spinlock;

/// Continuation signal returned by callbacks.
///
/// Only consulted by lists created with `Options::STOP_ON_FALSE`.
pub trait Signal {
    /// Whether the remaining callbacks should still see the current argument
    fn proceed(&self) -> bool;
}

impl Signal for () {
    #[inline(always)]
    fn proceed(&self) -> bool {
        true
    }
}

impl Signal for bool {
    #[inline(always)]
    fn proceed(&self) -> bool {
        *self
    }
}

type Callback<A, R> = Arc<Spinlock<Box<dyn FnMut(&A) -> R + Send>>>;

struct Queued<A> {
    argument: A,
    // Index of the first callback to receive `argument`
    start: usize,
}

struct Inner<A, R> {
    fired: bool,
    firing: bool,
    locked: bool,
    // `None` once the list is disabled
    callbacks: Option<Vec<Callback<A, R>>>,
    queue: VecDeque<Queued<A>>,
    memory: Option<A>,
    firing_index: usize,
    // Set by `lock()` during a dispatch: the argument in flight goes no further
    halted: bool,
}

impl<A, R> Inner<A, R> {
    fn begin(&mut self, options: Options) {
        if options.contains(Options::ONCE) {
            self.locked = true;
        }
        self.fired = true;
        self.firing = true;
    }

    fn finish(&mut self, options: Options) {
        self.firing = false;
        self.halted = false;
        if !options.contains(Options::MEMORY) {
            self.memory = None;
        }

        if self.locked {
            // Keep an empty list if a late `add` still has something to replay
            self.callbacks = if self.memory.is_some() {
                Some(Vec::new())
            } else {
                None
            };
        }
    }

    fn disable(&mut self) {
        self.locked = true;
        self.memory = None;
        self.callbacks = None;
        self.queue.clear();
    }
}

/// Ordered list of callbacks fired with a shared argument
pub struct CallbackList<A, R = ()> {
    options: Options,
    inner: Spinlock<Inner<A, R>>,
}

impl<A, R> CallbackList<A, R>
    where A: Clone + Send + 'static,
          R: Signal + 'static
{
    /// Create an empty list with the given firing policy
    pub fn new(options: Options) -> CallbackList<A, R> {
        CallbackList {
            options,
            inner: Spinlock::new(Inner {
                fired: false,
                firing: false,
                locked: false,
                callbacks: Some(Vec::new()),
                queue: VecDeque::new(),
                memory: None,
                firing_index: 0,
                halted: false,
            }),
        }
    }

    #[inline]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Append a callback.
    ///
    /// With `Options::MEMORY`, a callback added after the list fired is
    /// called right away, before `add` returns, with the retained argument.
    /// On a locked list that call happens on the calling thread and the
    /// callback is not kept, even if another thread is replaying to its own
    /// late callback at the same time. Does nothing on a disabled list.
    pub fn add<F>(&self, mut callback: F) -> &Self
        where F: FnMut(&A) -> R + Send + 'static
    {
        {
            let mut inner = self.inner.lock();

            if inner.callbacks.is_none() {
                return self;
            }

            // Nothing can be fired anymore: only the retained argument is left
            if inner.locked && (!inner.firing || inner.halted) {
                let argument = match inner.memory {
                    Some(ref argument) if self.options.contains(Options::MEMORY) => {
                        argument.clone()
                    }
                    _ => return self,
                };
                drop(inner);

                trace!("CallbackList{}: replaying memory on a locked list", self.options);
                callback(&argument);
                return self;
            }

            let start = match inner.callbacks {
                Some(ref mut callbacks) => {
                    let callback: Box<dyn FnMut(&A) -> R + Send> = Box::new(callback);
                    callbacks.push(Arc::new(Spinlock::new(callback)));
                    callbacks.len() - 1
                }
                None => return self,
            };

            // A running dispatch will reach the new callback on its own
            if inner.firing {
                return self;
            }

            match inner.memory.clone() {
                Some(argument) => {
                    trace!("CallbackList{}: replaying memory to callback #{}", self.options, start);
                    inner.queue.push_back(Queued { argument, start });
                    inner.begin(self.options);
                }
                None => return self,
            }
        }

        self.dispatch();
        self
    }

    /// Call all callbacks with `argument`. Does nothing on a locked list.
    pub fn fire(&self, argument: A) -> &Self {
        {
            let mut inner = self.inner.lock();

            if inner.locked {
                trace!("CallbackList{}: fire() on a locked list", self.options);
                return self;
            }

            inner.queue.push_back(Queued { argument, start: 0 });
            if inner.firing {
                trace!("CallbackList{}: fire() while firing, queued", self.options);
                return self;
            }

            inner.begin(self.options);
        }

        self.dispatch();
        self
    }

    fn dispatch(&self) {
        let mut reset = ResetOnUnwind { list: self, armed: true };
        let mut inner = self.inner.lock();

        loop {
            let Queued { argument, start } = match inner.queue.pop_front() {
                Some(queued) => queued,
                None => {
                    inner.finish(self.options);
                    reset.armed = false;
                    return;
                }
            };

            inner.memory = Some(argument.clone());
            inner.firing_index = start;

            loop {
                let callback = match inner.callbacks {
                    Some(ref callbacks) if inner.firing_index < callbacks.len() => {
                        callbacks[inner.firing_index].clone()
                    }
                    _ => break,
                };
                inner.firing_index += 1;
                drop(inner);

                let proceed = {
                    let mut callback = callback.lock();
                    (&mut **callback)(&argument).proceed()
                };

                inner = self.inner.lock();
                if inner.halted {
                    trace!("CallbackList{}: locked during dispatch, stopped", self.options);
                    break;
                }
                if !proceed && self.options.contains(Options::STOP_ON_FALSE) {
                    trace!("CallbackList{}: callback returned false, dispatch stopped",
                           self.options);
                    // Forget the argument so a later `add` doesn't replay it
                    inner.memory = None;
                    break;
                }
            }
        }
    }

    /// Remove every callback, keeping the list's state untouched
    pub fn remove_all(&self) -> &Self {
        if let Some(ref mut callbacks) = self.inner.lock().callbacks {
            callbacks.clear();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().callbacks.as_ref().map_or(true, Vec::is_empty)
    }

    /// Disable `fire` and `add`, forget the retained argument and all
    /// queued arguments, and release every callback.
    ///
    /// A callback that is already running is not interrupted.
    pub fn disable(&self) -> &Self {
        trace!("CallbackList{}: disabled", self.options);
        self.inner.lock().disable();
        self
    }

    /// Whether the callback storage has been released
    pub fn is_disabled(&self) -> bool {
        self.inner.lock().callbacks.is_none()
    }

    /// Disable `fire`.
    ///
    /// `add` keeps replaying the retained argument, if there is one;
    /// otherwise the list is disabled altogether. Arguments queued behind a
    /// running dispatch are dropped, and the argument being dispatched is
    /// not delivered to the callbacks it has not reached yet.
    pub fn lock(&self) -> &Self {
        let mut inner = self.inner.lock();
        inner.locked = true;
        if inner.firing {
            inner.queue.clear();
            inner.halted = true;
        }
        if inner.memory.is_none() {
            trace!("CallbackList{}: locked without memory, disabled", self.options);
            inner.disable();
        }
        self
    }

    pub fn is_locked(&self) -> bool {
        self.inner.lock().locked
    }

    /// Whether the list has been fired at least once
    pub fn is_fired(&self) -> bool {
        self.inner.lock().fired
    }
}

impl<A, R> fmt::Debug for CallbackList<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => {
                write!(f,
                       "CallbackList {{ options: {}, fired: {}, firing: {}, locked: {}, \
                        callbacks: {:?} }}",
                       self.options,
                       inner.fired,
                       inner.firing,
                       inner.locked,
                       inner.callbacks.as_ref().map(Vec::len))
            }
            None => write!(f, "CallbackList {{ options: {}, <locked> }}", self.options),
        }
    }
}

// Leaves the list usable if a callback panics in the middle of a dispatch
struct ResetOnUnwind<'a, A, R> {
    list: &'a CallbackList<A, R>,
    armed: bool,
}

impl<'a, A, R> Drop for ResetOnUnwind<'a, A, R> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.list.inner.lock();
            inner.queue.clear();
            inner.finish(self.list.options);
        }
    }
}
