// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single-settlement futures
//!
//! A `Future` is created together with a `Deferred`, its settlement
//! handle. The producer calls `resolve` or `reject` once and `notify` any
//! number of times before that; consumers register continuations, which
//! are replayed with the final outcome if they arrive late.
//!
//! Most parts of this module use the following template parameters:
//!
//! T => The value of a resolved future
//! E => The error of a rejected future
//! U => The value of a future derived with `then()` or `and_then()`

mod after;
mod deferred;
mod future;
mod when;

pub use self::deferred::Deferred;
pub use self::future::Future;
pub use self::when::when;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::callbacks::CallbackList;
use crate::options::Options;
use crate::sync::Spinlock;

/// Progress report of the work behind a pending `Future`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(completed: u64, total: u64) -> Progress {
        Progress { completed, total }
    }

    /// Completed fraction, clamped to `0.0..=1.0`; zero when `total` is unknown
    pub fn fraction_completed(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

pub(crate) enum State<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for State<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            State::Pending => write!(f, "Pending"),
            State::Resolved(ref value) => write!(f, "Resolved({:?})", value),
            State::Rejected(ref error) => write!(f, "Rejected({:?})", error),
        }
    }
}

/// A `Core` is the shared data between a `Deferred` and its `Future`s
///
/// It owns the three callback lists; the continuations registered by
/// consumers live inside them. Its own bookkeeping callbacks only hold
/// weak references back to the core.
pub(crate) struct Core<T, E> {
    state: Spinlock<State<T, E>>,
    claimed: AtomicBool,
    done: CallbackList<T>,
    fail: CallbackList<E>,
    progress: CallbackList<Progress>,
}

impl<T, E> Core<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    fn new() -> Arc<Core<T, E>> {
        let core = Arc::new(Core {
            state: Spinlock::new(State::Pending),
            claimed: AtomicBool::new(false),
            done: CallbackList::new(Options::SETTLEMENT),
            fail: CallbackList::new(Options::SETTLEMENT),
            progress: CallbackList::new(Options::MEMORY),
        });

        let weak = Arc::downgrade(&core);
        core.done.add(move |value: &T| {
            Core::settle(&weak, State::Resolved(value.clone()));
        });

        let weak = Arc::downgrade(&core);
        core.fail.add(move |error: &E| {
            Core::settle(&weak, State::Rejected(error.clone()));
        });

        core
    }

    // First callback of both settlement lists
    fn settle(weak: &Weak<Core<T, E>>, state: State<T, E>) {
        let core = match weak.upgrade() {
            Some(core) => core,
            None => return,
        };

        let resolved = match state {
            State::Resolved(..) => true,
            _ => false,
        };
        *core.state.lock() = state;

        if resolved {
            debug!("Future resolved");
            core.fail.disable();
        } else {
            debug!("Future rejected");
            core.done.disable();
        }
        core.progress.lock();
    }

    /// Only the first settlement attempt wins, even across threads
    fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Create a pending `Future` and the `Deferred` that settles it
pub fn make<T, E>() -> (Deferred<T, E>, Future<T, E>)
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    let core = Core::new();
    (Deferred::with_core(core.clone()), Future::with_core(core))
}
