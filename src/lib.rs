// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Callback lists and single-settlement futures
//!
//! Two layers:
//!
//! * `CallbackList`: an ordered multi-subscriber dispatcher whose
//!   `Options` make it fire once, replay its last argument to late
//!   subscribers, or stop a dispatch when a callback returns `false`.
//! * `Future` / `Deferred`: a result settled at most once, built from three
//!   callback lists (success, failure, progress), with `then`, `and_then`,
//!   `when` and `after`.
//!
//! ```
//! use deferro::Future;
//!
//! let answer = Future::<i32, String>::new(|deferred| deferred.resolve(41))
//!     .then(|x| Ok(x + 1));
//!
//! answer.on_success(|x| assert_eq!(*x, 42));
//! assert!(answer.is_resolved());
//! ```
//!
//! Continuations run synchronously on whichever thread settles the future
//! (or, for a late subscriber, on the thread subscribing). Nothing here
//! blocks; producers that want asynchrony schedule their `resolve` on
//! another thread or on a `Timer`.

#[macro_use]
extern crate log;

pub use crate::callbacks::{CallbackList, Signal};
pub use crate::error::{DecodingError, Error};
pub use crate::future::{make, when, Deferred, Future, Progress};
pub use crate::options::Options;
pub use crate::timer::{Schedule, Timer};

pub mod bind;
pub mod callbacks;
pub mod error;
pub mod future;
pub mod net;
pub mod options;
pub mod sync;
pub mod timer;
