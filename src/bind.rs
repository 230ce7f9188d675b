// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mirroring a future's state on UI elements
//!
//! The elements are only held weakly; a view that goes away before the
//! future settles simply stops being updated.

use std::sync::Arc;

use crate::future::{Future, Progress};

/// A busy indicator
pub trait ActivityIndicator: Send + Sync {
    fn start_animating(&self);
    fn stop_animating(&self);
}

/// A progress bar showing a fraction in `0.0..=1.0`
pub trait ProgressIndicator: Send + Sync {
    fn set_progress(&self, fraction: f32);
}

/// Animate `view` until `future` settles
pub fn bind_activity<V, T, E>(view: &Arc<V>, future: &Future<T, E>)
    where V: ActivityIndicator + ?Sized + 'static,
          T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    view.start_animating();

    let view = Arc::downgrade(view);
    future.on_settled(move |_| {
        if let Some(view) = view.upgrade() {
            view.stop_animating();
        }
    });
}

/// Show the progress of `future` on `view`, full once it settles
pub fn bind_progress<V, T, E>(view: &Arc<V>, future: &Future<T, E>)
    where V: ProgressIndicator + ?Sized + 'static,
          T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    // Progress first: a settled future still replays its last report
    let progress_view = Arc::downgrade(view);
    future.on_progress(move |progress: &Progress| {
        if let Some(view) = progress_view.upgrade() {
            view.set_progress(progress.fraction_completed() as f32);
        }
    });

    let settled_view = Arc::downgrade(view);
    future.on_settled(move |_| {
        if let Some(view) = settled_view.upgrade() {
            view.set_progress(1.0);
        }
    });
}
