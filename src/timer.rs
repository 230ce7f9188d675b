// Copyright 2017 The deferro Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Delayed execution
//!
//! `Future::after` only needs something implementing `Schedule`. `Timer`
//! is the stock implementation: one worker thread sleeping until the
//! earliest deadline.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// A unit of work run by a `Schedule` implementation
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A delayed-execution facility
pub trait Schedule {
    /// Run `task` once `delay` has elapsed
    fn schedule_after(&self, delay: Duration, task: Task);
}

impl<S: Schedule + ?Sized> Schedule for Arc<S> {
    #[inline]
    fn schedule_after(&self, delay: Duration, task: Task) {
        (**self).schedule_after(delay, task)
    }
}

struct SleepingTask {
    deadline: Instant,
    // Keeps tasks with equal deadlines in submission order
    seq: u64,
    task: Task,
}

impl PartialEq for SleepingTask {
    fn eq(&self, other: &SleepingTask) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for SleepingTask {}

impl PartialOrd for SleepingTask {
    fn partial_cmp(&self, other: &SleepingTask) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: the BinaryHeap pops the earliest deadline first
impl Ord for SleepingTask {
    fn cmp(&self, other: &SleepingTask) -> Ordering {
        other.deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Queue {
    sleeping_tasks: BinaryHeap<SleepingTask>,
    next_seq: u64,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wakeup: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        // Tasks never run under the lock, so a poisoned queue is still consistent
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs scheduled tasks on a dedicated thread.
///
/// Dropping the `Timer` stops the thread; tasks that are still waiting
/// are dropped without running.
pub struct Timer {
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> io::Result<Timer> {
        Timer::with_name("deferro-timer")
    }

    /// Create a timer whose worker thread is called `name`
    pub fn with_name<N: Into<String>>(name: N) -> io::Result<Timer> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                sleeping_tasks: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
        });

        let name = name.into();
        let worker = {
            let shared = shared.clone();
            thread::Builder::new().name(name.clone()).spawn(move || run(&shared))?
        };
        debug!("Timer({}): started", name);

        Ok(Timer {
            shared,
            worker: Some(worker),
        })
    }

    /// Number of tasks waiting for their deadline
    pub fn pending(&self) -> usize {
        self.shared.lock().sleeping_tasks.len()
    }
}

impl Schedule for Timer {
    fn schedule_after(&self, delay: Duration, task: Task) {
        let mut queue = self.shared.lock();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.sleeping_tasks.push(SleepingTask {
            deadline: Instant::now() + delay,
            seq,
            task,
        });
        trace!("Timer: task #{} scheduled in {:?}", seq, delay);
        self.shared.wakeup.notify_one();
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wakeup.notify_all();

        if let Some(worker) = self.worker.take() {
            // A task may hold the last reference to its own timer
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
        debug!("Timer: stopped");
    }
}

fn run(shared: &Shared) {
    loop {
        let sleeping = {
            let mut queue = shared.lock();
            loop {
                if queue.shutdown {
                    return;
                }

                let now = Instant::now();
                let next = queue.sleeping_tasks.peek().map(|t| t.deadline);
                match next {
                    Some(deadline) if deadline <= now => break queue.sleeping_tasks.pop(),
                    Some(deadline) => {
                        queue = shared.wakeup
                            .wait_timeout(queue, deadline - now)
                            .unwrap_or_else(PoisonError::into_inner)
                            .0;
                    }
                    None => {
                        queue = shared.wakeup.wait(queue).unwrap_or_else(PoisonError::into_inner);
                    }
                }
            }
        };

        if let Some(SleepingTask { seq, task, .. }) = sleeping {
            trace!("Timer: running task #{}", seq);
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                error!("Timer: task #{} panicked", seq);
            }
        }
    }
}
