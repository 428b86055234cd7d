//! Deferred work queue
//!
//! A [`WorkQueue`] owns one work item and one worker thread. Producers hold a
//! [`WorkHandle`] and call [`WorkHandle::queue`] from any context, including
//! interrupt-like signal handlers: queueing is a single compare-and-swap plus
//! an unpark, it never blocks and never runs the work inline.
//!
//! # State machine
//!
//! ```text
//!  Idle --queue--> Queued --worker--> Running --done--> Idle
//!                    |                   |
//!                    +-- queue: coalesced +-- queue: coalesced
//! ```
//!
//! At most one item is outstanding: a `queue` call while `Queued` or
//! `Running` is counted as coalesced and dropped.
//!
//! # Cancellation
//!
//! [`WorkQueue::cancel_sync`] closes the queue, cancels a queued item that has
//! not started and waits for a running item to finish. Once it returns the
//! work item will not start again until the queue is dropped.

use crate::error::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, Thread};

const IDLE: u8 = 0;
const QUEUED: u8 = 1;
const RUNNING: u8 = 2;

/// Work item state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// Nothing pending
    Idle,
    /// Queued, not yet started
    Queued,
    /// Executing on the worker thread
    Running,
}

impl WorkState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            QUEUED => WorkState::Queued,
            RUNNING => WorkState::Running,
            _ => WorkState::Idle,
        }
    }
}

/// Work queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkStats {
    /// Completed runs, successful or not
    pub runs: u64,
    /// Runs that returned an error or panicked
    pub failures: u64,
    /// Queue requests dropped because an item was already outstanding
    pub coalesced: u64,
    /// Queue requests dropped because the queue was closed
    pub rejected: u64,
}

struct Shared {
    state: AtomicU8,
    closed: AtomicBool,
    stop: AtomicBool,
    runs: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
    rejected: AtomicU64,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            closed: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            runs: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            idle_lock: Mutex::new(()),
            idle: Condvar::new(),
        }
    }

    fn state(&self) -> WorkState {
        WorkState::from_raw(self.state.load(Ordering::SeqCst))
    }

    fn lock_idle(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state.
        self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return to Idle and wake waiters
    fn finish(&self) {
        {
            let _guard = self.lock_idle();
            self.state.store(IDLE, Ordering::SeqCst);
        }
        self.idle.notify_all();
    }

    /// Block while the state satisfies `busy`
    fn wait_while(&self, busy: impl Fn(u8) -> bool) {
        let mut guard = self.lock_idle();
        while busy(self.state.load(Ordering::SeqCst)) {
            guard = self
                .idle
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn stats(&self) -> WorkStats {
        WorkStats {
            runs: self.runs.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            coalesced: self.coalesced.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
        }
    }
}

/// Producer side of a [`WorkQueue`]
#[derive(Clone)]
pub struct WorkHandle {
    shared: Arc<Shared>,
    worker: Thread,
}

impl WorkHandle {
    /// Queue the work item
    ///
    /// Returns `true` if the item moved from Idle to Queued, `false` if the
    /// request was coalesced or the queue is closed. Never blocks.
    pub fn queue(&self) -> bool {
        if self.shared.closed.load(Ordering::SeqCst) {
            self.shared.rejected.fetch_add(1, Ordering::SeqCst);
            return false;
        }
        match self.shared.state.compare_exchange(
            IDLE,
            QUEUED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                self.worker.unpark();
                true
            }
            Err(_) => {
                self.shared.coalesced.fetch_add(1, Ordering::SeqCst);
                false
            }
        }
    }

    /// Current state of the work item
    pub fn state(&self) -> WorkState {
        self.shared.state()
    }
}

/// Single-item work queue with a dedicated worker thread
pub struct WorkQueue {
    name: String,
    shared: Arc<Shared>,
    thread: Thread,
    worker: Option<JoinHandle<()>>,
}

impl WorkQueue {
    /// Spawn a worker thread named `name` that runs `work` each time the item
    /// is queued
    ///
    /// A run that returns an error or panics is logged and counted as a
    /// failure; the queue returns to Idle and waits for the next request.
    /// `work` is dropped on the worker thread when the queue shuts down.
    pub fn spawn<F>(name: &str, mut work: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let worker = thread::Builder::new().name(name.to_string()).spawn({
            let shared = Arc::clone(&shared);
            let name = name.to_string();
            move || run_worker(&name, &shared, &mut work)
        })?;

        crate::log_debug!("{}: worker started", name);
        Ok(Self {
            name: name.to_string(),
            shared,
            thread: worker.thread().clone(),
            worker: Some(worker),
        })
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a producer handle
    pub fn handle(&self) -> WorkHandle {
        WorkHandle {
            shared: Arc::clone(&self.shared),
            worker: self.thread.clone(),
        }
    }

    /// Current state of the work item
    pub fn state(&self) -> WorkState {
        self.shared.state()
    }

    /// Counters since spawn
    pub fn stats(&self) -> WorkStats {
        self.shared.stats()
    }

    /// Wait until no item is queued or running
    pub fn flush(&self) {
        self.shared.wait_while(|state| state != IDLE);
    }

    /// Close the queue, cancel a queued item and wait for a running one
    ///
    /// Returns `true` if a queued item was cancelled before it started.
    pub fn cancel_sync(&self) -> bool {
        self.shared.closed.store(true, Ordering::SeqCst);
        let cancelled = {
            let _guard = self.shared.lock_idle();
            self.shared
                .state
                .compare_exchange(QUEUED, IDLE, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        };
        if cancelled {
            self.shared.idle.notify_all();
        }
        self.shared.wait_while(|state| state == RUNNING);
        cancelled
    }

    /// Cancel outstanding work, stop the worker and join it
    ///
    /// The work closure (and whatever device resources it owns) is dropped
    /// before this returns.
    pub fn shutdown(mut self) -> WorkStats {
        self.stop();
        self.shared.stats()
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.cancel_sync();
        self.shared.stop.store(true, Ordering::SeqCst);
        worker.thread().unpark();
        if worker.join().is_err() {
            crate::log_error!("{}: worker thread panicked", self.name);
        }
        crate::log_debug!("{}: worker stopped", self.name);
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<F>(name: &str, shared: &Shared, work: &mut F)
where
    F: FnMut() -> Result<()>,
{
    loop {
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
        let claimed = shared
            .state
            .compare_exchange(QUEUED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !claimed {
            thread::park();
            continue;
        }

        // A request that slipped in after cancel_sync closed the queue is
        // discarded without running.
        if !shared.closed.load(Ordering::SeqCst) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(&mut *work));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    shared.failures.fetch_add(1, Ordering::SeqCst);
                    crate::log_warn!("{}: work aborted: {}", name, err);
                }
                Err(_) => {
                    shared.failures.fetch_add(1, Ordering::SeqCst);
                    crate::log_error!("{}: work panicked", name);
                }
            }
            shared.runs.fetch_add(1, Ordering::SeqCst);
        }
        shared.finish();
    }
}
