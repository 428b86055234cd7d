//! Interrupt dispatch
//!
//! Splits interrupt handling into a top half and a bottom half. The top half
//! is the signal handler: it only queues the device's work item. The bottom
//! half runs on the device's [`WorkQueue`] thread and is the only place bus
//! I/O happens.
//!
//! # Teardown order
//!
//! 1. Cancel a queued item that has not started
//! 2. Wait for a running item to finish
//! 3. Disable the signal source
//! 4. Stop the worker and drop the work item with everything it owns
//!
//! After [`InterruptDispatcher::teardown`] returns no work item can run, so
//! the device state captured by the item can be released.

use super::workqueue::{WorkQueue, WorkState, WorkStats};
use crate::error::Result;
use crate::platform::traits::{Edge, SignalSource};

/// Signal source wired to a work queue
pub struct InterruptDispatcher<S: SignalSource> {
    signal: S,
    queue: Option<WorkQueue>,
}

impl<S: SignalSource> InterruptDispatcher<S> {
    /// Spawn the work queue and attach its producer to `signal`
    ///
    /// If the signal cannot be attached the worker is stopped again and the
    /// work item dropped before the error is returned.
    pub fn arm<F>(mut signal: S, edge: Edge, name: &str, work: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let queue = WorkQueue::spawn(name, work)?;
        let producer = queue.handle();
        signal.attach(
            edge,
            Box::new(move || {
                producer.queue();
            }),
        )?;

        crate::log_debug!("{}: armed on {:?} edge", name, edge);
        Ok(Self {
            signal,
            queue: Some(queue),
        })
    }

    /// Current state of the work item
    pub fn state(&self) -> WorkState {
        self.queue
            .as_ref()
            .map_or(WorkState::Idle, WorkQueue::state)
    }

    /// Work counters
    pub fn stats(&self) -> WorkStats {
        self.queue
            .as_ref()
            .map(WorkQueue::stats)
            .unwrap_or_default()
    }

    /// Wait until no work is queued or running
    pub fn flush(&self) {
        if let Some(queue) = &self.queue {
            queue.flush();
        }
    }

    /// Tear down in the documented order and return the final counters
    pub fn teardown(mut self) -> WorkStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> WorkStats {
        let Some(queue) = self.queue.take() else {
            return WorkStats::default();
        };
        if queue.cancel_sync() {
            crate::log_debug!("{}: cancelled pending work", queue.name());
        }
        self.signal.detach();
        queue.shutdown()
    }
}

impl<S: SignalSource> Drop for InterruptDispatcher<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
