//! Mock signal line for testing

use crate::platform::error::SignalError;
use crate::platform::traits::{Edge, SignalHandler, SignalSource};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct LineState {
    handler: Option<(Edge, SignalHandler)>,
    fired: usize,
    detached: usize,
}

/// Mock interrupt line
///
/// Clones share one line: hand one clone to the driver and call
/// [`fire`](Self::fire) on another to simulate an edge. The handler runs on
/// the firing thread, as an interrupt would preempt whatever was running.
#[derive(Clone, Default)]
pub struct MockSignalLine {
    state: Arc<Mutex<LineState>>,
}

impl MockSignalLine {
    /// Create a line with no handler
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate one edge; returns whether a handler was attached
    pub fn fire(&self) -> bool {
        let mut state = self.lock();
        state.fired += 1;
        match &state.handler {
            Some((_, handler)) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Whether a handler is attached
    pub fn is_attached(&self) -> bool {
        self.lock().handler.is_some()
    }

    /// Edge the attached handler was registered for
    pub fn edge(&self) -> Option<Edge> {
        self.lock().handler.as_ref().map(|(edge, _)| *edge)
    }

    /// Number of `fire` calls, attached or not
    pub fn fired(&self) -> usize {
        self.lock().fired
    }

    /// Number of times an attached handler was detached
    pub fn detach_count(&self) -> usize {
        self.lock().detached
    }
}

impl SignalSource for MockSignalLine {
    fn attach(&mut self, edge: Edge, handler: SignalHandler) -> Result<(), SignalError> {
        let mut state = self.lock();
        if state.handler.is_some() {
            return Err(SignalError::AlreadyAttached);
        }
        state.handler = Some((edge, handler));
        Ok(())
    }

    fn detach(&mut self) {
        let mut state = self.lock();
        if state.handler.take().is_some() {
            state.detached += 1;
        }
    }
}
