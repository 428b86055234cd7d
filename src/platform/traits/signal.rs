//! Signal source trait
//!
//! A signal source is an interrupt-like event producer (a GPIO edge, a timer)
//! that invokes a handler from a context that must not block.

use crate::platform::error::SignalError;

/// Handler invoked for every signal
///
/// Runs in interrupt-like context: it must not block, sleep or touch a bus.
pub type SignalHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Edge polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
}

/// Signal source trait
///
/// # Invariants
///
/// - At most one handler is attached at a time
/// - After `detach` returns, the handler is never invoked again
pub trait SignalSource {
    /// Attach `handler`, triggered on `edge`
    ///
    /// # Errors
    ///
    /// Returns `SignalError::AlreadyAttached` if a handler is already attached,
    /// or `SignalError::Unavailable` if the source cannot be enabled.
    fn attach(&mut self, edge: Edge, handler: SignalHandler) -> Result<(), SignalError>;

    /// Disable the source and drop the handler
    ///
    /// Detaching a source with no handler is a no-op.
    fn detach(&mut self);
}
