//! Runtime core
//!
//! Logging macros and the deferred-work machinery shared by all
//! interrupt-driven drivers.

pub mod dispatch;
pub mod logging;
pub mod workqueue;

pub use dispatch::InterruptDispatcher;
pub use workqueue::{WorkHandle, WorkQueue, WorkState, WorkStats};
