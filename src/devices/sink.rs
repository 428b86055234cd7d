//! Sample delivery
//!
//! Interrupt-driven drivers hand every decoded sample to a [`SampleSink`] from
//! their work queue thread.

use std::fmt::Display;
use std::sync::mpsc::{Sender, SyncSender, TrySendError};

/// Consumer of decoded samples
pub trait SampleSink<T>: Send + 'static {
    /// Deliver one sample; must not block for long
    fn report(&mut self, sample: T);
}

impl<T: Send + 'static> SampleSink<T> for Sender<T> {
    fn report(&mut self, sample: T) {
        // A hung-up receiver means nobody is listening any more.
        let _ = self.send(sample);
    }
}

impl<T: Send + 'static> SampleSink<T> for SyncSender<T> {
    fn report(&mut self, sample: T) {
        if let Err(TrySendError::Full(_)) = self.try_send(sample) {
            crate::log_warn!("sample dropped: sink full");
        }
    }
}

/// Sink that writes every sample to the log at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl<T: Display + Send + 'static> SampleSink<T> for LogSink {
    fn report(&mut self, sample: T) {
        crate::log_info!("{}", sample);
    }
}
