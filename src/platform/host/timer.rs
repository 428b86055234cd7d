//! Periodic timer signal

use crate::platform::error::SignalError;
use crate::platform::traits::{Edge, SignalHandler, SignalSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Ticker {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Signal source that fires every `period` from a timer thread
///
/// The edge passed to `attach` is ignored.
pub struct PeriodicSignal {
    period: Duration,
    ticker: Option<Ticker>,
}

impl PeriodicSignal {
    /// Create a detached timer
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    /// Timer period
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl SignalSource for PeriodicSignal {
    fn attach(&mut self, _edge: Edge, handler: SignalHandler) -> Result<(), SignalError> {
        if self.ticker.is_some() {
            return Err(SignalError::AlreadyAttached);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let period = self.period;
        let thread = thread::Builder::new()
            .name("periodic-signal".into())
            .spawn({
                let stop = Arc::clone(&stop);
                move || {
                    let mut next = Instant::now() + period;
                    loop {
                        // Sleep until the deadline or until detach unparks us.
                        while !stop.load(Ordering::SeqCst) {
                            let now = Instant::now();
                            if now >= next {
                                break;
                            }
                            thread::park_timeout(next - now);
                        }
                        if stop.load(Ordering::SeqCst) {
                            break;
                        }
                        handler();
                        next += period;
                    }
                }
            })
            .map_err(|_| SignalError::Unavailable)?;

        self.ticker = Some(Ticker { stop, thread });
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop.store(true, Ordering::SeqCst);
            ticker.thread.thread().unpark();
            if ticker.thread.join().is_err() {
                crate::log_error!("periodic signal handler panicked");
            }
        }
    }
}

impl Drop for PeriodicSignal {
    fn drop(&mut self) {
        self.detach();
    }
}
