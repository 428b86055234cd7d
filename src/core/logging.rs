//! Logging abstraction
//!
//! Provides unified logging macros for drivers. All macros forward to the
//! `log` facade, so the host application picks the backend (env_logger,
//! syslog, journald, ...). Without a backend installed the macros are no-ops.
//!
//! Messages are prefixed with the sensor name by convention:
//!
//! ```
//! i2c_sensors::log_info!("STTS22H: bound {:#04x} on bus {}", 0x3C, 2);
//! ```

#[doc(hidden)]
pub use log as __log;

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::info!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::warn!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::error!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::debug!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::trace!($($arg)*);
    }};
}
