//! Logging abstraction
//!
//! Provides the unified logging macros used across the crate:
//! `log_error!`, `log_warn!`, `log_info!`, `log_debug!` and `log_trace!`.
//! They forward to the `log` facade with the crate as target, so the
//! library never decides where output goes. The `sensord` binary installs
//! `env_logger`; tests and embedding applications install whatever they
//! like, or nothing.

#[doc(hidden)]
pub use log as __log;

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::core::logging::__log::info!($($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::core::logging::__log::warn!($($arg)*)
    };
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::core::logging::__log::error!($($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::core::logging::__log::debug!($($arg)*)
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::core::logging::__log::trace!($($arg)*)
    };
}
