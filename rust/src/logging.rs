//! Logging macros with verbosity level control.
//!
//! Events go through `tracing`; installing a subscriber is left to the caller.
//! Nothing is emitted below the requested verbosity.
//! - 0: SILENT
//! - 1: CHANGES (pass summaries, results)
//! - 2: CHECKS (per-task decisions)
//! - 3: DEBUG (per-edge algorithm internals)

#[doc(hidden)]
pub use tracing as __tracing;

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1) as a `tracing` info event.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            $crate::logging::__tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2) as a `tracing` debug event.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            $crate::logging::__tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3) as a `tracing` trace event.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            $crate::logging::__tracing::trace!($($arg)*);
        }
    };
}
