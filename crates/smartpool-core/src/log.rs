//! Leveled stderr logging for pool diagnostics.
//!
//! The pool is silent by default: the level gate sits at `Warn` and the
//! runtime emits its resize/shutdown diagnostics at `Debug` and `Trace`.
//! Raise `SP_LOG_LEVEL` to watch the monitor work.
//!
//! # Environment Variables
//!
//! - `SP_LOG_LEVEL=<level>` - 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace
//! - `SP_FLUSH_LOG=1` - flush stderr after each record
//!
//! # Usage
//!
//! ```ignore
//! use smartpool_core::{sp_warn, sp_debug};
//!
//! sp_warn!("failed to spawn worker: {}", err);
//! sp_debug!("monitor: growing pool {} -> {}", from, to);
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log levels, most severe first
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[smartpool error]",
            LogLevel::Warn => "[smartpool warn ]",
            LogLevel::Info => "[smartpool info ]",
            LogLevel::Debug => "[smartpool debug]",
            LogLevel::Trace => "[smartpool trace]",
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static FLUSH_LOG: AtomicBool = AtomicBool::new(false);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the log gate from the environment.
///
/// Runs automatically on the first record; calling again is a no-op.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let level: u8 = crate::env::env_get("SP_LOG_LEVEL", LogLevel::Warn as u8);
    LOG_LEVEL.store(LogLevel::from_u8(level) as u8, Ordering::Relaxed);
    FLUSH_LOG.store(crate::env::env_get_bool("SP_FLUSH_LOG", false), Ordering::Relaxed);
}

/// Override the log level, ignoring the environment
pub fn set_log_level(level: LogLevel) {
    INITIALIZED.store(true, Ordering::SeqCst);
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Whether a record at `level` would be emitted
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    level as u8 <= LOG_LEVEL.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn write_record(level: LogLevel, args: core::fmt::Arguments<'_>) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "{} {}", level.prefix(), args);
    if FLUSH_LOG.load(Ordering::Relaxed) {
        let _ = out.flush();
    }
}

#[macro_export]
macro_rules! sp_log {
    ($level:expr, $($arg:tt)*) => {
        if $crate::log::enabled($level) {
            $crate::log::write_record($level, format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! sp_error {
    ($($arg:tt)*) => { $crate::sp_log!($crate::log::LogLevel::Error, $($arg)*) };
}

#[macro_export]
macro_rules! sp_warn {
    ($($arg:tt)*) => { $crate::sp_log!($crate::log::LogLevel::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! sp_info {
    ($($arg:tt)*) => { $crate::sp_log!($crate::log::LogLevel::Info, $($arg)*) };
}

#[macro_export]
macro_rules! sp_debug {
    ($($arg:tt)*) => { $crate::sp_log!($crate::log::LogLevel::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! sp_trace {
    ($($arg:tt)*) => { $crate::sp_log!($crate::log::LogLevel::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        assert_eq!(LogLevel::from_u8(0), LogLevel::Off);
        assert_eq!(LogLevel::from_u8(2), LogLevel::Warn);
        assert_eq!(LogLevel::from_u8(5), LogLevel::Trace);
        assert_eq!(LogLevel::from_u8(200), LogLevel::Trace);
    }

    #[test]
    fn test_gate_respects_level() {
        set_log_level(LogLevel::Warn);
        assert!(enabled(LogLevel::Error));
        assert!(enabled(LogLevel::Warn));
        assert!(!enabled(LogLevel::Debug));

        set_log_level(LogLevel::Trace);
        assert!(enabled(LogLevel::Trace));

        set_log_level(LogLevel::Off);
        assert!(!enabled(LogLevel::Error));

        // restore the default so other tests are unaffected
        set_log_level(LogLevel::Warn);
    }
}
