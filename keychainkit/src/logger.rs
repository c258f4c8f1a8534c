//! Bridge from the `log` crate to a host-provided logger.

use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can log messages at various levels.
///
/// Implement it to receive the log output of keychain operations. With the
/// `ffi` feature it is exported via `UniFFI` so the host application can route
/// messages into its own logging system.
///
/// Messages name the operation, the item class, the status and the query keys.
/// They never contain account names or secret values.
///
/// # Examples
///
/// ```rust
/// use keychainkit::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// class KeychainKitLoggerBridge: KeychainKit.Logger {
///     static let shared = KeychainKitLoggerBridge()
///
///     func log(level: KeychainKit.LogLevel, message: String) {
///         Log.log(level.toCoreLevel(), message)
///     }
/// }
///
/// KeychainKit.setLogger(logger: KeychainKitLoggerBridge.shared) // once, at launch
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Designates very low priority, often extremely detailed messages.
    Trace,
    /// Designates lower priority debugging information, such as dispatched query keys.
    Debug,
    /// Designates informational messages.
    Info,
    /// Designates failures that were absorbed, such as a soft-failed keychain read.
    Warn,
    /// Designates error events.
    Error,
}

/// Forwards `log` records to the registered [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // Debug and Trace output of other crates is dropped.
        if !forwards(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Whether a record at `level` from `module_path` reaches the foreign logger.
fn forwards(level: log::Level, module_path: Option<&str>) -> bool {
    let is_record_from_keychainkit =
        module_path.is_some_and(|module_path| module_path.starts_with("keychainkit"));
    let is_debug_or_trace_level = level == log::Level::Debug || level == log::Level::Trace;
    !is_debug_or_trace_level || is_record_from_keychainkit
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Should be called once, before any keychain operation. Later calls keep the
/// first logger and print a notice.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        println!("Logger already set");
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
