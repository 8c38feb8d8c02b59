// src/util/log.rs

//! File-based logging. The chart owns the terminal, so nothing may be
//! printed to stdout/stderr while it runs; everything goes to `<log_dir>/*.log`.
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::{LazyLock, OnceLock};
use chrono::Local;

pub static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Global logger instance. `None` when the log directory could not be created,
/// in which case the macros silently drop messages.
pub static LOGGER: LazyLock<Option<Logger>> = LazyLock::new(|| {
    let dir = LOG_DIR.get().cloned().unwrap_or_else(|| PathBuf::from("./logs"));
    Logger::new(&dir).ok()
});

/// Point the global logger at `log_dir`. Only the first call wins, and it has
/// to happen before the first log line.
pub fn init(log_dir: impl AsRef<Path>) {
    let _ = LOG_DIR.set(log_dir.as_ref().to_path_buf());
    LazyLock::force(&LOGGER);
}

/// Subscriber for `tracing` events (ours plus reqwest/hyper), written to
/// `file` without colors. Debug level, so every poll cycle shows up.
pub fn trace_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish()
}

/// Log severity levels
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn filename(&self) -> &str {
        match self {
            LogLevel::Error => "error.log",
            LogLevel::Warn => "warn.log",
            LogLevel::Info => "info.log",
            LogLevel::Debug => "debug.log",
        }
    }
}

/// Logger that writes to separate files by severity
pub struct Logger {
    error_file: Mutex<File>,
    warn_file: Mutex<File>,
    info_file: Mutex<File>,
    debug_file: Mutex<File>,
}

impl Logger {
    /// Create a new logger with the specified directory
    pub fn new(log_dir: &Path) -> std::io::Result<Self> {
        DEBUG_ENABLED.get_or_init(|| {
            std::env::var("DEBUG").unwrap_or_default() == "true"
        });

        create_dir_all(log_dir)?;

        // start fresh each run
        let error_file = File::create(log_dir.join(LogLevel::Error.filename()))?;
        let warn_file = File::create(log_dir.join(LogLevel::Warn.filename()))?;
        let info_file = File::create(log_dir.join(LogLevel::Info.filename()))?;
        let debug_file = File::create(log_dir.join(LogLevel::Debug.filename()))?;

        Ok(Self {
            error_file: Mutex::new(error_file),
            warn_file: Mutex::new(warn_file),
            info_file: Mutex::new(info_file),
            debug_file: Mutex::new(debug_file),
        })
    }

    fn write_log(&self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let formatted = format!("[{}] [{}] {}\n", timestamp, level.as_str(), message);

        let file = match level {
            LogLevel::Error => &self.error_file,
            LogLevel::Warn => &self.warn_file,
            LogLevel::Info => &self.info_file,
            LogLevel::Debug => &self.debug_file,
        };

        if let Ok(mut file) = file.lock() {
            let _ = file.write_all(formatted.as_bytes());
            let _ = file.flush();
        }
    }

    pub fn error(&self, message: &str) {
        self.write_log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.write_log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.write_log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.write_log(LogLevel::Debug, message);
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::LOGGER.as_ref() {
            logger.error(&format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::LOGGER.as_ref() {
            logger.warn(&format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::LOGGER.as_ref() {
            logger.info(&format!($($arg)*));
        }
    }};
}

/// Only writes when `DEBUG=true` was set at startup.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if *$crate::util::log::DEBUG_ENABLED.get().unwrap_or(&false) {
            if let Some(logger) = $crate::util::log::LOGGER.as_ref() {
                logger.debug(&format!($($arg)*));
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_logger_creates_one_file_per_level() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(temp_dir.path()).expect("Failed to create logger");

        logger.error("Test error");
        logger.warn("Test warning");
        logger.info("Test info");
        logger.debug("Test debug");

        for name in ["error.log", "warn.log", "info.log", "debug.log"] {
            assert!(temp_dir.path().join(name).exists(), "{} missing", name);
        }
    }

    #[test]
    fn test_messages_land_in_their_level_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(temp_dir.path()).unwrap();

        logger.warn("fetch failed: connection refused");

        let warn = fs::read_to_string(temp_dir.path().join("warn.log")).unwrap();
        let error = fs::read_to_string(temp_dir.path().join("error.log")).unwrap();
        assert!(warn.contains("[WARN] fetch failed: connection refused"));
        assert!(error.is_empty());
    }

    #[test]
    fn test_trace_subscriber_keeps_debug_events() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("trace.log");
        let subscriber = trace_subscriber(File::create(&path).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(cycle = 3, "poll cycle finished");
            tracing::trace!("too chatty");
        });

        let trace = fs::read_to_string(&path).unwrap();
        assert!(trace.contains("poll cycle finished"));
        assert!(trace.contains("cycle=3"));
        assert!(!trace.contains("too chatty"));
    }
}
