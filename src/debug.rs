use parking_lot::Mutex;
/// Debug log file for tab-grid
///
/// Controlled by the TAB_GRID_DEBUG_LEVEL environment variable (a number or a
/// level name):
/// - 0 / off or unset: No debugging
/// - 1 / error: Errors only
/// - 2 / info: Lifecycle events (resets, dialog transitions, cleanups)
/// - 3 / debug: Every handled collection event
/// - 4 / trace: Card-level property churn
///
/// Output goes to `tab_grid_debug.log` in the system temp directory so the
/// replay CLI's stdout stays machine-readable.
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tab_grid_config::LogLevel;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        match std::env::var("TAB_GRID_DEBUG_LEVEL") {
            Ok(val) => Self::parse(val.trim()).unwrap_or(DebugLevel::Off),
            Err(_) => DebugLevel::Off,
        }
    }

    fn parse(val: &str) -> Option<Self> {
        match val.parse::<u8>() {
            Ok(0) => Some(DebugLevel::Off),
            Ok(1) => Some(DebugLevel::Error),
            Ok(2) => Some(DebugLevel::Info),
            Ok(3) => Some(DebugLevel::Debug),
            Ok(4) => Some(DebugLevel::Trace),
            Ok(_) => None,
            Err(_) => LogLevel::from_name(val).map(Self::from),
        }
    }

    fn label(self) -> &'static str {
        match self {
            DebugLevel::Off => "OFF  ",
            DebugLevel::Error => "ERROR",
            DebugLevel::Info => "INFO ",
            DebugLevel::Debug => "DEBUG",
            DebugLevel::Trace => "TRACE",
        }
    }
}

impl From<LogLevel> for DebugLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => DebugLevel::Off,
            LogLevel::Error | LogLevel::Warn => DebugLevel::Error,
            LogLevel::Info => DebugLevel::Info,
            LogLevel::Debug => DebugLevel::Debug,
            LogLevel::Trace => DebugLevel::Trace,
        }
    }
}

impl From<log::Level> for DebugLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => DebugLevel::Error,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        }
    }
}

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("tab_grid_debug.log")
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new() -> Self {
        let mut logger = DebugLogger {
            level: DebugLevel::Off,
            file: None,
        };
        logger.set_level(DebugLevel::from_env());
        logger
    }

    /// Change the level, opening the log file the first time it is enabled
    fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
        if level == DebugLevel::Off || self.file.is_some() {
            return;
        }

        // A log file that cannot be opened disables file output silently.
        if let Ok(f) = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            self.file = Some(f);
            self.write_raw(&format!(
                "\n{}\ntab-grid debug session started at {} (level={:?})\n{}\n",
                "=".repeat(80),
                get_timestamp(),
                level,
                "=".repeat(80)
            ));
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level == DebugLevel::Off || level > self.level {
            return;
        }
        let timestamp = get_timestamp();
        self.write_raw(&format!(
            "[{}] [{}] [{}] {}\n",
            timestamp,
            level.label(),
            category,
            msg
        ));
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new()))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

// ============================================================================
// `log` crate bridge
// ============================================================================

/// Routes `log::info!()` and friends into the debug log file.
struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let category = record
            .target()
            .rsplit("::")
            .next()
            .unwrap_or("log")
            .to_uppercase();
        log(
            DebugLevel::from(record.level()),
            &category,
            &record.args().to_string(),
        );
    }

    fn flush(&self) {}
}

static BRIDGE: LogBridge = LogBridge;

/// Install the `log` bridge.
///
/// `level` (from the CLI or the config file) takes precedence over the
/// TAB_GRID_DEBUG_LEVEL environment variable. Calling this more than once only
/// updates the level.
pub fn init_log_bridge(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => {
            get_logger().lock().set_level(DebugLevel::from(level));
            level.to_level_filter()
        }
        None => match get_logger().lock().level {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        },
    };

    // set_logger fails when a logger is already installed; the level still applies.
    let _ = log::set_logger(&BRIDGE);
    log::set_max_level(filter);
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
