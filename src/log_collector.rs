//! Logging sink for fixup runs.
//!
//! `LogCollector` implements `log::Log` so every `log::info!()` / `log::debug!()`
//! in the pipeline ends up on stderr and, when configured, appended to a log file:
//!
//! ```text
//! 14:02:11.348 INFO  [svm_fixup::kernel::parser] [Discover] Detected kernel: vector_add
//! ```

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::config::FixupConfig;

/// A formatted log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub timestamp: String,
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

impl LogLine {
    pub fn new(level: log::Level, target: &str, message: String) -> Self {
        LogLine {
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
            level,
            target: target.to_string(),
            message,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} {:<5} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Stderr logger with an optional append-only file copy
pub struct LogCollector {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl LogCollector {
    /// Create a collector at the given level, appending to `log_file` if given.
    pub fn new(level: LevelFilter, log_file: Option<&Path>) -> std::io::Result<Self> {
        let file = match log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let handle = OpenOptions::new().create(true).append(true).open(path)?;
                Some(Mutex::new(handle))
            }
            None => None,
        };

        Ok(LogCollector { level, file })
    }

    /// Level implied by the run configuration
    pub fn level_for(config: &FixupConfig) -> LevelFilter {
        if config.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Install as the global logger for the `log` crate.
    ///
    /// A second install in the same process (tests, embedding) is reported and ignored.
    pub fn install(config: &FixupConfig) -> std::io::Result<()> {
        let level = Self::level_for(config);
        let collector = LogCollector::new(level, config.log_file.as_deref())?;
        if let Err(e) = log::set_boxed_logger(Box::new(collector)) {
            eprintln!("[Log] Logger already installed: {}", e);
            return Ok(());
        }
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = LogLine::new(record.level(), record.target(), record.args().to_string());
        let rendered = line.render();
        eprintln!("{}", rendered);

        if let Some(file) = &self.file {
            if let Ok(mut handle) = file.lock() {
                let _ = writeln!(handle, "{}", rendered);
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut handle) = file.lock() {
                let _ = handle.flush();
            }
        }
    }
}
