//! Logger utility for application-wide logging
//!
//! A `log::Log` implementation that prints records to stderr and can
//! mirror them into a log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

/// Custom logger implementation
pub struct Logger {
    /// Optional file receiving a copy of every record
    file: Mutex<Option<File>>,
    /// Most verbose level that is emitted
    level: LevelFilter,
}

impl Logger {
    /// Creates a new logger instance
    ///
    /// # Arguments
    ///
    /// * `log_file` - Optional path of a file to mirror records into
    /// * `level` - Most verbose level to emit
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new(log_file: Option<&str>, level: LevelFilter) -> io::Result<Self> {
        let file = match log_file {
            Some(path) => Some(File::create(Path::new(path))?),
            None => None,
        };
        Ok(Logger {
            file: Mutex::new(file),
            level,
        })
    }

    /// Appends a line to the log file, if one is configured
    pub fn log_to_file(&self, message: &str) -> io::Result<()> {
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Static method to initialize the global logger
    ///
    /// Only the first call installs a logger; later calls leave it in place.
    pub fn init_global_logger(log_file: Option<&str>, level: LevelFilter) -> io::Result<()> {
        let global_logger = Logger::new(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
            return Ok(());
        }

        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.log_to_file(&message);

            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        // log_to_file flushes after every record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn records_above_the_level_are_filtered() {
        let logger = Logger::new(None, LevelFilter::Info).unwrap();
        let info = Metadata::builder().level(Level::Info).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn records_are_mirrored_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volcrop.log");
        let path_str = path.to_string_lossy().into_owned();
        let logger = Logger::new(Some(&path_str), LevelFilter::Debug).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("slice {} skipped", 3))
                .build(),
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[WARN] slice 3 skipped\n");
    }
}
