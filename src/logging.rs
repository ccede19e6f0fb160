//! File-based structured logger.
//!
//! Implements `log::Log` directly, the same way the teacher's tag-based
//! logger does, but routes every record to a single append-mode file
//! instead of fanning records out over UDP. Each line is formatted as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`.

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

pub struct FileLogger {
    file: Mutex<File>,
    level_filter: LevelFilter,
}

impl FileLogger {
    fn open(path: &str, level_filter: LevelFilter) -> std::io::Result<FileLogger> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileLogger { file: Mutex::new(file), level_filter })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] [{}] {}\n", timestamp, record.level(), record.args());

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Initializes logging for the process.
///
/// Tries to install a [`FileLogger`] writing to `path` first; if the file
/// cannot be opened (permissions, missing directory, ...) falls back to
/// `env_logger` on stderr so the proxy still has *some* observability
/// rather than silently running unlogged.
pub fn init(path: &str) {
    match FileLogger::open(path, LevelFilter::Info) {
        Ok(logger) => {
            let boxed: Box<dyn Log> = Box::new(logger);
            if log::set_boxed_logger(boxed).is_ok() {
                log::set_max_level(LevelFilter::Info);
                return;
            }
            eprintln!("logging: a logger was already installed");
        }
        Err(e) => {
            eprintln!("logging: failed to open {path:?}: {e}, falling back to env_logger");
        }
    }

    std::env::set_var("RUST_LOG", std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    env_logger::init();
}
