//! Diagnostic log sink.
//!
//! The parser reports what it is doing through the `log` facade: `trace!`
//! on every rule entry and `debug!` whenever scope-close debt moves.
//! [`FileLogger`] collects those records into a file. The file is opened on
//! the first record; if that fails the problem is reported once on stderr
//! and later records are dropped. Logging never changes what gets parsed.

use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct FileLogger {
    path: PathBuf,
    level: LevelFilter,
    file: OnceLock<Option<Mutex<File>>>,
}

impl FileLogger {
    pub fn new(path: impl Into<PathBuf>, level: LevelFilter) -> Self {
        FileLogger {
            path: path.into(),
            level,
            file: OnceLock::new(),
        }
    }

    /// The open log file, opening it on first use.
    fn sink(&self) -> Option<&Mutex<File>> {
        self.file
            .get_or_init(|| match File::create(&self.path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(err) => {
                    eprintln!("Error opening log file {}: {}", self.path.display(), err);
                    None
                }
            })
            .as_ref()
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let Some(sink) = self.sink() else {
            return;
        };

        if let Ok(mut file) = sink.lock() {
            let _ = writeln!(file, "[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        if let Some(Some(sink)) = self.file.get() {
            if let Ok(mut file) = sink.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Installs a [`FileLogger`] writing to `path` as the global logger.
pub fn init(path: impl Into<PathBuf>, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(FileLogger::new(path, level)))?;
    log::set_max_level(level);
    Ok(())
}
