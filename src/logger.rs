//! Per-run log file for the `housepaint` binary.
//!
//! [`init`] truncates the file named by [`AppSettings::log_file`] (by default
//! `housepaint.log` beside the saved pictures store) and writes a header with
//! the store location and the active paint settings. Library code logs through
//! `log_info!` / `log_warn!` / `log_err!`; until `init` runs those are no-ops,
//! so tests and embedders never touch the filesystem.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::settings::AppSettings;
use crate::store::{format_date, unix_seconds};

static SESSION_LOG: OnceLock<Mutex<File>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Append one tagged line. Dropped before [`init`] and on I/O errors.
pub fn write(level: Level, msg: &str) {
    let Some(log) = SESSION_LOG.get() else { return };
    if let Ok(mut file) = log.lock() {
        let _ = writeln!(file, "{}", format_line(level, unix_seconds(), msg));
    }
}

/// `[HH:MM:SS] [LEVEL] msg`, UTC.
fn format_line(level: Level, secs: u64, msg: &str) -> String {
    format!(
        "[{:02}:{:02}:{:02}] [{}] {}",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
        level.tag(),
        msg
    )
}

fn header(settings: &AppSettings, secs: u64) -> String {
    format!(
        "=== housepaint {} run {} ===\n\
         store: {}\n\
         tolerance={} max_undo_steps={} thumbnail={}px@q{}\n",
        env!("CARGO_PKG_VERSION"),
        format_date(secs),
        settings.store_file().display(),
        settings.tolerance,
        settings.max_undo_steps,
        settings.thumbnail_max_size,
        settings.thumbnail_quality,
    )
}

fn open_truncated(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

/// Start the run log and mirror panics into it.
///
/// Returns the log path, or `None` when the file could not be opened (the
/// run continues without a log).
pub fn init(settings: &AppSettings) -> Option<PathBuf> {
    let path = settings.log_file();
    let mut file = match open_truncated(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: no log file at {}: {}", path.display(), e);
            return None;
        }
    };
    let _ = writeln!(file, "{}", header(settings, unix_seconds()));
    SESSION_LOG.set(Mutex::new(file)).ok()?;

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        prev(info);
    }));
    Some(path)
}
