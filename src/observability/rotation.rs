//! Daily rotating log files.
//!
//! # Responsibilities
//! - Write lines to `<dir>/YYYY-MM-DD.log`, one file per calendar day (UTC)
//! - Open a new file on the first write after a day boundary
//! - Prune files older than the retention window when rotating
//!
//! # Design Decisions
//! - Retention is a pure function of (today, file dates, window) so it can be tested without a disk
//! - Files whose names do not parse as a date are never touched
//! - Runs on the non-blocking writer thread, never on a request task

use chrono::{NaiveDate, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";
const EXTENSION: &str = "log";

/// Source of the current calendar day.
pub type Clock = Box<dyn Fn() -> NaiveDate + Send>;

/// File name for the given day.
pub fn file_name_for(date: NaiveDate) -> String {
    format!("{}.{}", date.format(DATE_FORMAT), EXTENSION)
}

/// Parse a log file name back into its date.
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".log")?;
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

/// Select the files that fall outside the retention window.
///
/// A file dated `d` is kept while `today - d <= retention_days`.
pub fn expired_files<'a>(
    today: NaiveDate,
    files: &'a [(NaiveDate, PathBuf)],
    retention_days: u32,
) -> Vec<&'a Path> {
    files
        .iter()
        .filter(|(date, _)| (today - *date).num_days() > i64::from(retention_days))
        .map(|(_, path)| path.as_path())
        .collect()
}

/// A log file that rolls over once per day.
pub struct DailyRollingFile {
    dir: PathBuf,
    retention_days: u32,
    clock: Clock,
    current: Option<(NaiveDate, File)>,
}

impl DailyRollingFile {
    /// Create the destination, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, retention_days: u32) -> io::Result<Self> {
        Self::with_clock(dir, retention_days, Box::new(|| Utc::now().date_naive()))
    }

    /// Create the destination with an explicit day source.
    pub fn with_clock(
        dir: impl Into<PathBuf>,
        retention_days: u32,
        clock: Clock,
    ) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            retention_days,
            clock,
            current: None,
        })
    }

    /// Path of the file currently being written, if any.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current
            .as_ref()
            .map(|(date, _)| self.dir.join(file_name_for(*date)))
    }

    fn file_for_today(&mut self) -> io::Result<&mut File> {
        let today = (self.clock)();
        let stale = match &self.current {
            Some((date, _)) => *date != today,
            None => true,
        };

        if stale {
            let path = self.dir.join(file_name_for(today));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            self.current = Some((today, file));
            if let Err(e) = self.prune(today) {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Log retention pass failed");
            }
        }

        match self.current.as_mut() {
            Some((_, file)) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }

    /// Delete dated files older than the retention window.
    ///
    /// A file that cannot be removed is logged and skipped; the count only
    /// includes files actually deleted.
    pub fn prune(&self, today: NaiveDate) -> io::Result<usize> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(date_from_file_name) {
                files.push((date, entry.path()));
            }
        }

        let mut removed = 0;
        for path in expired_files(today, &files, self.retention_days) {
            match fs::remove_file(path) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(path = %path.display(), "Pruned expired log file");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to prune log file");
                }
            }
        }
        Ok(removed)
    }
}

impl Write for DailyRollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_for_today()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file_for_today()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.current.as_mut() {
            Some((_, file)) => file.flush(),
            None => Ok(()),
        }
    }
}
