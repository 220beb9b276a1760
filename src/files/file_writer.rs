//! Dated log files
//!
//! Files are named `<logs_dir>/<file_name>-<date>.log` and opened for append,
//! readable and writable by the owner only.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::config::{resolve_date_format, FileOptions, Zone};
use crate::error::{LogError, Result};

/// How dated log files are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileNaming {
    logs_dir: PathBuf,
    file_name: String,
    date_format: String,
    zone: Zone,
}

impl LogFileNaming {
    pub fn new(
        logs_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
        date_format: &str,
        zone: Zone,
    ) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            file_name: file_name.into(),
            date_format: resolve_date_format(date_format),
            zone,
        }
    }

    pub fn from_options(options: &FileOptions) -> Self {
        Self::new(
            options.logs_dir.clone(),
            options.file_name.clone(),
            &options.date_format,
            Zone::resolve(&options.timezone),
        )
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Path of the file that is active at `now`
    pub fn path_for(&self, now: DateTime<Utc>) -> PathBuf {
        let date = self.zone.convert(now).format(&self.date_format).to_string();
        self.logs_dir.join(format!("{}-{}.log", self.file_name, date))
    }

    /// Open (or create) the file that is active at `now`
    pub fn open(&self, now: DateTime<Utc>) -> Result<(PathBuf, File)> {
        let path = self.path_for(now);
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        match options.open(&path) {
            Ok(file) => Ok((path, file)),
            Err(source) => Err(LogError::OpenLogFile { path, source }),
        }
    }
}
