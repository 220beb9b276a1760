//! Log file naming, opening and retention
//!
//! Provides dated log files for the active output and the sweeper that bounds
//! how many old files stay on disk.

mod file_writer;
mod retention;

use std::path::Path;

pub use file_writer::LogFileNaming;
pub use retention::{sweep, RemovedEntry};

/// Whether `dir` can be treated as an existing directory
///
/// Only a definite "not found" counts as missing; other errors are left for
/// the file open to report.
pub fn dir_exists(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}
