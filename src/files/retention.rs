//! Log file retention management
//!
//! Keeps the newest entries of the log directory and deletes the rest.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{LogError, Result};

/// An entry deleted by [`sweep`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

struct Candidate {
    path: PathBuf,
    name: std::ffi::OsString,
    modified: Option<SystemTime>,
    is_dir: bool,
}

/// Delete everything in `dir` except the `keep` most recently modified entries
///
/// Directories are removed recursively. A `keep` of zero means no limit.
/// Entries whose modification time cannot be read count as the oldest.
/// The first failed deletion stops the sweep; entries already removed stay
/// removed.
pub fn sweep(dir: &Path, keep: usize) -> Result<Vec<RemovedEntry>> {
    if keep == 0 {
        return Ok(Vec::new());
    }

    let read_err = |source| LogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let metadata = entry.metadata().ok();
        candidates.push(Candidate {
            path: entry.path(),
            name: entry.file_name(),
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            is_dir: entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
        });
    }

    if candidates.len() <= keep {
        return Ok(Vec::new());
    }

    // Newest first; names break ties
    candidates.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut removed = Vec::new();
    for candidate in candidates.split_off(keep) {
        let result = if candidate.is_dir {
            fs::remove_dir_all(&candidate.path)
        } else {
            fs::remove_file(&candidate.path)
        };
        if let Err(source) = result {
            return Err(LogError::Remove {
                path: candidate.path,
                source,
            });
        }
        removed.push(RemovedEntry {
            path: candidate.path,
            is_dir: candidate.is_dir,
        });
    }

    Ok(removed)
}
