//! File collection: walks a root directory and gathers every regular file
//! reachable from it into in-memory entries for a single multipart upload.
//!
//! The walk is depth-first in directory-listing order. Directories are only
//! recursed into, never emitted as entries. Symlink and cycle handling is
//! whatever `std::fs` does; the walk is not guarded against either. Any
//! filesystem error (listing, stat, read) aborts the whole collection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// One regular file staged for upload: its path as encountered during the
/// walk, plus its full contents. Created during collection, consumed once by
/// the upload call, then dropped.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Collects every regular file under `root` into a flat list of entries.
///
/// Returns exactly one entry per regular file; an empty directory tree yields
/// an empty list. Errors carry the offending path as context.
pub fn collect_files<P: AsRef<Path>>(root: P) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    walk(root.as_ref(), &mut entries)?;
    debug!(count = entries.len(), "file collection complete");
    Ok(entries)
}

fn walk(dir: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
    let listing =
        fs::read_dir(dir).with_context(|| format!("failed to list directory {dir:?}"))?;
    for dirent in listing {
        let dirent = dirent.with_context(|| format!("failed to read entry in {dir:?}"))?;
        let path = dirent.path();
        let metadata = fs::metadata(&path).with_context(|| format!("failed to stat {path:?}"))?;
        if metadata.is_dir() {
            walk(&path, entries)?;
        } else {
            let bytes =
                fs::read(&path).with_context(|| format!("failed to read file {path:?}"))?;
            debug!(path = ?path, size = bytes.len(), "collected file");
            entries.push(FileEntry { path, bytes });
        }
    }
    Ok(())
}
