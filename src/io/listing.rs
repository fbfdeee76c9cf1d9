//! Directory listing with the delayed-visibility filter.
//!
//! An entry whose modification time is strictly after "now" at call time is
//! suppressed from the listing. Combined with the future-dating writer this
//! produces the appearance of settlement lag without any scheduler: a delayed
//! response simply stays hidden until the clock catches up with its mtime.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata for one visible file in a listing.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub len: u64,
    pub modified: SystemTime,
}

/// List the plain files in `dir` whose modification time is not in the
/// future, sorted by path for deterministic iteration.
///
/// A missing directory lists as empty rather than erroring, so pollers can
/// start before the first upload creates it.
pub fn visible_files(dir: &Path) -> io::Result<Vec<FileInfo>> {
    let now = SystemTime::now();
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if modified > now {
            continue; // future-dated: not visible yet
        }
        files.push(FileInfo {
            path: entry.path(),
            len: metadata.len(),
            modified,
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
