//! Output writing with delayed visibility.
//!
//! The writer persists response bytes and, for delayed actions, pushes the
//! stored file's modification time into the future by exactly the configured
//! delay. The listing filter in [`crate::io::listing`] hides future-dated
//! files, so a delayed response stays invisible to polling clients until its
//! delay elapses. There is no scheduler; visibility is purely a stored-mtime
//! versus wall-clock comparison.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;

use crate::ach::{self, File as AchFile};
use crate::types::rule::Delay;
use crate::types::ResponderError;

/// Writes output bytes to storage, optionally future-dating them.
pub trait FileWriter: Send + Sync {
    /// Write raw bytes to `path`. A non-nil `delay` future-dates the stored
    /// object's modification time by exactly that duration.
    fn write(&self, path: &Path, contents: &[u8], delay: Option<Delay>) -> Result<(), ResponderError>;

    /// Serialize and write an ACH file.
    fn write_file(
        &self,
        path: &Path,
        file: &AchFile,
        delay: Option<Delay>,
    ) -> Result<(), ResponderError> {
        let bytes = ach::write(file)?;
        info!(path = %path.display(), bytes = bytes.len(), "writing response file");
        self.write(path, &bytes, delay)
    }
}

/// Filesystem-backed writer rooted at the storage directory.
#[derive(Debug, Clone)]
pub struct FsFileWriter {
    root: PathBuf,
}

impl FsFileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsFileWriter { root: root.into() }
    }

    /// The storage root all written paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileWriter for FsFileWriter {
    fn write(&self, path: &Path, contents: &[u8], delay: Option<Delay>) -> Result<(), ResponderError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|source| ResponderError::write(parent, source))?;
        }
        fs::write(&full, contents).map_err(|source| ResponderError::write(&full, source))?;

        if let Some(delay) = delay {
            let file = fs::File::options()
                .write(true)
                .open(&full)
                .map_err(|source| ResponderError::write(&full, source))?;
            file.set_modified(SystemTime::now() + delay.as_duration())
                .map_err(|source| ResponderError::write(&full, source))?;
        }
        Ok(())
    }
}
