//! Polling transport driver.
//!
//! The original deployment received uploads through a file-transport
//! callback; here a polling loop stands in at the same interface boundary.
//! Each scan lists the inbound directory through the visibility filter,
//! parses every newly observed file (rejecting anything that is not a
//! readable ACH file, like the upload gate in front of a real drop
//! directory), and runs one transform per file. Transforms for distinct
//! files run concurrently; they share no mutable state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ach;
use crate::core::file_transformer::FileTransformer;
use crate::io::listing;
use crate::io::writer::FileWriter;
use crate::types::ResponderError;

/// Watches the inbound directory and transforms new uploads.
pub struct Watcher<W> {
    transformer: Arc<FileTransformer<W>>,
    inbound: PathBuf,
    poll_interval: Duration,
}

impl<W: FileWriter + 'static> Watcher<W> {
    pub fn new(
        transformer: FileTransformer<W>,
        inbound: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Watcher {
            transformer: Arc::new(transformer),
            inbound: inbound.into(),
            poll_interval,
        }
    }

    /// Poll the inbound directory until the process exits.
    ///
    /// A failing transform is logged and the loop keeps serving other
    /// uploads; only a broken runtime ends the watch.
    pub fn run(&self) -> Result<(), ResponderError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(self.watch_loop());
        Ok(())
    }

    async fn watch_loop(&self) {
        info!(inbound = %self.inbound.display(), "watching for uploads");
        let mut seen = HashSet::new();
        loop {
            if let Err(err) = self.scan(&mut seen).await {
                warn!(error = %err, "listing inbound directory failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Process every not-yet-seen visible file, returning how many transforms
    /// were started.
    async fn scan(&self, seen: &mut HashSet<PathBuf>) -> Result<usize, ResponderError> {
        let files = listing::visible_files(&self.inbound)?;

        let mut handles = Vec::new();
        for file in files {
            if !seen.insert(file.path.clone()) {
                continue;
            }
            info!(path = %file.path.display(), bytes = file.len, "received file");
            let transformer = Arc::clone(&self.transformer);
            let path = file.path.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                process_upload(&transformer, &path)
            }));
        }

        let started = handles.len();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "transform failed"),
                Err(err) => warn!(error = %err, "transform task failed"),
            }
        }
        Ok(started)
    }
}

/// Read, gate, and transform one uploaded file.
fn process_upload<W: FileWriter>(
    transformer: &FileTransformer<W>,
    path: &Path,
) -> Result<(), ResponderError> {
    let bytes = fs::read(path)?;
    let file = ach::read(&bytes)?;
    file.validate()?;
    transformer.transform(&file)
}
