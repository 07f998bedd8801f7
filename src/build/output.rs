//! Process-lifetime output directory for build artifacts.

use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Temporary directory created on first use and removed on drop.
///
/// The first caller creates it; concurrent first callers serialize on a
/// lock and all observe the same path afterwards.
#[derive(Default)]
pub struct OutputDir {
    dir: OnceLock<TempDir>,
    init: Mutex<()>,
}

impl OutputDir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the directory, creating it if needed.
    pub fn ensure(&self) -> io::Result<&Path> {
        if let Some(dir) = self.dir.get() {
            return Ok(dir.path());
        }

        let _guard = self.init.lock();
        if let Some(dir) = self.dir.get() {
            return Ok(dir.path());
        }

        let created = tempfile::Builder::new().prefix("wasmserve-").tempdir()?;
        crate::debug!("build"; "output directory {}", created.path().display());
        Ok(self.dir.get_or_init(|| created).path())
    }
}
