//! Sidecar lock files.
//!
//! Tables and the profile are replaced by rename, so a lock taken on the
//! data file itself would be left behind on the old inode. Locks live on a
//! `<file>.lock` sidecar that is created once and never renamed.

use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// A held lock, released on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Take an exclusive lock for writing `path`
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = open_sidecar(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Take a shared lock for reading `path`
    pub fn shared(path: &Path) -> Result<Self> {
        let file = open_sidecar(path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release lock: {}", e);
        }
    }
}

/// Path of the lock file guarding `path`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_sidecar(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_path(path))?;
    Ok(file)
}
