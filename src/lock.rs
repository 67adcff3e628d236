use crate::error::{Error, Result};

use std::{
    fs::File,
    io::{ErrorKind, Write},
    ops::{Deref, DerefMut},
};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

/// Exclusive write access to a file through a sibling `<name>.lock` file.
///
/// Writes go to the lock file; [`LockedFile::commit`] renames it over the guarded path so
/// readers see either the old contents or the new ones. Dropping without committing discards
/// the write and releases the lock.
pub struct LockedFile {
    guarded_path: Utf8PathBuf,
    lock_path: Utf8PathBuf,
    lockfile: File,
    committed: bool,
}

impl Deref for LockedFile {
    type Target = File;

    fn deref(&self) -> &Self::Target {
        &self.lockfile
    }
}

impl DerefMut for LockedFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.lockfile
    }
}

impl LockedFile {
    /// Returns `Ok(None)` if someone else holds the lock.
    pub fn try_acquire(path: impl AsRef<Utf8Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let lock_path = path.with_file_name(format!("{file_name}.lock"));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match File::options()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e.into()),
            Ok(lockfile) => Ok(Some(Self {
                guarded_path: path.to_owned(),
                lock_path,
                lockfile,
                committed: false,
            })),
        }
    }

    /// Like [`LockedFile::try_acquire`], but a held lock is an error.
    pub fn acquire(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::try_acquire(path)?.ok_or_else(|| Error::Locked(format!("{path}.lock")))
    }

    /// Flush the new contents and move them into place.
    pub fn commit(mut self) -> Result<()> {
        self.lockfile.flush()?;
        self.lockfile.sync_all()?;
        std::fs::rename(&self.lock_path, &self.guarded_path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(error) = std::fs::remove_file(&self.lock_path) {
                warn!(path=%self.lock_path, %error, "Failed to remove abandoned lock file");
            }
        }
    }
}
