//! Filesystem layout and file helpers for backing stores.
//!
//! A backing store lives in a caller-supplied storage directory and is
//! addressed by a storage key. This module maps `(directory, relative path)`
//! pairs to absolute paths and provides the small set of file operations the
//! store layer needs:
//!
//! - [`write_atomic`]: write-then-rename so a reader never observes a
//!   partially written backing store.
//! - [`open_read`]: open a file for reading, classifying "not found"
//!   separately from other I/O failures.
//! - [`exists`]: whether a file is present.
//!
//! Only the local filesystem is supported. The [`StoreLocation`] enum keeps
//! the door open for other backends without touching the store layer.

mod error;

pub use error::StorageError;
pub(crate) use error::{NotFoundSnafu, OtherIoSnafu};

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use snafu::prelude::*;

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Represents the storage directory that holds backing stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
    /// A storage directory on the local filesystem.
    Local(PathBuf),
}

impl StoreLocation {
    /// Creates a new `StoreLocation` for a local filesystem directory.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        StoreLocation::Local(root.into())
    }

    /// Resolve a path relative to this location into an absolute local path.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        match self {
            StoreLocation::Local(root) => root.join(rel),
        }
    }
}

fn create_parent_dir(abs: &Path) -> StorageResult<()> {
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent)
            .context(OtherIoSnafu {
                path: parent.display().to_string(),
            })?;
    }
    Ok(())
}

/// Guard that removes a temporary file on drop unless disarmed.
/// Used to ensure cleanup on error paths during atomic writes.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Disarm the guard so the file is NOT removed on drop.
    /// Call this after a successful rename.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best-effort cleanup; we are already on an error path.
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Write `contents` to `rel_path` inside `location` using an atomic write.
///
/// The payload goes to a temporary sibling file which is synced and then
/// renamed over the target, so the target is either absent, the previous
/// version, or the complete new version. Parent directories are created as
/// needed.
///
/// # Errors
///
/// Returns [`StorageError::OtherIo`] when any filesystem operation fails.
pub fn write_atomic(location: &StoreLocation, rel_path: &Path, contents: &[u8]) -> StorageResult<()> {
    let abs = location.resolve(rel_path);
    create_parent_dir(&abs)?;

    let tmp_path = abs.with_extension("tmp");
    let mut guard = TempFileGuard::new(tmp_path.clone());

    {
        let mut file = File::create(&tmp_path)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;

        file.write_all(contents)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;

        file.sync_all()
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;
    }

    fs::rename(&tmp_path, &abs)
        .context(OtherIoSnafu {
            path: abs.display().to_string(),
        })?;

    guard.disarm();
    Ok(())
}

/// Open the file at `rel_path` within `location` for reading.
///
/// A missing file (or a path that is not a regular file) yields
/// [`StorageError::NotFound`]; any other failure yields
/// [`StorageError::OtherIo`].
pub fn open_read(location: &StoreLocation, rel_path: &Path) -> StorageResult<File> {
    let abs = location.resolve(rel_path);
    let path_str = abs.display().to_string();

    let meta = match fs::metadata(&abs) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(e).context(NotFoundSnafu { path: path_str });
        }
        Err(e) => return Err(e).context(OtherIoSnafu { path: path_str }),
    };

    if !meta.is_file() {
        let synthetic = io::Error::other("not a regular file");
        return Err(synthetic).context(NotFoundSnafu { path: path_str });
    }

    File::open(&abs)
        .context(OtherIoSnafu { path: path_str })
}

/// Returns `true` if a regular file exists at `rel_path` within `location`.
pub fn exists(location: &StoreLocation, rel_path: &Path) -> bool {
    location.resolve(rel_path).is_file()
}
