//! Error type for backing store file operations.

use std::io;

use snafu::{Backtrace, prelude::*};

/// Errors from storage-directory file operations.
///
/// Every variant carries the absolute path involved.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The path does not exist or is not a regular file.
    #[snafu(display("Path not found: {path}"))]
    NotFound {
        /// The missing path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Where the failure was captured.
        backtrace: Backtrace,
    },

    /// Any other filesystem failure.
    #[snafu(display("I/O error at {path}: {source}"))]
    OtherIo {
        /// The path being accessed.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
        /// Where the failure was captured.
        backtrace: Backtrace,
    },
}

impl StorageError {
    /// `true` when the requested path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
