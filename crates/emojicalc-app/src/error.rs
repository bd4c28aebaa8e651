//! Application assembly errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building an [`App`](crate::App).
#[derive(Debug, Error)]
pub enum AppError {
    /// The configured views directory does not exist.
    #[error("Invalid views path: {} is not a directory", path.display())]
    ViewsDirectory {
        /// The configured path.
        path: PathBuf,
    },
}

impl AppError {
    /// Creates a views directory error.
    pub fn views_directory(path: impl Into<PathBuf>) -> Self {
        Self::ViewsDirectory { path: path.into() }
    }
}
