//! Error types for termfolio
//!
//! Every error here is scoped to a single session or to startup. Nothing in
//! the session engine returns an error for bad input; see [`crate::ui::app`].

use crate::pages::Page;
use std::path::{Path, PathBuf};

/// Main error type for termfolio operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content for page {page:?} unavailable: {message}")]
    Content { page: Page, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("Host key {}: {message}", path.display())]
    HostKey { path: PathBuf, message: String },
}

impl Error {
    pub fn content(page: Page, message: impl Into<String>) -> Self {
        Self::Content {
            page,
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn host_key(path: &Path, message: impl Into<String>) -> Self {
        Self::HostKey {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result alias for termfolio operations
pub type Result<T> = std::result::Result<T, Error>;
