//! Error taxonomy for the bundle cache.
//!
//! Three categories, matching how callers react to them: filesystem
//! failures are always surfaced, retrieval failures abort the fetch, and
//! integrity failures on a pre-existing cached file trigger a re-fetch
//! while the same failure on a freshly downloaded file is fatal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    /// Directory or file could not be created, opened, or read for
    /// reasons unrelated to its content (permissions, I/O failure).
    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Network transport failure, non-success response status, or local
    /// write failure while downloading from the release origin.
    #[error("error fetching {url}: {detail}")]
    Retrieval { url: String, detail: String },

    /// Digest file unreadable or unparseable, or the computed digest of
    /// the bundle does not match the expected one.
    #[error("integrity error on {}: {detail}", .path.display())]
    Integrity { path: PathBuf, detail: String },
}

impl BundleError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BundleError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn retrieval(url: impl Into<String>, detail: impl Into<String>) -> Self {
        BundleError::Retrieval {
            url: url.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn integrity(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        BundleError::Integrity {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
