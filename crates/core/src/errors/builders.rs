//! Builder methods for creating errors with context

use super::types::{Error, FsOperation};
use std::path::PathBuf;

impl Error {
    /// Create a file system error
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: FsOperation,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an oversized write error
    #[must_use]
    pub fn write_too_large(len: u64, max: u64) -> Self {
        Error::WriteTooLarge { len, max }
    }

    /// The failed file system step, if this is a file system error
    pub fn operation(&self) -> Option<FsOperation> {
        match self {
            Error::FileSystem { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Whether the caller handed over a write that can never fit in one file
    pub fn is_write_too_large(&self) -> bool {
        matches!(self, Error::WriteTooLarge { .. })
    }
}
