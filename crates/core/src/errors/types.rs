//! Core error type definitions

use std::fmt;
use std::path::PathBuf;

/// Result type alias for logroll operations
pub type Result<T> = std::result::Result<T, Error>;

/// File system step that failed while writing, rotating or milling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    CreateDir,
    Stat,
    Rename,
    OpenNew,
    Write,
    Close,
    Sync,
    Chown,
    ReadDir,
    Remove,
    Compress,
    ReadConfig,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsOperation::CreateDir => "create log directory",
            FsOperation::Stat => "stat log file",
            FsOperation::Rename => "rename log file",
            FsOperation::OpenNew => "open new log file",
            FsOperation::Write => "write log file",
            FsOperation::Close => "close log file",
            FsOperation::Sync => "sync log file",
            FsOperation::Chown => "chown log file",
            FsOperation::ReadDir => "read log directory",
            FsOperation::Remove => "remove backup",
            FsOperation::Compress => "compress backup",
            FsOperation::ReadConfig => "read config file",
        };
        f.write_str(s)
    }
}

/// Core error type for logroll operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single write larger than the rotation threshold
    #[error("write length {len} exceeds maximum file size {max}")]
    WriteTooLarge { len: u64, max: u64 },

    /// The target path names a directory
    #[error("can't use directory as log file name: {}", path.display())]
    IsDirectory { path: PathBuf },

    /// File system operations
    #[error("can't {operation} '{}': {source}", path.display())]
    FileSystem {
        path: PathBuf,
        operation: FsOperation,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
