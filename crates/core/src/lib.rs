//! Core types, errors, and capabilities for `logroll`.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate.
//! - **`config`**: `FileLogConfig`, the serde-loadable description of one
//!   rotating log file.
//! - **`clock`**: the `Clock` and `FileSystem` capabilities the writer is built
//!   on, with system and test implementations.
//! - **`constants`**: defaults and the on-disk naming layout.

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;

pub use self::{
    clock::{Clock, FileInfo, FileSystem, ManualClock, OsFileSystem, SystemClock},
    config::FileLogConfig,
    constants::*,
    errors::{Error, FsOperation, Result},
};
