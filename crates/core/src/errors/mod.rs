//! Error types for logroll operations

mod builders;
mod conversions;
mod types;

pub use types::{Error, FsOperation, Result};
