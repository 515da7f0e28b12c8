//! Conversion implementations for error types

use super::types::Error;
use std::io;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// Needed so the writer can sit behind `std::io::Write`.
impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::WriteTooLarge { .. } | Error::Configuration { .. } => {
                io::ErrorKind::InvalidInput
            }
            Error::FileSystem { source, .. } => source.kind(),
            Error::IsDirectory { .. } | Error::Json { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FsOperation;

    #[test]
    fn test_write_too_large_maps_to_invalid_input() {
        let err: io::Error = Error::write_too_large(10, 5).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("exceeds maximum file size 5"));
    }

    #[test]
    fn test_file_system_keeps_source_kind() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err: io::Error =
            Error::file_system("/var/log/x.log", FsOperation::Rename, source).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("rename log file"));
    }
}
