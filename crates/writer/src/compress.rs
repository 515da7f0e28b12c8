//! Gzip compression of rotated backups

use crate::fsutil::{copy_owner, open_truncate};
use flate2::write::GzEncoder;
use flate2::Compression;
use logroll_core::{Error, FileInfo, FsOperation, Result, DEFAULT_FILE_MODE};
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Stream `src` through gzip into `dst`, then remove `src`.
///
/// `dst` takes the mode and owner of `src`. If anything fails after `dst`
/// is created it is removed again, so a failed run never leaves a truncated
/// archive next to the original.
pub fn compress_file(src: &Path, dst: &Path) -> Result<()> {
    let mut source =
        File::open(src).map_err(|e| Error::file_system(src, FsOperation::Compress, e))?;
    let info = source
        .metadata()
        .map(|meta| FileInfo::from_metadata(&meta))
        .map_err(|e| Error::file_system(src, FsOperation::Compress, e))?;

    // A leftover dst is presumed to be from an earlier failed attempt.
    let dest = open_truncate(dst, info.mode.unwrap_or(DEFAULT_FILE_MODE))
        .map_err(|e| Error::file_system(dst, FsOperation::Compress, e))?;

    let result = (|| -> Result<()> {
        let mut encoder = GzEncoder::new(dest, Compression::default());
        io::copy(&mut source, &mut encoder)
            .map_err(|e| Error::file_system(src, FsOperation::Compress, e))?;
        let dest = encoder
            .finish()
            .map_err(|e| Error::file_system(dst, FsOperation::Compress, e))?;
        dest.sync_all()
            .map_err(|e| Error::file_system(dst, FsOperation::Compress, e))?;
        drop(dest);

        copy_owner(dst, &info)?;

        drop(source);
        fs::remove_file(src).map_err(|e| Error::file_system(src, FsOperation::Compress, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(dst);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn gunzip(path: &Path) -> Vec<u8> {
        let mut decoder = GzDecoder::new(File::open(path).unwrap());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_compress_replaces_source() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("app-2016-11-04T18-30-00.000.log");
        let dst = temp_dir.path().join("app-2016-11-04T18-30-00.000.log.gz");
        let content = b"line one\nline two\n".repeat(100);
        fs::write(&src, &content).unwrap();

        compress_file(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(gunzip(&dst), content);
    }

    #[test]
    fn test_compress_overwrites_stale_archive() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.log");
        let dst = temp_dir.path().join("a.log.gz");
        fs::write(&src, b"fresh").unwrap();
        fs::write(&dst, b"half-written garbage").unwrap();

        compress_file(&src, &dst).unwrap();
        assert_eq!(gunzip(&dst), b"fresh");
    }

    #[test]
    fn test_compress_missing_source_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("missing.log");
        let dst = temp_dir.path().join("missing.log.gz");

        let err = compress_file(&src, &dst).unwrap_err();
        assert_eq!(err.operation(), Some(FsOperation::Compress));
        assert!(!dst.exists());
    }

    #[test]
    fn test_compress_into_missing_directory_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.log");
        let dst = temp_dir.path().join("gone").join("a.log.gz");
        fs::write(&src, b"keep me").unwrap();

        assert!(compress_file(&src, &dst).is_err());
        assert_eq!(fs::read(&src).unwrap(), b"keep me");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_removes_partial_archive() {
        let temp_dir = TempDir::new().unwrap();
        // A directory opens fine on unix but fails on the first read.
        let src = temp_dir.path().join("a.log");
        let dst = temp_dir.path().join("a.log.gz");
        fs::create_dir(&src).unwrap();

        let err = compress_file(&src, &dst).unwrap_err();
        assert_eq!(err.operation(), Some(FsOperation::Compress));
        assert!(!dst.exists());
        assert!(src.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_compress_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.log");
        let dst = temp_dir.path().join("a.log.gz");
        fs::write(&src, b"x").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o600)).unwrap();

        compress_file(&src, &dst).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
