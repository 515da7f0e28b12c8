//! Platform-specific file helpers

use logroll_core::{Error, FileInfo, FsOperation, Result, DEFAULT_DIR_MODE};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Create `dir` and its parents with the fixed log directory mode
pub(crate) fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_MODE);
    }
    #[cfg(not(unix))]
    let _ = DEFAULT_DIR_MODE;
    builder.create(dir)
}

/// Open `path` for writing, creating or truncating it
pub(crate) fn open_truncate(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

/// Give `path` the owner recorded in `info`.
///
/// Unprivileged processes may not chown; that is logged and tolerated.
pub(crate) fn copy_owner(path: &Path, info: &FileInfo) -> Result<()> {
    #[cfg(unix)]
    {
        if let (Some(uid), Some(gid)) = (info.uid, info.gid) {
            match std::os::unix::fs::chown(path, Some(uid), Some(gid)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %e,
                        "Skipping chown of log file"
                    );
                }
                Err(e) => return Err(Error::file_system(path, FsOperation::Chown, e)),
            }
        }
    }
    #[cfg(not(unix))]
    let _ = (path, info);
    Ok(())
}
