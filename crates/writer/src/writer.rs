//! Size-triggered rotating file writer

use crate::backup::BackupPattern;
use crate::fsutil::{copy_owner, create_log_dir, open_truncate};
use crate::mill::{request_pass, RetentionPolicy, RetentionReport, RetentionWorker};
use crate::namer::{dir_of, BackupNamer, TimestampNamer};
use chrono::Duration;
use crossbeam::channel::Sender;
use logroll_core::{
    Clock, Error, FileInfo, FileLogConfig, FileSystem, FsOperation, OsFileSystem, Result,
    SystemClock, DEFAULT_FILE_MODE, DEFAULT_FILE_SUFFIX, DEFAULT_MAX_SIZE_MB, MEGABYTE,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// The open file and how much has been written to it
#[derive(Default)]
struct WriterState {
    file: Option<File>,
    size: u64,
}

/// Writes to one log file, rotating it to a timestamped backup whenever the
/// next write would push it past the size threshold.
///
/// The file is opened on first write. An existing file is appended to if the
/// write fits, otherwise it is rotated first. After every rotation a
/// background pass deletes and compresses old backups according to the
/// retention policy.
///
/// All operations serialise on one internal lock, so a single writer can be
/// shared freely between threads.
pub struct RotatingWriter {
    path: PathBuf,
    max_size: u64,
    local_time: bool,
    namer: Arc<dyn BackupNamer>,
    clock: Arc<dyn Clock>,
    file_system: Arc<dyn FileSystem>,
    mill: Arc<RetentionWorker>,
    mill_tx: OnceLock<Sender<()>>,
    state: Mutex<WriterState>,
}

impl RotatingWriter {
    pub fn builder(path: impl Into<PathBuf>) -> RotatingWriterBuilder {
        RotatingWriterBuilder::new(path)
    }

    /// Build a writer from a validated file log configuration
    pub fn from_config(config: &FileLogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::builder(&config.filename)
            .max_size_mb(config.max_size)
            .max_age_days(config.max_days)
            .max_backups(config.max_backups)
            .local_time(config.local_time)
            .compress(config.compress)
            .build())
    }

    /// Path of the current log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotation threshold in bytes
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn retention_policy(&self) -> &RetentionPolicy {
        self.mill.policy()
    }

    /// Bytes written to the current file, or `None` if no file is open
    pub fn current_size(&self) -> Option<u64> {
        let state = self.state.lock();
        state.file.as_ref().map(|_| state.size)
    }

    /// Append `buf` to the log, rotating first if it would not fit.
    ///
    /// A buffer larger than the threshold can never fit and is rejected
    /// without touching the file.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();

        let write_len = buf.len() as u64;
        if write_len > self.max_size {
            return Err(Error::write_too_large(write_len, self.max_size));
        }

        if state.file.is_none() {
            self.open_existing_or_new(&mut state, write_len)?;
        }

        if state.size + write_len > self.max_size {
            self.rotate_locked(&mut state)?;
        }

        let Some(file) = state.file.as_mut() else {
            return Err(Error::file_system(
                &self.path,
                FsOperation::Write,
                io::Error::new(io::ErrorKind::NotConnected, "log file is not open"),
            ));
        };
        let written = file
            .write(buf)
            .map_err(|e| Error::file_system(&self.path, FsOperation::Write, e))?;
        state.size += written as u64;
        Ok(written)
    }

    /// Close the current file, move it to a backup and start a fresh one,
    /// regardless of its size.
    ///
    /// On error no file is left open; the next write tries again from
    /// scratch.
    pub fn rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)
    }

    /// Close the current file. Calling this on a closed writer is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.close_locked(&mut state)
    }

    /// Flush the current file to disk
    pub fn sync(&self) -> Result<()> {
        let state = self.state.lock();
        if let Some(file) = state.file.as_ref() {
            file.sync_all()
                .map_err(|e| Error::file_system(&self.path, FsOperation::Sync, e))?;
        }
        Ok(())
    }

    /// Run a retention pass on the calling thread and report what it did
    pub fn run_retention(&self) -> Result<RetentionReport> {
        self.mill.run_once()
    }

    fn close_locked(&self, state: &mut WriterState) -> Result<()> {
        let Some(file) = state.file.take() else {
            return Ok(());
        };
        state.size = 0;
        // Dropping a File swallows errors; syncing first surfaces them.
        file.sync_all()
            .map_err(|e| Error::file_system(&self.path, FsOperation::Close, e))
    }

    fn rotate_locked(&self, state: &mut WriterState) -> Result<()> {
        self.close_locked(state)?;
        self.open_new(state)?;
        self.trigger_mill();
        Ok(())
    }

    /// Move any existing file aside and create a fresh, empty one
    fn open_new(&self, state: &mut WriterState) -> Result<()> {
        let dir = dir_of(&self.path);
        create_log_dir(&dir).map_err(|e| Error::file_system(&dir, FsOperation::CreateDir, e))?;

        let existing = match self.file_system.stat(&self.path) {
            Ok(info) => Some(info),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::file_system(&self.path, FsOperation::Stat, e)),
        };

        let mut previous: Option<FileInfo> = None;
        if let Some(info) = existing {
            if info.is_dir {
                return Err(Error::IsDirectory {
                    path: self.path.clone(),
                });
            }
            let backup = self.free_backup_name()?;
            std::fs::rename(&self.path, &backup)
                .map_err(|e| Error::file_system(&self.path, FsOperation::Rename, e))?;
            debug!(
                path = %self.path.display(),
                backup = %backup.display(),
                size = info.size,
                "Rotated log file"
            );
            previous = Some(info);
        }

        // Only we should have moved the old file away; if someone recreated
        // it in the meantime, its contents are discarded.
        let mode = previous.and_then(|info| info.mode).unwrap_or(DEFAULT_FILE_MODE);
        let file = open_truncate(&self.path, mode)
            .map_err(|e| Error::file_system(&self.path, FsOperation::OpenNew, e))?;
        if let Some(info) = previous {
            copy_owner(&self.path, &info)?;
        }

        state.file = Some(file);
        state.size = 0;
        Ok(())
    }

    /// Backup path for a rotation happening now.
    ///
    /// Rename would replace an existing backup, so while the name is taken
    /// the rotation time is stepped forward a millisecond at a time. A namer
    /// that ignores sub-second time can't be stepped and its name is reused.
    fn free_backup_name(&self) -> Result<PathBuf> {
        let mut now = self.clock.now();
        let mut backup = self.namer.backup_name(&self.path, now, self.local_time);
        loop {
            match self.file_system.stat(&backup) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(backup),
                Err(e) => return Err(Error::file_system(&backup, FsOperation::Stat, e)),
                Ok(_) => {}
            }
            now += Duration::milliseconds(1);
            let next = self.namer.backup_name(&self.path, now, self.local_time);
            if next == backup {
                warn!(backup = %backup.display(), "Backup name is taken, replacing it");
                return Ok(backup);
            }
            backup = next;
        }
    }

    /// Open the log file for the first write: append if the write fits,
    /// rotate if it doesn't, create it if it's missing.
    fn open_existing_or_new(&self, state: &mut WriterState, write_len: u64) -> Result<()> {
        self.trigger_mill();

        let info = match self.file_system.stat(&self.path) {
            Ok(info) => info,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.open_new(state),
            Err(e) => return Err(Error::file_system(&self.path, FsOperation::Stat, e)),
        };
        if info.is_dir {
            return Err(Error::IsDirectory {
                path: self.path.clone(),
            });
        }

        if info.size + write_len >= self.max_size {
            return self.rotate_locked(state);
        }

        match OpenOptions::new().append(true).open(&self.path) {
            Ok(file) => {
                state.file = Some(file);
                state.size = info.size;
                Ok(())
            }
            Err(e) => {
                // Keep logging even if the old file is unusable.
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Can't append to existing log file, starting a new one"
                );
                self.open_new(state)
            }
        }
    }

    fn trigger_mill(&self) {
        if self.mill.policy().is_noop() {
            return;
        }
        let tx = self.mill_tx.get_or_init(|| self.mill.spawn());
        request_pass(tx);
    }
}

/// Builder for [`RotatingWriter`]
pub struct RotatingWriterBuilder {
    path: PathBuf,
    max_size: u64,
    policy: RetentionPolicy,
    local_time: bool,
    namer: Option<Arc<dyn BackupNamer>>,
    clock: Option<Arc<dyn Clock>>,
    file_system: Option<Arc<dyn FileSystem>>,
}

impl RotatingWriterBuilder {
    /// An empty path means `<temp dir>/<process name>-logroll.log`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: 0,
            policy: RetentionPolicy::default(),
            local_time: false,
            namer: None,
            clock: None,
            file_system: None,
        }
    }

    /// Rotation threshold in bytes; 0 means 100 MB
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Rotation threshold in megabytes; 0 means 100 MB
    pub fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes.saturating_mul(MEGABYTE);
        self
    }

    pub fn max_age_days(mut self, days: u32) -> Self {
        self.policy.max_age_days = days;
        self
    }

    pub fn max_backups(mut self, count: usize) -> Self {
        self.policy.max_backups = count;
        self
    }

    pub fn local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.policy.compress = compress;
        self
    }

    /// Replace the default `<stem>-<timestamp><ext>` backup naming
    pub fn namer(mut self, namer: impl BackupNamer + 'static) -> Self {
        self.namer = Some(Arc::new(namer));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(file_system);
        self
    }

    pub fn build(self) -> RotatingWriter {
        let path = if self.path.as_os_str().is_empty() {
            default_log_path()
        } else {
            self.path
        };
        let max_size = if self.max_size == 0 {
            DEFAULT_MAX_SIZE_MB * MEGABYTE
        } else {
            self.max_size
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let mill = RetentionWorker::new(
            dir_of(&path),
            BackupPattern::for_path(&path, self.local_time),
            self.policy,
            Arc::clone(&clock),
        );

        RotatingWriter {
            path,
            max_size,
            local_time: self.local_time,
            namer: self.namer.unwrap_or_else(|| Arc::new(TimestampNamer)),
            clock,
            file_system: self.file_system.unwrap_or_else(|| Arc::new(OsFileSystem)),
            mill: Arc::new(mill),
            mill_tx: OnceLock::new(),
            state: Mutex::new(WriterState::default()),
        }
    }
}

fn default_log_path() -> PathBuf {
    let process = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "logroll".to_string());
    std::env::temp_dir().join(format!("{process}{DEFAULT_FILE_SUFFIX}"))
}
