//! File log configuration with defaults and validation

use crate::constants::{
    DEFAULT_LOG_DIR_NAME, DEFAULT_LOG_FILE_NAME, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_DAYS,
    DEFAULT_MAX_SIZE_MB,
};
use crate::errors::{Error, FsOperation, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for a rotating log file
///
/// Zero means "unset" for every numeric field: the writer falls back to a
/// 100 MB threshold and keeps backups forever. Use [`FileLogConfig::normalized`]
/// to get the config-layer defaults instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileLogConfig {
    /// File to write to; backups land in the same directory
    pub filename: PathBuf,
    /// Rotation threshold in megabytes
    pub max_size: u64,
    /// Retention window in days, judged by the timestamp in the backup name
    pub max_days: u32,
    /// How many backups to keep
    pub max_backups: usize,
    /// Stamp backups with local time instead of UTC
    pub local_time: bool,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl FileLogConfig {
    /// Create a configuration for `filename`, which must not be blank
    pub fn new(
        filename: impl AsRef<str>,
        max_size: u64,
        max_days: u32,
        max_backups: usize,
    ) -> Result<Self> {
        let filename = filename.as_ref().trim();
        if filename.is_empty() {
            return Err(Error::configuration("log file name could not be empty"));
        }
        if filename.contains('\0') {
            return Err(Error::configuration(format!(
                "log file name must be a valid path, {filename:?} is not valid"
            )));
        }

        Ok(Self {
            filename: PathBuf::from(filename),
            max_size,
            max_days,
            max_backups,
            ..Self::default()
        })
    }

    /// Like [`FileLogConfig::new`], but a blank name means `<cwd>/log/run.log`
    pub fn with_default_filename(
        filename: impl AsRef<str>,
        max_size: u64,
        max_days: u32,
        max_backups: usize,
    ) -> Result<Self> {
        if !filename.as_ref().trim().is_empty() {
            return Self::new(filename, max_size, max_days, max_backups);
        }

        let cwd = std::env::current_dir()
            .map_err(|e| Error::file_system(".", FsOperation::Stat, e))?;
        Ok(Self {
            filename: default_filename_in(&cwd),
            max_size,
            max_days,
            max_backups,
            ..Self::default()
        })
    }

    /// Load a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, FsOperation::ReadConfig, e))?;
        Self::from_json_str(&content)
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Fill unset numeric fields with the config-layer defaults
    pub fn normalized(mut self) -> Self {
        if self.max_size == 0 {
            self.max_size = DEFAULT_MAX_SIZE_MB;
        }
        if self.max_backups == 0 {
            self.max_backups = DEFAULT_MAX_BACKUPS;
        }
        if self.max_days == 0 {
            self.max_days = DEFAULT_MAX_DAYS;
        }
        self
    }

    /// Reject a target path that currently names a directory
    pub fn validate(&self) -> Result<()> {
        if let Ok(meta) = fs::metadata(&self.filename) {
            if meta.is_dir() {
                return Err(Error::IsDirectory {
                    path: self.filename.clone(),
                });
            }
        }
        Ok(())
    }
}

fn default_filename_in(base: &Path) -> PathBuf {
    base.join(DEFAULT_LOG_DIR_NAME).join(DEFAULT_LOG_FILE_NAME)
}
