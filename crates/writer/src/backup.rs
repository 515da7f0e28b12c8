//! Recognising backups in the log directory
//!
//! A directory entry is a backup only if its name is `<stem>-<timestamp><ext>`
//! (optionally followed by `.gz`) and the middle parses as a backup
//! timestamp. Everything else in the directory is left alone.

use crate::namer::{file_name, split_extension};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use logroll_core::{Error, FsOperation, Result, BACKUP_TIME_FORMAT, COMPRESS_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};

/// A rotated file and the rotation time encoded in its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
    pub name: String,
}

impl BackupFile {
    pub fn is_compressed(&self) -> bool {
        self.name.ends_with(COMPRESS_SUFFIX)
    }

    /// Name without the compression suffix, shared by both copies of a rotation
    pub fn logical_name(&self) -> &str {
        self.name
            .strip_suffix(COMPRESS_SUFFIX)
            .unwrap_or(&self.name)
    }
}

/// Name pattern of the backups belonging to one log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPattern {
    prefix: String,
    ext: String,
    local_time: bool,
}

impl BackupPattern {
    pub fn for_path(path: &Path, local_time: bool) -> Self {
        let name = file_name(path);
        let (stem, ext) = split_extension(&name);
        Self {
            prefix: format!("{stem}-"),
            ext: ext.to_string(),
            local_time,
        }
    }

    /// Rotation time encoded in `name`, if it is one of our backups
    pub fn parse(&self, name: &str) -> Option<DateTime<Utc>> {
        self.time_from_name(name, &self.ext).or_else(|| {
            let compressed = format!("{}{COMPRESS_SUFFIX}", self.ext);
            self.time_from_name(name, &compressed)
        })
    }

    // Strip prefix and extension first so neither can confuse the time parser.
    fn time_from_name(&self, name: &str, ext: &str) -> Option<DateTime<Utc>> {
        let timestamp = name.strip_prefix(&self.prefix)?.strip_suffix(ext)?;
        let naive = NaiveDateTime::parse_from_str(timestamp, BACKUP_TIME_FORMAT).ok()?;
        if self.local_time {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        } else {
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}

/// List the backups in `dir`, newest first by encoded timestamp
pub fn scan_backups(dir: &Path, pattern: &BackupPattern) -> Result<Vec<BackupFile>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::file_system(dir, FsOperation::ReadDir, e))?;

    let mut backups = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::file_system(dir, FsOperation::ReadDir, e))?;
        // Entries can vanish between listing and inspection.
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if let Some(timestamp) = pattern.parse(&name) {
            backups.push(BackupFile {
                timestamp,
                path: entry.path(),
                name,
            });
        }
    }

    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(backups)
}
