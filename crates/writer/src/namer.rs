//! Backup file naming

use chrono::{DateTime, Local, Utc};
use logroll_core::{BACKUP_TIME_FORMAT, BACKUP_TIME_MINUTE_FORMAT};
use std::path::{Path, PathBuf};

/// Maps the current log path and rotation time to the path its backup is
/// renamed to.
///
/// Names that don't follow the default `<stem>-<timestamp><ext>` layout are
/// invisible to retention: they are never deleted or compressed.
pub trait BackupNamer: Send + Sync {
    fn backup_name(&self, path: &Path, now: DateTime<Utc>, local_time: bool) -> PathBuf;
}

impl<F> BackupNamer for F
where
    F: Fn(&Path, DateTime<Utc>, bool) -> PathBuf + Send + Sync,
{
    fn backup_name(&self, path: &Path, now: DateTime<Utc>, local_time: bool) -> PathBuf {
        self(path, now, local_time)
    }
}

/// `<dir>/<stem>-2016-11-04T18-30-00.000<ext>`
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampNamer;

impl BackupNamer for TimestampNamer {
    fn backup_name(&self, path: &Path, now: DateTime<Utc>, local_time: bool) -> PathBuf {
        let name = file_name(path);
        let (prefix, ext) = split_extension(&name);
        let timestamp = format_time(now, local_time, BACKUP_TIME_FORMAT);
        dir_of(path).join(format!("{prefix}-{timestamp}{ext}"))
    }
}

/// Minute-resolution names: `app.err.log` becomes `app-201611041830.err`.
///
/// The final extension is dropped and only an inner one is kept. These
/// backups are not managed by retention.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinuteBackupNamer;

impl BackupNamer for MinuteBackupNamer {
    fn backup_name(&self, path: &Path, now: DateTime<Utc>, local_time: bool) -> PathBuf {
        let name = file_name(path);
        let (without_ext, _) = split_extension(&name);
        let (prefix, inner_ext) = split_extension(without_ext);
        let timestamp = format_time(now, local_time, BACKUP_TIME_MINUTE_FORMAT);
        dir_of(path).join(format!("{prefix}-{timestamp}{inner_ext}"))
    }
}

/// Split at the last dot of a file name; the extension keeps its dot.
pub(crate) fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Directory holding `path`; a bare file name lives in `.`
pub(crate) fn dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub(crate) fn format_time(now: DateTime<Utc>, local_time: bool, format: &str) -> String {
    if local_time {
        now.with_timezone(&Local).format(format).to_string()
    } else {
        now.format(format).to_string()
    }
}
