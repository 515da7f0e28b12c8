//! Time and file-stat capabilities
//!
//! The writer never reads the wall clock or stats files directly; it goes
//! through these traits so tests can pin time and inject stat failures.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::Path;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// The parts of a stat result the writer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub is_dir: bool,
    /// Permission bits; `None` where the platform has no unix mode
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl FileInfo {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self {
                size: meta.len(),
                is_dir: meta.is_dir(),
                mode: Some(meta.mode() & 0o7777),
                uid: Some(meta.uid()),
                gid: Some(meta.gid()),
            }
        }
        #[cfg(not(unix))]
        {
            Self {
                size: meta.len(),
                is_dir: meta.is_dir(),
                mode: None,
                uid: None,
                gid: None,
            }
        }
    }
}

/// File-stat lookups
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;
}

/// Stats through `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        fs::metadata(path).map(|meta| FileInfo::from_metadata(&meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2016, 11, 4, 18, 30, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_os_stat_reports_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.log");
        fs::write(&path, b"12345").unwrap();

        let info = OsFileSystem.stat(&path).unwrap();
        assert_eq!(info.size, 5);
        assert!(!info.is_dir);

        let dir = OsFileSystem.stat(temp_dir.path()).unwrap();
        assert!(dir.is_dir);
    }

    #[test]
    fn test_os_stat_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = OsFileSystem.stat(&temp_dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
