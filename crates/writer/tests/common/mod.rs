//! Shared helpers for writer integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use logroll_core::Clock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// Clock that moves one millisecond forward every time it is read, so
/// back-to-back rotations still get distinct backup names.
pub struct TickingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickingClock {
    pub fn new(base: DateTime<Utc>) -> Self {
        Self {
            base,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::milliseconds(tick)
    }
}

/// File names in `dir` other than `current`, sorted
pub fn backups(dir: &Path, current: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != current)
        .collect();
    names.sort();
    names
}

pub fn file_len(path: impl Into<PathBuf>) -> u64 {
    fs::metadata(path.into()).unwrap().len()
}
