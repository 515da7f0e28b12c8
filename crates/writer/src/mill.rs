//! Retention of rotated backups
//!
//! After each rotation the writer pokes a single background thread through a
//! capacity-one channel. A poke while a pass is already pending is dropped:
//! passes look at the whole directory, so one pass after the latest rotation
//! is all that is needed.

use crate::backup::{scan_backups, BackupFile, BackupPattern};
use crate::compress::compress_file;
use chrono::{DateTime, Duration, Utc};
use crossbeam::channel::{self, Sender};
use logroll_core::{Clock, Error, FsOperation, Result, COMPRESS_SUFFIX};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// What to keep, what to delete, what to compress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Keep at most this many backups; 0 keeps all
    pub max_backups: usize,
    /// Delete backups stamped more than this many days ago; 0 keeps all
    pub max_age_days: u32,
    /// Gzip surviving backups
    pub compress: bool,
}

impl RetentionPolicy {
    pub fn is_noop(&self) -> bool {
        self.max_backups == 0 && self.max_age_days == 0 && !self.compress
    }
}

/// Backups a pass will act on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    pub remove: Vec<BackupFile>,
    pub compress: Vec<BackupFile>,
}

/// Decide the fate of `backups`, which must be sorted newest first.
///
/// Count is applied first, over logical backups: a rotation present both
/// plain and gzipped counts once. Age is applied to whatever count kept.
pub fn plan_retention(
    backups: Vec<BackupFile>,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RetentionPlan {
    let mut plan = RetentionPlan::default();
    let mut files = backups;

    if policy.max_backups > 0 && policy.max_backups < files.len() {
        let mut preserved = HashSet::new();
        let mut remaining = Vec::new();
        for file in files {
            preserved.insert(file.logical_name().to_string());
            if preserved.len() > policy.max_backups {
                plan.remove.push(file);
            } else {
                remaining.push(file);
            }
        }
        files = remaining;
    }

    if policy.max_age_days > 0 {
        let cutoff = now - Duration::days(i64::from(policy.max_age_days));
        let (expired, remaining): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|f| f.timestamp < cutoff);
        plan.remove.extend(expired);
        files = remaining;
    }

    if policy.compress {
        plan.compress = files.into_iter().filter(|f| !f.is_compressed()).collect();
    }

    plan
}

/// Outcome of one successful pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub removed: Vec<PathBuf>,
    pub compressed: Vec<PathBuf>,
}

/// Deletes and compresses backups of one log file
pub struct RetentionWorker {
    dir: PathBuf,
    pattern: BackupPattern,
    policy: RetentionPolicy,
    clock: Arc<dyn Clock>,
    // Serialises background and on-demand passes.
    pass: Mutex<()>,
}

impl RetentionWorker {
    pub fn new(
        dir: impl Into<PathBuf>,
        pattern: BackupPattern,
        policy: RetentionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dir: dir.into(),
            pattern,
            policy,
            clock,
            pass: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Run one pass now.
    ///
    /// Every planned deletion and compression is attempted. The first
    /// deletion error, or failing that the first compression error, is
    /// returned afterwards.
    pub fn run_once(&self) -> Result<RetentionReport> {
        let _pass = self.pass.lock();
        if self.policy.is_noop() {
            return Ok(RetentionReport::default());
        }

        let backups = scan_backups(&self.dir, &self.pattern)?;
        let plan = plan_retention(backups, &self.policy, self.clock.now());
        self.apply(&plan)
    }

    /// Carry out `plan`, deletions first, without stopping at a failure
    fn apply(&self, plan: &RetentionPlan) -> Result<RetentionReport> {
        let mut report = RetentionReport::default();
        let mut first_error: Option<Error> = None;

        for file in &plan.remove {
            match fs::remove_file(&file.path) {
                Ok(()) => report.removed.push(file.path.clone()),
                // Someone else got there first.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Failed to remove backup");
                    first_error.get_or_insert(Error::file_system(
                        &file.path,
                        FsOperation::Remove,
                        e,
                    ));
                }
            }
        }

        for file in &plan.compress {
            let dst = compressed_path(&file.path);
            match compress_file(&file.path, &dst) {
                Ok(()) => report.compressed.push(dst),
                Err(e) if source_not_found(&e, &file.path) => {}
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Failed to compress backup");
                    first_error.get_or_insert(e);
                }
            }
        }

        debug!(
            dir = %self.dir.display(),
            removed = report.removed.len(),
            compressed = report.compressed.len(),
            "Retention pass completed"
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Start the background thread; returns the channel that wakes it
    pub(crate) fn spawn(self: &Arc<Self>) -> Sender<()> {
        let (tx, rx) = channel::bounded::<()>(1);
        let worker = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("logroll-mill".to_string())
            .spawn(move || {
                // Ends once the writer, and with it the sender, is dropped.
                for () in rx.iter() {
                    if let Err(e) = worker.run_once() {
                        warn!(dir = %worker.dir.display(), error = %e, "Retention pass failed");
                    }
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start retention thread, backups will not be cleaned up");
        }
        tx
    }
}

/// Queue a pass unless one is already pending
pub(crate) fn request_pass(tx: &Sender<()>) {
    // Full: a pass is already pending. Disconnected: the thread never started.
    let _ = tx.try_send(());
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(COMPRESS_SUFFIX);
    PathBuf::from(name)
}

fn source_not_found(err: &Error, src: &Path) -> bool {
    matches!(
        err,
        Error::FileSystem { path, source, .. }
            if path == src && source.kind() == io::ErrorKind::NotFound
    )
}
