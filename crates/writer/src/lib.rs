//! Rotating log file writer for `logroll`
//!
//! [`RotatingWriter`] takes a stream of byte buffers, splits it across files
//! once a size threshold is crossed, and names the rotated files after the
//! moment they were rotated:
//!
//! ```text
//! /var/log/app/server.log                          <- current file
//! /var/log/app/server-2016-11-04T18-30-00.000.log  <- backup
//! /var/log/app/server-2016-11-03T09-12-44.512.log.gz
//! ```
//!
//! Old backups are deleted by count and age, and optionally gzipped, by a
//! background thread so the write path never waits on directory scans or
//! compression.
//!
//! ```no_run
//! use logroll_writer::RotatingWriter;
//!
//! let writer = RotatingWriter::builder("/var/log/app/server.log")
//!     .max_size_mb(50)
//!     .max_backups(10)
//!     .max_age_days(14)
//!     .compress(true)
//!     .build();
//! writer.write(b"service started\n")?;
//! # Ok::<(), logroll_core::Error>(())
//! ```

pub mod backup;
pub mod compress;
mod fsutil;
pub mod mill;
pub mod namer;
pub mod sink;
pub mod writer;

pub use backup::{scan_backups, BackupFile, BackupPattern};
pub use compress::compress_file;
pub use mill::{plan_retention, RetentionPlan, RetentionPolicy, RetentionReport, RetentionWorker};
pub use namer::{BackupNamer, MinuteBackupNamer, TimestampNamer};
pub use sink::SharedWriter;
pub use writer::{RotatingWriter, RotatingWriterBuilder};
