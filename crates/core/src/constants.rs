/// Constants used throughout the logroll codebase

// Config-layer defaults
pub const DEFAULT_LOG_FILE_NAME: &str = "run.log";
pub const DEFAULT_LOG_DIR_NAME: &str = "log";
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_DAYS: u32 = 7;
pub const DEFAULT_MAX_BACKUPS: usize = 5;

pub const MEGABYTE: u64 = 1024 * 1024;

// Backup naming
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
pub const BACKUP_TIME_MINUTE_FORMAT: &str = "%Y%m%d%H%M";
pub const COMPRESS_SUFFIX: &str = ".gz";

// Suffix of the file used when no target path is configured
pub const DEFAULT_FILE_SUFFIX: &str = "-logroll.log";

// File modes
pub const DEFAULT_DIR_MODE: u32 = 0o744;
pub const DEFAULT_FILE_MODE: u32 = 0o644;
