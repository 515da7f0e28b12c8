use clap::Parser;
use logroll_core::{FileLogConfig, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logroll")]
#[command(about = "Copy stdin into a log file, rotating it by size", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log file to write; defaults to the config file's, then to a file in the temp dir
    pub file: Option<PathBuf>,

    /// Rotate once the file would exceed this many megabytes
    #[arg(long, value_name = "MB")]
    pub max_size: Option<u64>,

    /// Delete backups older than this many days
    #[arg(long, value_name = "DAYS")]
    pub max_age: Option<u32>,

    /// Keep at most this many backups
    #[arg(long, value_name = "N")]
    pub max_backups: Option<usize>,

    /// Stamp backups with local time instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Gzip backups after rotation
    #[arg(long)]
    pub compress: bool,

    /// JSON file with base settings; flags override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings from `--config`, overridden by whatever was passed on the command line
    pub fn to_config(&self) -> Result<FileLogConfig> {
        let mut config = match &self.config {
            Some(path) => FileLogConfig::from_json_file(path)?,
            None => FileLogConfig::default(),
        };

        if let Some(file) = &self.file {
            config.filename = file.clone();
        }
        if let Some(max_size) = self.max_size {
            config.max_size = max_size;
        }
        if let Some(max_age) = self.max_age {
            config.max_days = max_age;
        }
        if let Some(max_backups) = self.max_backups {
            config.max_backups = max_backups;
        }
        config.local_time |= self.local_time;
        config.compress |= self.compress;

        Ok(config)
    }
}
