use clap::Parser;
use eyre::WrapErr;
use logroll_writer::RotatingWriter;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
#[cfg(unix)]
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod pump;

use args::Cli;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Our own diagnostics go to stderr; stdout is left alone.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = cli.to_config().wrap_err("Failed to load configuration")?;
    let writer = RotatingWriter::from_config(&config)
        .wrap_err_with(|| format!("Can't log to {}", config.filename.display()))?;

    let rotate = Arc::new(AtomicBool::new(false));
    register_rotate_signal(&rotate);

    info!(path = %writer.path().display(), max_size = writer.max_size(), "Writing log");

    let stats = pump::pump(io::stdin().lock(), &writer, &rotate);
    writer.close().wrap_err("Failed to close log file")?;
    let stats = stats?;

    info!(
        lines = stats.lines,
        bytes = stats.bytes,
        dropped = stats.dropped,
        rotations = stats.rotations,
        "Input closed"
    );
    Ok(())
}

/// SIGHUP sets `flag`; the pump rotates before the next line
#[cfg(unix)]
fn register_rotate_signal(flag: &Arc<AtomicBool>) {
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(flag)) {
        warn!("Failed to register SIGHUP handler: {}", e);
    }
}

#[cfg(not(unix))]
fn register_rotate_signal(_flag: &Arc<AtomicBool>) {}
