//! Copies lines from a reader into the rotating writer

use logroll_writer::RotatingWriter;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub lines: u64,
    pub bytes: u64,
    pub dropped: u64,
    pub rotations: u64,
}

/// Write every line of `input` to `writer` until EOF.
///
/// `rotate` is checked before each line; a set flag is cleared and the file
/// rotated. Lines that can never fit in one file are dropped with a warning.
pub fn pump(
    mut input: impl BufRead,
    writer: &RotatingWriter,
    rotate: &AtomicBool,
) -> eyre::Result<PumpStats> {
    let mut stats = PumpStats::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = match input.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if rotate.swap(false, Ordering::SeqCst) {
            debug!(path = %writer.path().display(), "Rotation requested");
            writer.rotate()?;
            stats.rotations += 1;
        }

        match writer.write(&line) {
            Ok(written) => {
                stats.lines += 1;
                stats.bytes += written as u64;
            }
            Err(e) if e.is_write_too_large() => {
                warn!(len = read, error = %e, "Dropping line");
                stats.dropped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_copies_lines_and_keeps_partial_last_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");
        let writer = RotatingWriter::builder(&path).build();

        let stats = pump(
            Cursor::new("first\nsecond\nno newline"),
            &writer,
            &AtomicBool::new(false),
        )
        .unwrap();

        assert_eq!(stats.lines, 3);
        assert_eq!(stats.bytes, 23);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\nno newline");
    }

    #[test]
    fn test_rotation_flag_is_consumed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");
        let writer = RotatingWriter::builder(&path).build();
        let rotate = AtomicBool::new(true);

        let stats = pump(Cursor::new("a\nb\n"), &writer, &rotate).unwrap();

        assert_eq!(stats.rotations, 1);
        assert!(!rotate.load(Ordering::SeqCst));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_oversized_lines_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");
        let writer = RotatingWriter::builder(&path).max_size_bytes(8).build();

        let stats = pump(
            Cursor::new("ok\nthis line is too long\nfine\n"),
            &writer,
            &AtomicBool::new(false),
        )
        .unwrap();

        assert_eq!(stats.lines, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "ok\nfine\n");
    }
}
