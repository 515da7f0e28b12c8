//! Adapters for the structured-logging layer

use crate::writer::RotatingWriter;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

impl io::Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(*self, buf).map_err(Into::into)
    }

    // Writes go straight to the file.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shares one [`RotatingWriter`] between a `tracing-subscriber` fmt layer and
/// whoever else needs it, e.g. a signal handler calling `rotate`.
#[derive(Clone)]
pub struct SharedWriter(Arc<RotatingWriter>);

impl SharedWriter {
    pub fn new(writer: RotatingWriter) -> Self {
        Self(Arc::new(writer))
    }

    pub fn writer(&self) -> &RotatingWriter {
        &self.0
    }
}

impl From<Arc<RotatingWriter>> for SharedWriter {
    fn from(writer: Arc<RotatingWriter>) -> Self {
        Self(writer)
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = &'a RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}
