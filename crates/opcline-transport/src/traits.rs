use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, TransportError};
use crate::pump::{PumpedReader, DEFAULT_PUMP_TIMEOUT};

/// A non-blocking supply of trimmed instrument lines.
///
/// `Ok(None)` means "no line available yet"; it is never an error. Callers
/// decide whether and how long to retry.
pub trait LineSource {
    /// Return the next complete line, trimmed of surrounding whitespace.
    fn try_read_line(&mut self) -> Result<Option<String>>;

    /// True once the source can never yield another line (EOF).
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn try_read_line(&mut self) -> Result<Option<String>> {
        (**self).try_read_line()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// In-memory line queue, mostly useful for replaying captured frames.
impl LineSource for VecDeque<String> {
    fn try_read_line(&mut self) -> Result<Option<String>> {
        Ok(self.pop_front().map(|line| line.trim().to_string()))
    }

    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}

/// A byte stream carrying the instrument's text output.
///
/// Wraps a capture file, the process's stdin, or (with the `serial`
/// feature) a serial port.
pub struct InstrumentStream {
    inner: InstrumentStreamInner,
}

enum InstrumentStreamInner {
    File(File),
    Stdin(PumpedReader),
    #[cfg(feature = "serial")]
    Serial(Box<dyn serialport::SerialPort>),
}

impl Read for InstrumentStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            InstrumentStreamInner::File(file) => file.read(buf),
            InstrumentStreamInner::Stdin(stdin) => stdin.read(buf),
            #[cfg(feature = "serial")]
            InstrumentStreamInner::Serial(port) => port.read(buf),
        }
    }
}

impl InstrumentStream {
    /// Open a capture file for replay.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TransportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened capture file");
        Ok(Self {
            inner: InstrumentStreamInner::File(file),
        })
    }

    /// Read from the process's standard input.
    ///
    /// Stdin is drained on a background thread, so a silent stdin reads as
    /// "no line yet" instead of blocking the caller.
    pub fn stdin() -> Self {
        Self {
            inner: InstrumentStreamInner::Stdin(PumpedReader::spawn(
                std::io::stdin(),
                DEFAULT_PUMP_TIMEOUT,
            )),
        }
    }

    #[cfg(feature = "serial")]
    pub(crate) fn from_serial(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            inner: InstrumentStreamInner::Serial(port),
        }
    }

    /// Short name of the stream kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            InstrumentStreamInner::File(_) => "file",
            InstrumentStreamInner::Stdin(_) => "stdin",
            #[cfg(feature = "serial")]
            InstrumentStreamInner::Serial(_) => "serial",
        }
    }
}

impl std::fmt::Debug for InstrumentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentStream")
            .field("type", &self.kind())
            .finish()
    }
}
