use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::error::{Result, TransportError};
use crate::traits::LineSource;

/// Default longest accepted line: 4 KiB.
pub const DEFAULT_MAX_LINE_LEN: usize = 4 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Configuration for [`LineReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Lines longer than this are dropped. Default: 4 KiB.
    pub max_line_len: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Splits any `Read` stream into trimmed, newline-terminated lines.
///
/// Reads that fail with `WouldBlock` or `TimedOut` (a serial port with a read
/// timeout, a non-blocking pipe) are reported as "no line yet". Invalid UTF-8
/// is replaced rather than rejected.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: ReaderConfig,
    exhausted: bool,
    discarding: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            exhausted: false,
            discarding: false,
        }
    }

    /// Read the next complete line.
    ///
    /// Returns `Ok(None)` when no full line is available yet, or when the
    /// stream has reached EOF and every buffered line has been returned.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.next_buffered_line() {
                return Ok(Some(line));
            }

            if self.exhausted {
                return Ok(self.take_fragment());
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                tracing::debug!(buffered = self.buf.len(), "line stream reached EOF");
                self.exhausted = true;
                continue;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn next_buffered_line(&mut self) -> Option<String> {
        loop {
            match self.buf.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let raw = self.buf.split_to(pos + 1);
                    if std::mem::take(&mut self.discarding) {
                        continue;
                    }
                    if pos > self.config.max_line_len {
                        warn_oversized(pos, self.config.max_line_len);
                        continue;
                    }
                    return Some(decode_line(&raw));
                }
                None => {
                    if self.buf.len() > self.config.max_line_len {
                        warn_oversized(self.buf.len(), self.config.max_line_len);
                        self.buf.clear();
                        self.discarding = true;
                    }
                    return None;
                }
            }
        }
    }

    /// An unterminated tail at EOF is still a line.
    fn take_fragment(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let raw = self.buf.split();
        if std::mem::take(&mut self.discarding) {
            return None;
        }
        Some(decode_line(&raw))
    }

    /// True once EOF was seen and all buffered lines have been returned.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buf.is_empty()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: Read> LineSource for LineReader<T> {
    fn try_read_line(&mut self) -> Result<Option<String>> {
        self.read_line()
    }

    fn is_exhausted(&self) -> bool {
        LineReader::is_exhausted(self)
    }
}

fn warn_oversized(len: usize, max: usize) {
    tracing::warn!(len, max, "dropping oversized line");
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}
