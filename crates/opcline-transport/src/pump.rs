use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use bytes::{Buf, Bytes};

/// How long a read waits for the pump thread before reporting `WouldBlock`.
pub const DEFAULT_PUMP_TIMEOUT: Duration = Duration::from_millis(100);

const PUMP_CHUNK_SIZE: usize = 1024;

/// Runs a blocking `Read` on a background thread.
///
/// Reads wait at most `timeout` for the next chunk and otherwise fail with
/// `WouldBlock`, which [`LineReader`](crate::LineReader) treats as "no line
/// yet". EOF on the pumped stream is EOF here; a read error is delivered once
/// and then reads report EOF.
///
/// The thread stays parked in the inner `read` until data or EOF arrives, so
/// it outlives the reader when the stream is silent.
pub struct PumpedReader {
    rx: Receiver<std::io::Result<Bytes>>,
    pending: Bytes,
    timeout: Duration,
}

impl PumpedReader {
    /// Move `inner` onto its own thread.
    pub fn spawn<R: Read + Send + 'static>(inner: R, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || pump(inner, tx));
        Self {
            rx,
            pending: Bytes::new(),
            timeout,
        }
    }
}

fn pump<R: Read>(mut inner: R, tx: Sender<std::io::Result<Bytes>>) {
    let mut chunk = [0u8; PUMP_CHUNK_SIZE];
    loop {
        let message = match inner.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => Ok(Bytes::copy_from_slice(&chunk[..n])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => Err(err),
        };
        let failed = message.is_err();
        if tx.send(message).is_err() || failed {
            return;
        }
    }
}

impl Read for PumpedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.timeout) {
                Ok(Ok(bytes)) => self.pending = bytes,
                Ok(Err(err)) => return Err(err),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(std::io::Error::from(ErrorKind::WouldBlock))
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }
}

impl std::fmt::Debug for PumpedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PumpedReader")
            .field("pending", &self.pending.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
