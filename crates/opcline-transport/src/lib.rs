//! Line sources for optical particle counter serial streams.
//!
//! The instrument reports as plain text, one newline-terminated line at a
//! time. This crate turns any byte stream (serial port, capture file, stdin)
//! into a non-blocking supply of trimmed lines:
//! - [`LineSource`] is the capability the frame decoder consumes
//! - [`LineReader`] buffers a `Read` stream and splits it into lines
//! - [`InstrumentStream`] unifies the concrete byte streams
//! - [`PumpedReader`] keeps a blocking stream such as stdin from stalling reads
//!
//! Serial port support lives behind the `serial` feature.

pub mod error;
pub mod lines;
pub mod pump;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use lines::{LineReader, ReaderConfig, DEFAULT_MAX_LINE_LEN};
pub use pump::{PumpedReader, DEFAULT_PUMP_TIMEOUT};
pub use traits::{InstrumentStream, LineSource};

#[cfg(feature = "serial")]
pub use serial::{available_ports, open_serial, DEFAULT_BAUD_RATE};
