use std::time::Duration;

use serialport::{DataBits, Parity, StopBits};

use crate::error::{Result, TransportError};
use crate::traits::InstrumentStream;

/// The instrument talks 9600 baud, 8N1.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Open a serial port wired to the instrument's text output.
///
/// `timeout` bounds each read; an expired read surfaces as "no line yet"
/// through [`crate::LineReader`].
pub fn open_serial(path: &str, baud_rate: u32, timeout: Duration) -> Result<InstrumentStream> {
    let port = serialport::new(path, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(timeout)
        .open()
        .map_err(|err| TransportError::Serial {
            path: path.to_string(),
            message: err.to_string(),
        })?;

    tracing::info!(path, baud_rate, ?timeout, "opened serial port");
    Ok(InstrumentStream::from_serial(port))
}

/// Names of the serial ports visible on this machine.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|err| TransportError::Serial {
        path: "*".to_string(),
        message: err.to_string(),
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
