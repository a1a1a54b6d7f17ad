use std::path::PathBuf;

/// Errors that can occur while supplying instrument lines.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the specified capture file or device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port could not be opened or configured.
    #[cfg(feature = "serial")]
    #[error("serial port {path}: {message}")]
    Serial { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, TransportError>;
