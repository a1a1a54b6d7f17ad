//! Decode optical particle counter serial reports into numeric records.
//!
//! The instrument prints each measurement as four text lines; opcline
//! checks that they belong together and turns them into one record of
//! survivor fields.
//!
//! # Crate Structure
//!
//! - [`transport`] — Line sources (capture files, stdin, serial ports)
//! - [`frame`] — Four-line frame decoding and the shared measurement record

/// Re-export transport types.
pub mod transport {
    pub use opcline_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use opcline_frame::*;
}
