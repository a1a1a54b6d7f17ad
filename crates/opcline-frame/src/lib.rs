//! Four-line frame decoder for optical particle counter reports.
//!
//! The instrument emits each measurement as four text lines sharing a
//! one-character frame id:
//! - `C<id>:` and `C<id>;` carry the first two blocks of counts
//! - `c<id>:` leads with a repeated field and ends with a sentinel (160)
//! - `c<id>;` ends with a sentinel (0)
//!
//! A frame is published whole or not at all.

pub mod codec;
pub mod decoder;
pub mod error;
pub mod record;
pub mod role;

pub use codec::{
    decode_lines, parse_lenient, tokenize, FrameConfig, DEFAULT_MAX_FIELDS, FIELDS_COMPACT,
    FIELDS_EXTENDED,
};
pub use decoder::{DecoderStats, FrameDecoder};
pub use error::{FrameError, Result};
pub use record::{MeasurementRecord, OutputRecord};
pub use role::{Role, FRAME_LINES, PREFIX_LEN};
