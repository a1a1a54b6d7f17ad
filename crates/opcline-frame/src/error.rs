use crate::role::Role;

/// Errors that can occur while decoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A line carried the wrong marker or a different frame id.
    #[error("frame sync lost at {role}: expected {expected}, got {found:?}")]
    Sync {
        role: Role,
        frame_id: Option<char>,
        expected: String,
        found: String,
    },

    /// The line source ran dry before all four lines arrived.
    #[error("incomplete frame ({lines_read} of 4 lines)")]
    Incomplete {
        frame_id: Option<char>,
        lines_read: usize,
    },

    /// The frame decoded to a different number of fields than configured.
    #[error("frame {frame_id} has {actual} fields, expected {expected}")]
    FieldCount {
        frame_id: char,
        expected: usize,
        actual: usize,
    },

    /// The frame carries more fields than the record can hold.
    #[error("frame {frame_id} exceeds record capacity of {max} fields")]
    Overflow { frame_id: char, max: usize },

    /// The line source failed.
    #[error("line source error: {0}")]
    Transport(#[from] opcline_transport::TransportError),
}

impl FrameError {
    /// Whether the decoder can simply wait for the next opener line.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FrameError::Transport(_))
    }

    /// Id of the dropped frame, once its opener has been read.
    pub fn frame_id(&self) -> Option<char> {
        match self {
            FrameError::Sync { frame_id, .. } | FrameError::Incomplete { frame_id, .. } => {
                *frame_id
            }
            FrameError::FieldCount { frame_id, .. } | FrameError::Overflow { frame_id, .. } => {
                Some(*frame_id)
            }
            FrameError::Transport(_) => None,
        }
    }

    /// Short reason label used in diagnostics and statistics.
    pub fn reason(&self) -> &'static str {
        match self {
            FrameError::Sync { .. } => "sync",
            FrameError::Incomplete { .. } => "incomplete",
            FrameError::FieldCount { .. } => "field_count",
            FrameError::Overflow { .. } => "overflow",
            FrameError::Transport(_) => "transport",
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_id_is_reported_when_known() {
        let sync = FrameError::Sync {
            role: Role::Opener,
            frame_id: None,
            expected: "C_:".to_string(),
            found: "c1;".to_string(),
        };
        assert_eq!(sync.frame_id(), None);

        let incomplete = FrameError::Incomplete {
            frame_id: Some('4'),
            lines_read: 3,
        };
        assert_eq!(incomplete.frame_id(), Some('4'));

        let overflow = FrameError::Overflow {
            frame_id: 'x',
            max: 100,
        };
        assert_eq!(overflow.frame_id(), Some('x'));
        assert_eq!(overflow.reason(), "overflow");
        assert_eq!(
            overflow.to_string(),
            "frame x exceeds record capacity of 100 fields"
        );
    }
}
