//! Line roles within a frame.
//!
//! Each of the four lines is identified by the case of its first character
//! and by its separator:
//!
//! | Role | char 0 | char 2 |
//! |------|--------|--------|
//! | 0    | `C`    | `:`    |
//! | 1    | `C`    | `;`    |
//! | 2    | `c`    | `:`    |
//! | 3    | `c`    | `;`    |
//!
//! Char 1 is the frame id.

use std::fmt;

/// Number of lines in one frame.
pub const FRAME_LINES: usize = 4;

/// Marker, frame id and separator.
pub const PREFIX_LEN: usize = 3;

/// Position of a line within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// `C<id>:` opens a frame.
    Opener,
    /// `C<id>;`
    Second,
    /// `c<id>:` starts with a repeated field and ends with sentinel 160.
    Third,
    /// `c<id>;` ends with sentinel 0.
    Closer,
}

impl Role {
    /// All roles in wire order.
    pub const ALL: [Role; FRAME_LINES] = [Role::Opener, Role::Second, Role::Third, Role::Closer];

    /// Ordinal position 0..=3.
    pub fn ordinal(self) -> usize {
        match self {
            Role::Opener => 0,
            Role::Second => 1,
            Role::Third => 2,
            Role::Closer => 3,
        }
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Role> {
        Role::ALL.get(ordinal).copied()
    }

    /// The role expected after this one, if any.
    pub fn next(self) -> Option<Role> {
        Role::from_ordinal(self.ordinal() + 1)
    }

    /// Expected character at index 0.
    pub fn marker(self) -> char {
        match self {
            Role::Opener | Role::Second => 'C',
            Role::Third | Role::Closer => 'c',
        }
    }

    /// Expected character at index 2.
    pub fn separator(self) -> char {
        match self {
            Role::Opener | Role::Third => ':',
            Role::Second | Role::Closer => ';',
        }
    }

    /// Frame id carried by `line` if it has this role's marker and separator.
    ///
    /// A line shorter than three characters never matches.
    pub fn frame_id(self, line: &str) -> Option<char> {
        let mut chars = line.chars();
        let marker = chars.next()?;
        let id = chars.next()?;
        let separator = chars.next()?;
        (marker == self.marker() && separator == self.separator()).then_some(id)
    }

    /// Whether the token at 1-based `position` out of `count` tokens is a
    /// survivor field for this role.
    pub fn keeps(self, position: usize, count: usize) -> bool {
        match self {
            Role::Opener | Role::Second => true,
            Role::Third => position != 1 && position != count,
            Role::Closer => position != count,
        }
    }

    /// The prefix this role expects for the given frame id, e.g. `C7;`.
    pub fn prefix(self, id: char) -> String {
        format!("{}{}{}", self.marker(), id, self.separator())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} ({}_{})",
            self.ordinal(),
            self.marker(),
            self.separator()
        )
    }
}
