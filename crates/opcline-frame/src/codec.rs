use std::time::Duration;

use crate::error::{FrameError, Result};
use crate::record::OutputRecord;
use crate::role::{Role, FRAME_LINES, PREFIX_LEN};

/// Survivor fields reported by the compact instrument variant.
pub const FIELDS_COMPACT: usize = 31;

/// Survivor fields reported by the extended instrument variant.
pub const FIELDS_EXTENDED: usize = 34;

/// Default record capacity, matching the instrument firmware's buffer.
pub const DEFAULT_MAX_FIELDS: usize = 100;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for frame decoding.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Survivor count every frame must have. `None` accepts any count.
    pub expected_fields: Option<usize>,
    /// Hard limit on survivor fields per frame. Default: 100.
    pub max_fields: usize,
    /// How long to keep polling for lines 1-3 once a frame has opened.
    /// Zero makes decoding strictly non-blocking.
    pub line_wait: Duration,
    /// Sleep between polls while waiting for a line.
    pub poll_interval: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            expected_fields: None,
            max_fields: DEFAULT_MAX_FIELDS,
            line_wait: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl FrameConfig {
    /// Configuration for a deployment reporting exactly `fields` survivors.
    pub fn with_expected_fields(fields: usize) -> Self {
        Self {
            expected_fields: Some(fields),
            ..Self::default()
        }
    }
}

/// Parse a decimal integer the way C's `atol` does.
///
/// Leading whitespace and one sign character are accepted, then digits are
/// consumed up to the first non-digit. A token without leading digits is 0.
/// Out-of-range values saturate at the `i32` bounds.
pub fn parse_lenient(token: &str) -> i32 {
    const LIMIT: i64 = i32::MAX as i64 + 1;

    let s = token.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| (acc * 10 + i64::from(b - b'0')).min(LIMIT));

    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Split a payload into its non-empty, space-separated tokens.
pub fn tokenize(payload: &str) -> impl Iterator<Item = &str> {
    payload
        .split(' ')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The line with its 3-character prefix removed.
pub(crate) fn payload(line: &str) -> &str {
    match line.char_indices().nth(PREFIX_LEN) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

/// Check `line` against `role` and, past the opener, the frame id.
///
/// Returns the frame id carried by the line.
pub(crate) fn accept_line(role: Role, frame_id: Option<char>, line: &str) -> Result<char> {
    let found = role.frame_id(line);
    match (found, frame_id) {
        (Some(id), None) => Ok(id),
        (Some(id), Some(expected)) if id == expected => Ok(id),
        _ => Err(FrameError::Sync {
            role,
            frame_id,
            expected: role.prefix(frame_id.unwrap_or('_')),
            found: line.chars().take(PREFIX_LEN).collect(),
        }),
    }
}

/// Append the survivor fields of an accepted line to `values`.
pub(crate) fn append_survivors(
    role: Role,
    frame_id: char,
    line: &str,
    values: &mut Vec<i32>,
    max_fields: usize,
) -> Result<()> {
    let tokens: Vec<&str> = tokenize(payload(line)).collect();
    let count = tokens.len();

    for (idx, token) in tokens.into_iter().enumerate() {
        if !role.keeps(idx + 1, count) {
            continue;
        }
        if values.len() >= max_fields {
            return Err(FrameError::Overflow {
                frame_id,
                max: max_fields,
            });
        }
        values.push(parse_lenient(token));
    }
    Ok(())
}

/// Turn the fields of a fully read frame into a record.
pub(crate) fn finish(
    frame_id: char,
    values: Vec<i32>,
    config: &FrameConfig,
) -> Result<OutputRecord> {
    if let Some(expected) = config.expected_fields {
        if values.len() != expected {
            return Err(FrameError::FieldCount {
                frame_id,
                expected,
                actual: values.len(),
            });
        }
    }
    Ok(OutputRecord::new(frame_id, values))
}

/// Decode one frame from already-collected lines.
///
/// At most the first four lines are examined. Fewer than four lines is an
/// [`FrameError::Incomplete`] frame; a role or id mismatch is
/// [`FrameError::Sync`].
pub fn decode_lines<S: AsRef<str>>(lines: &[S], config: &FrameConfig) -> Result<OutputRecord> {
    let mut frame_id = None;
    let mut values = Vec::new();

    for (role, line) in Role::ALL.iter().zip(lines) {
        let line = line.as_ref().trim();
        let id = accept_line(*role, frame_id, line)?;
        frame_id = Some(id);
        append_survivors(*role, id, line, &mut values, config.max_fields)?;
    }

    match frame_id {
        Some(id) if lines.len() >= FRAME_LINES => finish(id, values, config),
        _ => Err(FrameError::Incomplete {
            frame_id,
            lines_read: lines.len().min(FRAME_LINES),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines: &[&str]) -> Result<OutputRecord> {
        decode_lines(lines, &FrameConfig::default())
    }

    #[test]
    fn lenient_parse_table() {
        let cases = [
            ("12", 12),
            ("12abc", 12),
            ("-7", -7),
            ("+8", 8),
            ("  42", 42),
            ("abc", 0),
            ("abc12", 0),
            ("+", 0),
            ("-", 0),
            ("", 0),
            ("--3", 0),
            ("007", 7),
            ("1.5", 1),
            ("99999999999", i32::MAX),
            ("-99999999999", i32::MIN),
            ("2147483647", i32::MAX),
            ("-2147483648", i32::MIN),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_lenient(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn tokenize_drops_empty_tokens() {
        let tokens: Vec<&str> = tokenize("  1   2 3  ").collect();
        assert_eq!(tokens, vec!["1", "2", "3"]);
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize("   ").count(), 0);
    }

    #[test]
    fn payload_strips_three_chars() {
        assert_eq!(payload("C1:1 2"), "1 2");
        assert_eq!(payload("C1:"), "");
        assert_eq!(payload("C1"), "");
        assert_eq!(payload("Cé:5"), "5");
    }

    #[test]
    fn end_to_end_example() {
        let record = frame(&["C1:1 2 3", "C1;4 5", "c1:100 200 160", "c1;9 0"]).unwrap();
        assert_eq!(record.values(), &[1, 2, 3, 4, 5, 200, 9]);
        assert_eq!(record.frame_id(), '1');
    }

    #[test]
    fn third_line_drops_first_and_last() {
        let record = frame(&["C0:", "C0;", "c0:5 10 15 160", "c0;"]).unwrap();
        assert_eq!(record.values(), &[10, 15]);
    }

    #[test]
    fn closer_drops_last() {
        let record = frame(&["C0:", "C0;", "c0:", "c0;7 8 0"]).unwrap();
        assert_eq!(record.values(), &[7, 8]);
    }

    #[test]
    fn single_token_third_line_contributes_nothing() {
        let record = frame(&["C0:1", "C0;2", "c0:3", "c0;4"]).unwrap();
        assert_eq!(record.values(), &[1, 2]);
    }

    #[test]
    fn survivor_count_formula() {
        let lines = [
            "C4:1 2 3 4 5 6 7 8",
            "C4;9 10 11 12 13 14 15 16",
            "c4:16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 160",
            "c4;32 33 34 0",
        ];
        let counts: Vec<usize> = lines.iter().map(|l| tokenize(payload(l)).count()).collect();
        let expected = counts[0] + counts[1] + (counts[2] - 2) + (counts[3] - 1);

        let record = frame(&lines).unwrap();
        assert_eq!(record.values().len(), expected);
        assert_eq!(record.values().len(), FIELDS_EXTENDED);
        assert_eq!(record.values()[16], 17);
        assert_eq!(*record.values().last().unwrap(), 34);
    }

    #[test]
    fn mismatched_id_is_sync_error() {
        let err = frame(&["C1:1", "C1;2", "c2:3 4 5", "c1;6 0"]).unwrap_err();
        match err {
            FrameError::Sync {
                role,
                frame_id,
                expected,
                found,
            } => {
                assert_eq!(role, Role::Third);
                assert_eq!(frame_id, Some('1'));
                assert_eq!(expected, "c1:");
                assert_eq!(found, "c2:");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_marker_is_sync_error() {
        let err = frame(&["C2:1 2", "D2;3 4", "c2:1 2 3", "c2;4 0"]).unwrap_err();
        assert!(matches!(err, FrameError::Sync { role: Role::Second, .. }));
    }

    #[test]
    fn non_opener_first_line_is_sync_error() {
        let err = frame(&["C1;4 5", "c1:100 200 160", "c1;9 0", "C1:1"]).unwrap_err();
        assert!(matches!(err, FrameError::Sync { role: Role::Opener, .. }));
    }

    #[test]
    fn too_few_lines_is_incomplete() {
        let err = frame(&["C1:1 2 3", "C1;4 5"]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Incomplete {
                frame_id: Some('1'),
                lines_read: 2
            }
        ));

        let err = frame(&[]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Incomplete {
                frame_id: None,
                lines_read: 0
            }
        ));
    }

    #[test]
    fn garbage_tokens_degrade_to_numbers() {
        let record = frame(&["C1:1x y -3", "C1;", "c1:0 5 160", "c1;0"]).unwrap();
        assert_eq!(record.values(), &[1, 0, -3, 5]);
    }

    #[test]
    fn expected_field_count_is_enforced() {
        let lines = ["C1:1 2 3", "C1;4 5", "c1:100 200 160", "c1;9 0"];

        let ok = decode_lines(&lines, &FrameConfig::with_expected_fields(7)).unwrap();
        assert_eq!(ok.values().len(), 7);

        let err = decode_lines(&lines, &FrameConfig::with_expected_fields(FIELDS_COMPACT))
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::FieldCount {
                frame_id: '1',
                expected: 31,
                actual: 7
            }
        ));
    }

    #[test]
    fn overflow_aborts_frame() {
        let config = FrameConfig {
            max_fields: 4,
            ..FrameConfig::default()
        };
        let err =
            decode_lines(&["C1:1 2 3", "C1;4 5", "c1:0 6 160", "c1;0"], &config).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Overflow {
                frame_id: '1',
                max: 4
            }
        ));
    }

    #[test]
    fn same_input_twice_is_identical() {
        let lines = ["C9:5 6", "C9;7", "c9:1 8 160", "c9;9 0"];
        assert_eq!(frame(&lines).unwrap(), frame(&lines).unwrap());
    }

    #[test]
    fn extra_lines_are_ignored() {
        let record = frame(&["C1:1", "C1;2", "c1:0 3 160", "c1;4 0", "C2:99"]).unwrap();
        assert_eq!(record.values(), &[1, 2, 3, 4]);
    }
}
