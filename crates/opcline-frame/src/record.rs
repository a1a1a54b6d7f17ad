use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

/// The survivor fields of one fully decoded frame, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    frame_id: char,
    values: Vec<i32>,
}

impl OutputRecord {
    /// Create a record from already-validated survivor fields.
    pub fn new(frame_id: char, values: Vec<i32>) -> Self {
        Self { frame_id, values }
    }

    /// The frame id shared by the frame's four lines.
    pub fn frame_id(&self) -> char {
        self.frame_id
    }

    /// Survivor fields in wire order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

/// Comma-separated values, the instrument console's format.
impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Slot {
    record: Option<OutputRecord>,
    new_data: bool,
    published: u64,
}

/// Shared hand-off slot between the decoder and its consumers.
///
/// Holds the last fully decoded record and a "new data" flag. Both are
/// updated under one lock, so readers only ever see the initial empty state
/// or a complete record.
#[derive(Debug, Default)]
pub struct MeasurementRecord {
    slot: Mutex<Slot>,
}

impl MeasurementRecord {
    /// An empty slot with the "new data" flag lowered.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stored record and raise the "new data" flag.
    pub fn publish(&self, record: &OutputRecord) {
        let mut slot = self.lock();
        slot.record = Some(record.clone());
        slot.new_data = true;
        slot.published += 1;
    }

    /// Copy of the last published record, leaving the flag untouched.
    pub fn latest(&self) -> Option<OutputRecord> {
        self.lock().record.clone()
    }

    pub fn has_new_data(&self) -> bool {
        self.lock().new_data
    }

    /// Return the record if it has not been taken since its publication,
    /// clearing the flag.
    pub fn take_new(&self) -> Option<OutputRecord> {
        let mut slot = self.lock();
        if !std::mem::take(&mut slot.new_data) {
            return None;
        }
        slot.record.clone()
    }

    /// Number of records published so far.
    pub fn published(&self) -> u64 {
        self.lock().published
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn display_matches_console_format() {
        let record = OutputRecord::new('1', vec![1, 2, 3, 4, 5, 200, 9]);
        assert_eq!(record.to_string(), "1, 2, 3, 4, 5, 200, 9");
        assert_eq!(OutputRecord::new('1', Vec::new()).to_string(), "");
    }

    #[test]
    fn serializes_frame_id_and_values() {
        let record = OutputRecord::new('7', vec![10, 20]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["frame_id"], "7");
        assert_eq!(json["values"], serde_json::json!([10, 20]));
    }

    #[test]
    fn starts_empty() {
        let shared = MeasurementRecord::new();
        assert!(shared.latest().is_none());
        assert!(!shared.has_new_data());
        assert!(shared.take_new().is_none());
        assert_eq!(shared.published(), 0);
    }

    #[test]
    fn publish_sets_flag_and_take_clears_it() {
        let shared = MeasurementRecord::new();
        let record = OutputRecord::new('3', vec![1, 2]);

        shared.publish(&record);
        assert!(shared.has_new_data());
        assert_eq!(shared.take_new(), Some(record.clone()));
        assert!(!shared.has_new_data());
        assert!(shared.take_new().is_none());
        assert_eq!(shared.latest(), Some(record));
        assert_eq!(shared.published(), 1);
    }

    #[test]
    fn later_publish_replaces_record() {
        let shared = MeasurementRecord::new();
        shared.publish(&OutputRecord::new('1', vec![1]));
        shared.publish(&OutputRecord::new('2', vec![2, 2]));

        let latest = shared.take_new().unwrap();
        assert_eq!(latest.frame_id(), '2');
        assert_eq!(latest.values(), &[2, 2]);
        assert_eq!(shared.published(), 2);
    }

    #[test]
    fn readers_never_see_mixed_records() {
        let shared = Arc::new(MeasurementRecord::new());
        let a = OutputRecord::new('a', vec![1; 34]);
        let b = OutputRecord::new('b', vec![2; 34]);

        let writer = {
            let shared = Arc::clone(&shared);
            let (a, b) = (a.clone(), b.clone());
            std::thread::spawn(move || {
                for i in 0..500 {
                    shared.publish(if i % 2 == 0 { &a } else { &b });
                }
            })
        };

        for _ in 0..500 {
            if let Some(seen) = shared.latest() {
                assert!(seen == a || seen == b);
            }
        }
        writer.join().unwrap();
    }
}
