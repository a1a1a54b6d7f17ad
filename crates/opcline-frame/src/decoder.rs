use std::time::{Duration, Instant};

use opcline_transport::LineSource;
use serde::Serialize;

use crate::codec::{accept_line, append_survivors, finish, FrameConfig};
use crate::error::{FrameError, Result};
use crate::record::{MeasurementRecord, OutputRecord};
use crate::role::Role;

/// Running totals kept by a [`FrameDecoder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    /// Lines taken from the source.
    pub lines_read: u64,
    /// Frames decoded and returned.
    pub frames_decoded: u64,
    /// Frames dropped for a wrong marker or frame id.
    pub sync_errors: u64,
    /// Frames dropped because lines stopped arriving.
    pub incomplete: u64,
    /// Frames dropped for a wrong field count or capacity overflow.
    pub rejected: u64,
}

impl DecoderStats {
    /// Frames dropped for any reason.
    pub fn frames_dropped(&self) -> u64 {
        self.sync_errors + self.incomplete + self.rejected
    }
}

/// Reassembles four-line frames from a [`LineSource`].
///
/// Every call to [`decode`](Self::decode) is an independent attempt: it
/// starts from an empty record, reads at most four lines and never resumes a
/// frame abandoned by an earlier call.
pub struct FrameDecoder<S> {
    source: S,
    config: FrameConfig,
    stats: DecoderStats,
}

impl<S: LineSource> FrameDecoder<S> {
    /// Create a new frame decoder with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    /// Create a new frame decoder with explicit configuration.
    pub fn with_config(source: S, config: FrameConfig) -> Self {
        Self {
            source,
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Attempt to decode one frame.
    ///
    /// Returns `Ok(None)` without consuming anything when no line is pending.
    /// A line that does not open a frame is consumed and reported as
    /// [`FrameError::Sync`]; the next call starts over with the next line.
    pub fn decode(&mut self) -> Result<Option<OutputRecord>> {
        let Some(first) = self.next_line()? else {
            return Ok(None);
        };

        let result = self.assemble(&first);
        match &result {
            Ok(record) => {
                self.stats.frames_decoded += 1;
                tracing::debug!(
                    frame_id = %record.frame_id(),
                    fields = record.values().len(),
                    "decoded frame"
                );
            }
            Err(err) => self.note_dropped(err),
        }
        result.map(Some)
    }

    /// Decode one frame and publish it to `shared` on success.
    ///
    /// Dropped frames leave `shared` untouched and return `Ok(false)`; only
    /// line source failures are returned as errors.
    pub fn poll(&mut self, shared: &MeasurementRecord) -> Result<bool> {
        match self.decode() {
            Ok(Some(record)) => {
                shared.publish(&record);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) if err.is_recoverable() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn assemble(&mut self, first: &str) -> Result<OutputRecord> {
        let mut values = Vec::new();
        let mut role = Role::Opener;
        let frame_id = accept_line(role, None, first)?;
        append_survivors(role, frame_id, first, &mut values, self.config.max_fields)?;

        while let Some(next) = role.next() {
            role = next;
            let line = self.wait_for_line(frame_id, role.ordinal())?;
            accept_line(role, Some(frame_id), &line)?;
            append_survivors(role, frame_id, &line, &mut values, self.config.max_fields)?;
        }

        finish(frame_id, values, &self.config)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let line = self.source.try_read_line()?;
        if let Some(line) = &line {
            self.stats.lines_read += 1;
            tracing::debug!(line = %line, "instrument line");
        }
        Ok(line)
    }

    /// Poll the source until a line arrives or `line_wait` runs out.
    ///
    /// A `line_wait` too large to add to the current instant never expires.
    fn wait_for_line(&mut self, frame_id: char, lines_read: usize) -> Result<String> {
        let deadline = Instant::now().checked_add(self.config.line_wait);
        loop {
            if let Some(line) = self.next_line()? {
                return Ok(line);
            }

            let now = Instant::now();
            let remaining = deadline.map(|deadline| deadline.saturating_duration_since(now));
            if self.source.is_exhausted() || remaining == Some(Duration::ZERO) {
                return Err(FrameError::Incomplete {
                    frame_id: Some(frame_id),
                    lines_read,
                });
            }
            let nap = match remaining {
                Some(remaining) => self.config.poll_interval.min(remaining),
                None => self.config.poll_interval,
            };
            std::thread::sleep(nap);
        }
    }

    fn note_dropped(&mut self, err: &FrameError) {
        match err {
            FrameError::Sync { .. } => self.stats.sync_errors += 1,
            FrameError::Incomplete { .. } => self.stats.incomplete += 1,
            FrameError::FieldCount { .. } | FrameError::Overflow { .. } => {
                self.stats.rejected += 1
            }
            FrameError::Transport(_) => return,
        }
        tracing::warn!(
            reason = err.reason(),
            frame_id = ?err.frame_id(),
            error = %err,
            "dropping frame"
        );
    }

    /// True once the source can never yield another line.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    /// Running totals since the decoder was created.
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Current frame decoding configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Borrow the line source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the line source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the decoder and return the line source.
    pub fn into_inner(self) -> S {
        self.source
    }
}
