//! Per-input tempo tracking.
//!
//! All tempo changes of an input file are assumed to live on one track. The
//! tracker is reset at the start of every input file and follows whatever
//! tempo changes the merger walks past.

use crate::error::{MergeError, MergeResult};
use crate::event::{Event, EventKind};

/// SMF default tempo: 500000 us per beat (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Mutable tempo state of the input file being merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoTracker {
    current: u32,
}

impl TempoTracker {
    pub fn new() -> Self {
        Self {
            current: DEFAULT_TEMPO,
        }
    }

    /// Restores the default tempo.
    pub fn reset(&mut self) {
        self.current = DEFAULT_TEMPO;
    }

    /// Follows `event` if it is a tempo change; any other event is ignored.
    pub fn observe(&mut self, event: &Event<'_>) -> MergeResult<()> {
        if let EventKind::TempoChange(tempo) = event.kind {
            if tempo == 0 {
                return Err(MergeError::InvalidTempo { tempo });
            }
            self.current = tempo;
        }
        Ok(())
    }

    /// Active tempo in microseconds per beat.
    pub fn current(&self) -> u32 {
        self.current
    }
}

impl Default for TempoTracker {
    fn default() -> Self {
        Self::new()
    }
}
