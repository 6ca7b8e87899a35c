//! Error types for the merge engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Stable error identification shared by every miditape error type.
///
/// Codes are stable strings like "MERGE_001" and can be used for
/// programmatic error handling (for example in `--json` output).
pub trait ErrorCode: std::error::Error {
    /// Get the error code for reporting.
    fn code(&self) -> &'static str;

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;
}

/// Errors that can occur while merging sequences.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An input file contributes no tracks.
    #[error("input file {index} contains no tracks")]
    EmptyInputTrackSet { index: usize },

    /// The merged output ended up with zero tracks.
    #[error("merge produced no tracks (were any input files given?)")]
    EmptyMergeResult,

    /// An event carries a delta-time that cannot be represented.
    #[error("malformed event at track {track}, event {event}: {reason}")]
    MalformedEvent {
        track: usize,
        event: usize,
        reason: String,
    },

    /// A tempo value of zero makes tick conversion undefined.
    #[error("invalid tempo {tempo} us/beat (must be positive)")]
    InvalidTempo { tempo: u32 },

    /// A gap or tail duration is negative or not finite.
    #[error("invalid duration {seconds} s (must be a finite, non-negative number)")]
    InvalidDuration { seconds: f64 },

    /// An input's time base differs from the output resolution under the strict policy.
    #[error("input file {index} uses {found}, expected {expected} ticks per beat")]
    ResolutionMismatch {
        index: usize,
        found: String,
        expected: u16,
    },

    /// An input could not be decoded as a Standard MIDI File.
    #[error("failed to parse MIDI input {index}: {message}")]
    Parse { index: usize, message: String },

    /// An input file could not be read.
    #[error("failed to read MIDI input {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The merged sequence could not be encoded.
    #[error("failed to encode merged MIDI: {0}")]
    Encode(#[source] std::io::Error),
}

impl MergeError {
    /// Creates a new malformed event error.
    pub fn malformed_event(track: usize, event: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            track,
            event,
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(index: usize, message: impl ToString) -> Self {
        Self::Parse {
            index,
            message: message.to_string(),
        }
    }
}

impl ErrorCode for MergeError {
    fn code(&self) -> &'static str {
        match self {
            MergeError::EmptyInputTrackSet { .. } => "MERGE_001",
            MergeError::EmptyMergeResult => "MERGE_002",
            MergeError::MalformedEvent { .. } => "MERGE_003",
            MergeError::InvalidTempo { .. } => "MERGE_004",
            MergeError::InvalidDuration { .. } => "MERGE_005",
            MergeError::ResolutionMismatch { .. } => "MERGE_006",
            MergeError::Parse { .. } => "MERGE_007",
            MergeError::ReadInput { .. } => "MERGE_008",
            MergeError::Encode(_) => "MERGE_009",
        }
    }

    fn category(&self) -> &'static str {
        "merge"
    }
}
