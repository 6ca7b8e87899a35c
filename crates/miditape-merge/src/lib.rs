//! miditape merge engine - Standard MIDI File concatenation
//!
//! This crate merges an ordered list of Standard MIDI Files into a single
//! format 1 file at 384 ticks per beat, keeping every track aligned in time
//! and separating consecutive inputs with tempo-aware gaps.
//!
//! # How files are joined
//!
//! - Track `i` of every input is appended to output track `i`.
//! - The primary track (index 0) accumulates the running time of every input
//!   plus its gap; that total becomes the primary track's terminator.
//! - Other tracks advance through synthetic markers: gap markers after each
//!   input, padding markers for inputs that do not supply the track, and an
//!   alignment marker before the first note of a track that only appears in a
//!   later input.
//! - A track carrying lyric events keeps its own end time, which is folded into
//!   its gap marker.
//! - Every output track ends with exactly one end-of-track event.
//!
//! Gap and tail lengths are given in seconds and converted to ticks with the
//! tempo in effect for the input they follow. The tempo resets to 500000 us per
//! beat at the start of each input.
//!
//! # Determinism
//!
//! Merging is a pure in-memory transform. The same inputs and configuration
//! always produce byte-identical output; [`MergedFile::hash`] carries a BLAKE3
//! digest of the encoded bytes for checking this.
//!
//! # Example
//!
//! ```ignore
//! use miditape_merge::{merge_files, MergeConfig};
//!
//! let config = MergeConfig::default().gap_secs(1.5);
//! let merged = merge_files(&["intro.mid", "verse.mid"], &config)?;
//!
//! std::fs::write("joined.mid", &merged.bytes)?;
//! println!("{} tracks, {} ticks", merged.report.track_count, merged.report.total_ticks);
//! ```
//!
//! # Module Structure
//!
//! - [`event`]: Typed events and tracks
//! - [`sequence`]: Sequences and SMF encoding
//! - [`tempo`]: Per-input tempo tracking
//! - [`ticks`]: Seconds to ticks conversion
//! - [`merge`]: The merge algorithm
//! - [`input`]: Loading files and whole-file merging
//! - [`config`]: Merge configuration
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod merge;
pub mod sequence;
pub mod tempo;
pub mod ticks;

// Re-export main types
pub use config::{MergeConfig, ResolutionPolicy, DEFAULT_GAP_SECS, DEFAULT_TAIL_SECS};
pub use error::{ErrorCode, MergeError, MergeResult};
pub use event::{Event, EventKind, Track};
pub use input::{
    load_inputs, merge_files, merge_inputs, parse_inputs, prepare_inputs, InputFile, MergedFile,
};
pub use merge::{merge_sequences, FileSummary, MergeReport, Merged};
pub use sequence::Sequence;
pub use tempo::{TempoTracker, DEFAULT_TEMPO};
pub use ticks::{to_ticks, OUTPUT_RESOLUTION};

/// Crate version for report identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
