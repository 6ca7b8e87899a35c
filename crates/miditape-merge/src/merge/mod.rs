//! The multi-track merge.
//!
//! Input files are merged in order. Track `i` of every input lands on output
//! track `i`; the primary track (index 0) accumulates the total running time,
//! which is written into its terminator at the very end. Other tracks are kept
//! in step with markers:
//!
//! - after each file, every touched track gets a gap marker (a tail marker for
//!   the last file);
//! - every output track a file does not supply is padded by that file's
//!   primary-track length;
//! - a track that first shows up in a later file gets a marker spanning all
//!   earlier files right before its first note.

mod finalize;
mod gap;
mod state;


use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::event::EventKind;
use crate::sequence::Sequence;
use crate::ticks::OUTPUT_RESOLUTION;
use state::MergeState;

/// Summary of one merged input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Position of the file in the input list.
    pub index: usize,
    /// Number of tracks the file supplied.
    pub track_count: usize,
    /// Primary-track ticks this file added, gap or tail included.
    pub length_ticks: u64,
    /// Gap (or tail) ticks appended after the file.
    pub gap_ticks: u64,
    /// Tempo in effect when the file's gap was computed.
    pub tempo: u32,
    /// Time base of the file as merged; `None` for SMPTE timing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks_per_beat: Option<u16>,
}

/// Summary of a whole merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Number of output tracks.
    pub track_count: usize,
    /// Final primary-track duration in ticks.
    pub total_ticks: u64,
    /// Output resolution in ticks per beat.
    pub resolution: u16,
    /// Per-input summaries, in input order.
    pub files: Vec<FileSummary>,
}

/// A merged sequence and its report.
#[derive(Debug, Clone)]
pub struct Merged<'a> {
    pub sequence: Sequence<'a>,
    pub report: MergeReport,
}

/// Merges `inputs`, in order, into one sequence at the output resolution.
///
/// Input ticks are taken as they are; apply a resolution policy beforehand
/// (see [`crate::prepare_inputs`]) to rescale or reject other time bases.
///
/// # Errors
///
/// Fails fast, without partial output, when an input has no tracks, a tempo
/// change is zero, the configured durations are invalid, or an accumulated
/// time no longer fits an event delta.
pub fn merge_sequences<'a>(
    inputs: &[Sequence<'a>],
    config: &MergeConfig,
) -> MergeResult<Merged<'a>> {
    config.validate()?;

    let mut state = MergeState::new();
    let mut files = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let is_last = index + 1 == inputs.len();
        let seconds = if is_last {
            config.tail_secs
        } else {
            config.gap_secs
        };
        files.push(merge_file(&mut state, index, input, seconds)?);
    }

    let (tracks, total_ticks) = finalize::finalize(state)?;
    debug!(
        tracks = tracks.len(),
        total_ticks,
        files = files.len(),
        "merge finished"
    );

    let report = MergeReport {
        track_count: tracks.len(),
        total_ticks,
        resolution: OUTPUT_RESOLUTION,
        files,
    };
    Ok(Merged {
        sequence: Sequence::new(OUTPUT_RESOLUTION, tracks),
        report,
    })
}

/// Merges a single input file into the running state.
fn merge_file<'a>(
    state: &mut MergeState<'a>,
    file: usize,
    input: &Sequence<'a>,
    gap_seconds: f64,
) -> MergeResult<FileSummary> {
    if input.tracks.is_empty() {
        return Err(MergeError::EmptyInputTrackSet { index: file });
    }

    state.tempo.reset();
    let end_of_last = state.cumulative_duration;
    let mut this_file_length = 0u64;
    let mut gap_ticks = 0u64;

    debug!(
        file,
        tracks = input.tracks.len(),
        end_of_last,
        "merging input file"
    );

    for (index, track) in input.tracks.iter().enumerate() {
        let created = state.tracks.ensure(index);
        let mut needs_padding = created && file > 0 && index > 0;
        let mut is_lyric = false;

        for event in track.iter() {
            match event.kind {
                EventKind::Lyric(_) => is_lyric = true,
                EventKind::Terminator => {
                    let ticks = u64::from(event.delta);
                    if is_lyric {
                        state.lyric_duration = ticks;
                    } else if index == 0 {
                        this_file_length = ticks;
                        state.cumulative_duration += ticks;
                    }
                }
                EventKind::TempoChange(_) => {
                    state.tempo.observe(event)?;
                    state.tracks.push(index, *event);
                }
                EventKind::NoteOn { .. } if needs_padding => {
                    needs_padding = false;
                    state.tracks.push_marker(index, end_of_last)?;
                    state.tracks.push(index, *event);
                }
                EventKind::NoteOn { .. } | EventKind::Other(_) | EventKind::Marker => {
                    state.tracks.push(index, *event);
                }
            }
        }

        let delta = gap::insert_gap(state, index, is_lyric, gap_seconds, &mut this_file_length)?;
        if index == 0 {
            gap_ticks = delta;
        }
    }

    gap::pad_untouched(state, input.tracks.len(), this_file_length)?;

    Ok(FileSummary {
        index: file,
        track_count: input.tracks.len(),
        length_ticks: this_file_length,
        gap_ticks,
        tempo: state.tempo.current(),
        ticks_per_beat: input.ticks_per_beat(),
    })
}
