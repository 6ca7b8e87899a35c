//! Gap, tail and alignment padding.

use tracing::trace;

use super::state::MergeState;
use crate::error::MergeResult;
use crate::ticks::{to_ticks, OUTPUT_RESOLUTION};

/// Appends the gap (or tail) that follows track `index` of the current file.
///
/// The primary track carries no marker: its gap is folded into the
/// cumulative duration and ends up in the final terminator.
pub(super) fn insert_gap(
    state: &mut MergeState<'_>,
    index: usize,
    is_lyric: bool,
    seconds: f64,
    this_file_length: &mut u64,
) -> MergeResult<u64> {
    let delta = to_ticks(seconds, state.tempo.current(), OUTPUT_RESOLUTION)?;

    if index == 0 {
        state.cumulative_duration += delta;
        *this_file_length += delta;
    } else if is_lyric {
        state
            .tracks
            .push_marker(index, state.lyric_duration + delta)?;
    } else {
        state.tracks.push_marker(index, delta)?;
    }

    trace!(track = index, is_lyric, delta, "inserted gap");
    Ok(delta)
}

/// Advances every output track the current file did not supply.
pub(super) fn pad_untouched(
    state: &mut MergeState<'_>,
    supplied: usize,
    this_file_length: u64,
) -> MergeResult<()> {
    for index in supplied..state.tracks.len() {
        state.tracks.push_marker(index, this_file_length)?;
        trace!(track = index, ticks = this_file_length, "padded untouched track");
    }
    Ok(())
}
