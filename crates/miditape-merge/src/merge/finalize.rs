//! Track termination.

use super::state::{delta_for, MergeState};
use crate::error::{MergeError, MergeResult};
use crate::event::{Event, Track};

/// Consumes the state and terminates every output track exactly once.
///
/// The primary track ends at the cumulative duration; every other track
/// ends right after its last event.
pub(super) fn finalize<'a>(state: MergeState<'a>) -> MergeResult<(Vec<Track<'a>>, u64)> {
    let MergeState {
        cumulative_duration,
        tracks,
        ..
    } = state;

    if tracks.is_empty() {
        return Err(MergeError::EmptyMergeResult);
    }

    let mut tracks = tracks.into_tracks();
    for (index, track) in tracks.iter_mut().enumerate() {
        let ticks = if index == 0 { cumulative_duration } else { 0 };
        let delta = delta_for(index, track.len(), ticks)?;
        track.push(Event::terminator(delta));
    }

    Ok((tracks, cumulative_duration))
}
