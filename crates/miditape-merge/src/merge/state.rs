//! Mutable state owned by a single merge call.

use crate::error::{MergeError, MergeResult};
use crate::event::{Event, Track};
use crate::tempo::TempoTracker;

/// Output tracks addressed by index.
///
/// Tracks are only ever created through [`TrackSet::ensure`], which appends
/// empty tracks up to and including the requested index.
#[derive(Debug, Default)]
pub(crate) struct TrackSet<'a> {
    tracks: Vec<Track<'a>>,
}

impl<'a> TrackSet<'a> {
    /// Creates the track at `index` (and any missing ones below it) if absent.
    ///
    /// Returns `true` when the track at `index` did not exist before.
    pub fn ensure(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            return false;
        }
        self.tracks.resize_with(index + 1, Track::new);
        true
    }

    /// Appends an event to an existing track.
    pub fn push(&mut self, index: usize, event: Event<'a>) {
        self.tracks[index].push(event);
    }

    /// Appends a marker spanning `ticks` to an existing track.
    pub fn push_marker(&mut self, index: usize, ticks: u64) -> MergeResult<()> {
        let delta = delta_for(index, self.tracks[index].len(), ticks)?;
        self.push(index, Event::marker(delta));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn into_tracks(self) -> Vec<Track<'a>> {
        self.tracks
    }
}

/// Narrows an accumulated tick count to an event delta.
pub(crate) fn delta_for(track: usize, event: usize, ticks: u64) -> MergeResult<u32> {
    u32::try_from(ticks).map_err(|_| {
        MergeError::malformed_event(track, event, format!("{} ticks overflow a delta", ticks))
    })
}

/// Accumulators threaded through the whole merge.
#[derive(Debug, Default)]
pub(crate) struct MergeState<'a> {
    /// Running length of the primary track over all merged files and gaps.
    pub cumulative_duration: u64,
    /// Last end-of-track time seen on a lyric track.
    pub lyric_duration: u64,
    pub tempo: TempoTracker,
    pub tracks: TrackSet<'a>,
}

impl<'a> MergeState<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}
