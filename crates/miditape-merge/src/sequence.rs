//! Sequences and their Standard MIDI File encoding.

use midly::num::u15;
use midly::{Format, Header, Smf, Timing};

use crate::error::{MergeError, MergeResult};
use crate::event::{Event, Track, MAX_DELTA};
use crate::ticks::rescale_ticks;

/// An ordered list of tracks plus the time base they are expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<'a> {
    pub timing: Timing,
    pub tracks: Vec<Track<'a>>,
}

impl<'a> Sequence<'a> {
    /// Creates a sequence with metrical timing.
    pub fn new(ticks_per_beat: u16, tracks: Vec<Track<'a>>) -> Self {
        Self {
            timing: Timing::Metrical(u15::new(ticks_per_beat)),
            tracks,
        }
    }

    /// Decodes and classifies an SMF held in memory.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, midly::Error> {
        let smf = Smf::parse(bytes)?;
        Ok(Self::from_smf(&smf))
    }

    /// Classifies every event of a decoded SMF.
    pub fn from_smf(smf: &Smf<'a>) -> Self {
        let tracks = smf
            .tracks
            .iter()
            .map(|track| Track::from_events(track.iter().map(Event::classify).collect()))
            .collect();
        Self {
            timing: smf.header.timing,
            tracks,
        }
    }

    /// Ticks per beat, or `None` for SMPTE timecode timing.
    pub fn ticks_per_beat(&self) -> Option<u16> {
        match self.timing {
            Timing::Metrical(tpb) => Some(tpb.as_int()),
            Timing::Timecode(..) => None,
        }
    }

    /// Human-readable description of the time base.
    pub fn describe_timing(&self) -> String {
        match self.timing {
            Timing::Metrical(tpb) => format!("{} ticks per beat", tpb.as_int()),
            Timing::Timecode(fps, subframes) => {
                format!("SMPTE timecode ({:?}, {} subframes)", fps, subframes)
            }
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Returns a copy with every track moved onto a `target` tick grid.
    ///
    /// Positions are rescaled from absolute time, so rounding never
    /// accumulates along a track. Timecode sequences are returned unchanged.
    /// A rescaled delta too large for a variable-length quantity is a
    /// malformed event.
    pub fn rescaled(&self, target: u16) -> MergeResult<Self> {
        let Some(source) = self.ticks_per_beat() else {
            return Ok(self.clone());
        };
        if source == target {
            return Ok(self.clone());
        }

        let mut tracks = Vec::with_capacity(self.tracks.len());
        for (t, track) in self.tracks.iter().enumerate() {
            let mut absolute = 0u64;
            let mut previous = 0u64;
            let mut events = Vec::with_capacity(track.len());
            for (e, event) in track.iter().enumerate() {
                absolute += u64::from(event.delta);
                let position = rescale_ticks(absolute, source, target);
                let delta = position - previous;
                previous = position;
                let delta = u32::try_from(delta)
                    .ok()
                    .filter(|delta| *delta <= MAX_DELTA)
                    .ok_or_else(|| {
                        MergeError::malformed_event(
                            t,
                            e,
                            format!(
                                "delta {} ticks at {} ticks per beat exceeds the SMF maximum",
                                delta, target
                            ),
                        )
                    })?;
                events.push(Event::new(delta, event.kind));
            }
            tracks.push(Track::from_events(events));
        }

        Ok(Self::new(target, tracks))
    }

    /// Builds the SMF representation (format 1).
    pub fn to_smf(&self) -> MergeResult<Smf<'a>> {
        let mut tracks = Vec::with_capacity(self.tracks.len());
        for (t, track) in self.tracks.iter().enumerate() {
            let mut encoded = Vec::with_capacity(track.len());
            for (e, event) in track.iter().enumerate() {
                let event = event.to_track_event().ok_or_else(|| {
                    MergeError::malformed_event(
                        t,
                        e,
                        format!("delta {} does not fit an SMF event", event.delta),
                    )
                })?;
                encoded.push(event);
            }
            tracks.push(encoded);
        }

        Ok(Smf {
            header: Header::new(Format::Parallel, self.timing),
            tracks,
        })
    }

    /// Encodes the sequence as SMF bytes.
    pub fn to_bytes(&self) -> MergeResult<Vec<u8>> {
        let smf = self.to_smf()?;
        let mut out = Vec::new();
        smf.write_std(&mut out).map_err(MergeError::Encode)?;
        Ok(out)
    }
}
