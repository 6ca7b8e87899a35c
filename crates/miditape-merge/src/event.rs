//! Typed events and tracks.
//!
//! Every SMF event read from an input file is classified into an [`EventKind`]
//! exactly once. The merger then matches on the kind exhaustively, so a new
//! kind cannot silently fall through.

use midly::num::{u24, u28, u4, u7};
use midly::{MetaMessage, MidiMessage, TrackEvent, TrackEventKind};

/// Largest delta-time an SMF variable-length quantity can hold (28 bits).
pub const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// The kind of a timed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<'a> {
    /// Note-start channel message (velocity zero included).
    NoteOn { channel: u4, key: u7, vel: u7 },
    /// Lyric meta event. Marks the owning track as the lyric track.
    Lyric(&'a [u8]),
    /// End-of-track meta event. Its time value is the event delta.
    Terminator,
    /// Tempo meta event, in microseconds per beat.
    TempoChange(u32),
    /// Any event the merger forwards untouched.
    Other(TrackEventKind<'a>),
    /// Synthetic time-advancing marker inserted by the merger.
    Marker,
}

/// A delta-timed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    /// Ticks since the previous event of the same track.
    pub delta: u32,
    pub kind: EventKind<'a>,
}

impl<'a> Event<'a> {
    pub fn new(delta: u32, kind: EventKind<'a>) -> Self {
        Self { delta, kind }
    }

    /// Creates a synthetic marker spanning `ticks`.
    pub fn marker(ticks: u32) -> Self {
        Self::new(ticks, EventKind::Marker)
    }

    /// Creates an end-of-track event at `ticks` after the previous event.
    pub fn terminator(ticks: u32) -> Self {
        Self::new(ticks, EventKind::Terminator)
    }

    /// Creates a tempo change.
    pub fn tempo_change(delta: u32, us_per_beat: u32) -> Self {
        Self::new(delta, EventKind::TempoChange(us_per_beat))
    }

    /// Creates a note-on on the given channel.
    pub fn note_on(delta: u32, channel: u8, key: u8, vel: u8) -> Self {
        Self::new(
            delta,
            EventKind::NoteOn {
                channel: u4::new(channel),
                key: u7::new(key),
                vel: u7::new(vel),
            },
        )
    }

    /// Returns the tempo carried by a tempo change.
    pub fn tempo(&self) -> Option<u32> {
        match self.kind {
            EventKind::TempoChange(tempo) => Some(tempo),
            _ => None,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self.kind, EventKind::NoteOn { .. })
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, EventKind::Terminator)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, EventKind::Marker)
    }

    /// Classifies a decoded SMF event.
    pub fn classify(event: &TrackEvent<'a>) -> Self {
        let kind = match event.kind {
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            } => EventKind::NoteOn { channel, key, vel },
            TrackEventKind::Meta(MetaMessage::Lyric(text)) => EventKind::Lyric(text),
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => EventKind::Terminator,
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                EventKind::TempoChange(tempo.as_int())
            }
            other => EventKind::Other(other),
        };
        Self::new(event.delta.as_int(), kind)
    }

    /// Encodes this event back into an SMF event.
    ///
    /// Returns `None` when the delta or tempo does not fit its SMF field.
    pub fn to_track_event(&self) -> Option<TrackEvent<'a>> {
        if self.delta > MAX_DELTA {
            return None;
        }
        let kind = match self.kind {
            EventKind::NoteOn { channel, key, vel } => TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            },
            EventKind::Lyric(text) => TrackEventKind::Meta(MetaMessage::Lyric(text)),
            EventKind::Terminator => TrackEventKind::Meta(MetaMessage::EndOfTrack),
            EventKind::TempoChange(tempo) => {
                if tempo > 0x00FF_FFFF {
                    return None;
                }
                TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo)))
            }
            EventKind::Other(kind) => kind,
            EventKind::Marker => TrackEventKind::Meta(MetaMessage::Marker(b"")),
        };
        Some(TrackEvent {
            delta: u28::new(self.delta),
            kind,
        })
    }
}

/// An ordered sequence of events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track<'a> {
    events: Vec<Event<'a>>,
}

impl<'a> Track<'a> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn from_events(events: Vec<Event<'a>>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: Event<'a>) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [Event<'a>] {
        &mut self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event<'a>> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event<'a>> {
        self.events.last()
    }

    /// Sum of all deltas, i.e. the absolute time of the last event.
    pub fn duration(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.delta)).sum()
    }

    /// Number of end-of-track events in this track.
    pub fn terminator_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_terminator()).count()
    }

    /// Returns the marker events, in order.
    pub fn markers(&self) -> impl Iterator<Item = &Event<'a>> {
        self.events.iter().filter(|e| e.is_marker())
    }
}
