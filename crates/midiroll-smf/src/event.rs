//! Owned MIDI events with absolute tick timestamps.
//!
//! Unlike `midly::TrackEvent`, which borrows from the file buffer and stores
//! delta times, a [`MidiEvent`] owns its payload and carries an absolute tick,
//! the track it belongs to, and an optional link to its paired note event.

use midly::num::u7;
use midly::MidiMessage;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Meta-message type codes.
pub mod meta_type {
    pub const SEQUENCE_NUMBER: u8 = 0x00;
    pub const TEXT: u8 = 0x01;
    pub const COPYRIGHT: u8 = 0x02;
    pub const TRACK_NAME: u8 = 0x03;
    pub const INSTRUMENT_NAME: u8 = 0x04;
    pub const LYRIC: u8 = 0x05;
    pub const MARKER: u8 = 0x06;
    pub const CUE_POINT: u8 = 0x07;
    pub const PROGRAM_NAME: u8 = 0x08;
    pub const DEVICE_NAME: u8 = 0x09;
    pub const MIDI_CHANNEL: u8 = 0x20;
    pub const MIDI_PORT: u8 = 0x21;
    pub const END_OF_TRACK: u8 = 0x2F;
    pub const TEMPO: u8 = 0x51;
    pub const SMPTE_OFFSET: u8 = 0x54;
    pub const TIME_SIGNATURE: u8 = 0x58;
    pub const KEY_SIGNATURE: u8 = 0x59;
    pub const SEQUENCER_SPECIFIC: u8 = 0x7F;
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Channel message. `channel` is 0-15.
    Midi { channel: u8, message: MidiMessage },

    /// Meta message stored as its raw type code and data bytes.
    Meta { meta_type: u8, data: Vec<u8> },

    SysEx(Vec<u8>),

    Escape(Vec<u8>),
}

/// A MIDI event at an absolute tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiEvent {
    /// Absolute time in ticks from the start of the track
    pub tick: u64,

    /// Track the event is affiliated with. Set when the event is added to or
    /// read into a file and when tracks are joined.
    pub(crate) track: usize,

    pub kind: EventKind,

    /// Index of the paired note event inside the same event list
    pub(crate) link: Option<usize>,
}

impl MidiEvent {
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self {
            tick,
            track: 0,
            kind,
            link: None,
        }
    }

    pub fn note_on(tick: u64, channel: u8, key: u8, velocity: u8) -> Self {
        Self::new(
            tick,
            EventKind::Midi {
                channel: channel & 0x0F,
                message: MidiMessage::NoteOn {
                    key: u7::from(key),
                    vel: u7::from(velocity),
                },
            },
        )
    }

    pub fn note_off(tick: u64, channel: u8, key: u8, velocity: u8) -> Self {
        Self::new(
            tick,
            EventKind::Midi {
                channel: channel & 0x0F,
                message: MidiMessage::NoteOff {
                    key: u7::from(key),
                    vel: u7::from(velocity),
                },
            },
        )
    }

    pub fn controller(tick: u64, channel: u8, controller: u8, value: u8) -> Self {
        Self::new(
            tick,
            EventKind::Midi {
                channel: channel & 0x0F,
                message: MidiMessage::Controller {
                    controller: u7::from(controller),
                    value: u7::from(value),
                },
            },
        )
    }

    pub fn meta(tick: u64, meta_type: u8, data: impl Into<Vec<u8>>) -> Self {
        Self::new(
            tick,
            EventKind::Meta {
                meta_type,
                data: data.into(),
            },
        )
    }

    /// Text meta event (type 0x01).
    pub fn text(tick: u64, text: &str) -> Self {
        Self::meta(tick, meta_type::TEXT, text.as_bytes())
    }

    pub(crate) fn with_track(mut self, track: usize) -> Self {
        self.track = track;
        self
    }

    /// Track the event came from. While tracks are joined this is where
    /// [`MidiFile::split_tracks`](crate::MidiFile::split_tracks) will put it.
    #[inline]
    pub fn track(&self) -> usize {
        self.track
    }

    #[inline]
    pub fn is_meta(&self) -> bool {
        matches!(self.kind, EventKind::Meta { .. })
    }

    #[inline]
    pub fn meta_type(&self) -> Option<u8> {
        match self.kind {
            EventKind::Meta { meta_type, .. } => Some(meta_type),
            _ => None,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.meta_type() == Some(meta_type::TEXT)
    }

    #[inline]
    pub fn is_end_of_track(&self) -> bool {
        self.meta_type() == Some(meta_type::END_OF_TRACK)
    }

    /// Note On with a non-zero velocity.
    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Midi {
                message: MidiMessage::NoteOn { vel, .. },
                ..
            } if vel.as_int() > 0
        )
    }

    /// Note Off, or Note On with velocity 0.
    #[inline]
    pub fn is_note_off(&self) -> bool {
        match self.kind {
            EventKind::Midi {
                message: MidiMessage::NoteOff { .. },
                ..
            } => true,
            EventKind::Midi {
                message: MidiMessage::NoteOn { vel, .. },
                ..
            } => vel.as_int() == 0,
            _ => false,
        }
    }

    #[inline]
    pub fn channel(&self) -> Option<u8> {
        match self.kind {
            EventKind::Midi { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Key number of a note or aftertouch message.
    #[inline]
    pub fn key(&self) -> Option<u8> {
        match self.kind {
            EventKind::Midi {
                message:
                    MidiMessage::NoteOn { key, .. }
                    | MidiMessage::NoteOff { key, .. }
                    | MidiMessage::Aftertouch { key, .. },
                ..
            } => Some(key.as_int()),
            _ => None,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        match self.kind {
            EventKind::Midi {
                message: MidiMessage::NoteOn { vel, .. } | MidiMessage::NoteOff { vel, .. },
                ..
            } => Some(vel.as_int()),
            _ => None,
        }
    }

    pub fn meta_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            EventKind::Meta { data, .. } => Some(data.as_slice()),
            _ => None,
        }
    }

    /// Meta payload decoded as UTF-8 (invalid sequences replaced).
    pub fn meta_content(&self) -> Option<Cow<'_, str>> {
        self.meta_bytes().map(String::from_utf8_lossy)
    }

    /// Replace the payload of a meta event, keeping its type and tick.
    /// Returns `false` (and changes nothing) for non-meta events.
    pub fn set_meta_content(&mut self, content: &str) -> bool {
        match &mut self.kind {
            EventKind::Meta { data, .. } => {
                *data = content.as_bytes().to_vec();
                true
            }
            _ => false,
        }
    }

    /// Index of the paired note event in the owning list.
    #[inline]
    pub fn linked_event(&self) -> Option<usize> {
        self.link
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    #[inline]
    pub fn unlink(&mut self) {
        self.link = None;
    }

    /// Tie-break rank for events sharing a tick: meta events first, then
    /// note-offs, then everything else, end-of-track last.
    fn rank(&self) -> u8 {
        if self.is_end_of_track() {
            3
        } else if self.is_meta() {
            0
        } else if self.is_note_off() {
            1
        } else {
            2
        }
    }

    /// Ordering used when sorting a track.
    pub fn time_order(&self, other: &Self) -> Ordering {
        self.tick
            .cmp(&other.tick)
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

/// Position of an event inside a [`MidiFile`](crate::MidiFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventLocation {
    pub track: usize,
    pub index: usize,
}

impl EventLocation {
    pub const fn new(track: usize, index: usize) -> Self {
        Self { track, index }
    }
}
