//! Standard MIDI File reading and writing.
//!
//! Parsing goes through `midly` and converts each track from delta times to
//! absolute ticks with owned payloads. Writing converts back, emitting events
//! in time order and terminating every track with an end-of-track marker.

use crate::error::{Error, Result};
use crate::event::{meta_type, EventKind, MidiEvent};
use crate::event_list::EventList;
use crate::file::{MidiFile, SMPTE_TIMING_FLAG};
use midly::num::{u15, u28};
use midly::{Fps, Format, Header, MetaMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Largest delta time representable in a track chunk (28-bit VLQ).
const MAX_DELTA: u64 = 0x0FFF_FFFF;

impl MidiFile {
    /// Load and parse a MIDI file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data)
    }

    /// Parse MIDI file from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_quarter_note = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int(),
            Timing::Timecode(fps, subframes) => timecode_word(fps, subframes),
        };

        debug!(
            "Parsing MIDI file: {} tracks, timing word {}",
            smf.tracks.len(),
            ticks_per_quarter_note
        );

        let mut tracks: Vec<EventList> = smf
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| Self::import_track(index, track))
            .collect();
        if tracks.is_empty() {
            tracks.push(EventList::new());
        }

        Ok(Self {
            tracks,
            ticks_per_quarter_note,
            format: smf.header.format,
            joined_from: None,
        })
    }

    /// Save to disk, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write_to(&mut data)?;
        Ok(data)
    }

    /// Encode as a Standard MIDI File.
    ///
    /// Stored event order is left untouched; each track is written in
    /// [`MidiEvent::time_order`].
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let timing = self.timing()?;
        let format = if self.format == Format::SingleTrack && self.tracks.len() > 1 {
            Format::Parallel
        } else {
            self.format
        };

        let tracks = self
            .tracks
            .iter()
            .enumerate()
            .map(|(index, list)| Self::export_track(index, list))
            .collect::<Result<Vec<_>>>()?;

        let smf = Smf {
            header: Header::new(format, timing),
            tracks,
        };
        smf.write_std(out)?;
        Ok(())
    }

    fn timing(&self) -> Result<Timing> {
        let word = self.ticks_per_quarter_note;
        if word < SMPTE_TIMING_FLAG {
            return Ok(Timing::Metrical(u15::from(word)));
        }

        let [high, subframes] = word.to_be_bytes();
        let fps = match (high as i8).wrapping_neg() {
            24 => Fps::Fps24,
            25 => Fps::Fps25,
            29 => Fps::Fps29,
            30 => Fps::Fps30,
            _ => return Err(Error::InvalidTiming(word)),
        };
        Ok(Timing::Timecode(fps, subframes))
    }

    fn import_track(index: usize, track: &Track) -> EventList {
        let mut events = EventList::with_capacity(track.len());
        let mut tick = 0u64;

        for event in track.iter() {
            tick += u64::from(event.delta.as_int());

            let kind = match &event.kind {
                TrackEventKind::Midi { channel, message } => EventKind::Midi {
                    channel: channel.as_int(),
                    message: *message,
                },
                // Re-emitted on write
                TrackEventKind::Meta(MetaMessage::EndOfTrack) => continue,
                TrackEventKind::Meta(meta) => {
                    let (meta_type, data) = encode_meta(meta);
                    EventKind::Meta { meta_type, data }
                }
                TrackEventKind::SysEx(data) => EventKind::SysEx(data.to_vec()),
                TrackEventKind::Escape(data) => EventKind::Escape(data.to_vec()),
            };

            events.push(MidiEvent::new(tick, kind).with_track(index));
        }

        events
    }

    fn export_track(index: usize, list: &EventList) -> Result<Vec<TrackEvent<'_>>> {
        let mut ordered: Vec<&MidiEvent> = list.iter().collect();
        ordered.sort_by(|a, b| a.time_order(b));

        let mut track = Vec::with_capacity(ordered.len() + 1);
        let mut last_tick = 0u64;

        for event in ordered {
            if event.is_end_of_track() {
                continue;
            }

            let delta = event.tick - last_tick;
            if delta > MAX_DELTA {
                return Err(Error::TickOverflow {
                    track: index,
                    tick: event.tick,
                });
            }

            track.push(TrackEvent {
                delta: u28::from(delta as u32),
                kind: decode_kind(&event.kind),
            });
            last_tick = event.tick;
        }

        track.push(TrackEvent {
            delta: u28::from(0u32),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        Ok(track)
    }
}

/// Raw header word for SMPTE timing: negative frame rate in the high byte,
/// subframes per frame in the low byte.
fn timecode_word(fps: Fps, subframes: u8) -> u16 {
    let rate: i8 = match fps {
        Fps::Fps24 => 24,
        Fps::Fps25 => 25,
        Fps::Fps29 => 29,
        Fps::Fps30 => 30,
    };
    u16::from_be_bytes([rate.wrapping_neg() as u8, subframes])
}

fn fps_bits(fps: Fps) -> u8 {
    match fps {
        Fps::Fps24 => 0,
        Fps::Fps25 => 1,
        Fps::Fps29 => 2,
        Fps::Fps30 => 3,
    }
}

/// Flatten a parsed meta message into its type code and data bytes.
fn encode_meta(meta: &MetaMessage) -> (u8, Vec<u8>) {
    match meta {
        MetaMessage::TrackNumber(number) => (
            meta_type::SEQUENCE_NUMBER,
            number.map(|n| n.to_be_bytes().to_vec()).unwrap_or_default(),
        ),
        MetaMessage::Text(data) => (meta_type::TEXT, data.to_vec()),
        MetaMessage::Copyright(data) => (meta_type::COPYRIGHT, data.to_vec()),
        MetaMessage::TrackName(data) => (meta_type::TRACK_NAME, data.to_vec()),
        MetaMessage::InstrumentName(data) => (meta_type::INSTRUMENT_NAME, data.to_vec()),
        MetaMessage::Lyric(data) => (meta_type::LYRIC, data.to_vec()),
        MetaMessage::Marker(data) => (meta_type::MARKER, data.to_vec()),
        MetaMessage::CuePoint(data) => (meta_type::CUE_POINT, data.to_vec()),
        MetaMessage::ProgramName(data) => (meta_type::PROGRAM_NAME, data.to_vec()),
        MetaMessage::DeviceName(data) => (meta_type::DEVICE_NAME, data.to_vec()),
        MetaMessage::MidiChannel(channel) => (meta_type::MIDI_CHANNEL, vec![channel.as_int()]),
        MetaMessage::MidiPort(port) => (meta_type::MIDI_PORT, vec![port.as_int()]),
        MetaMessage::EndOfTrack => (meta_type::END_OF_TRACK, Vec::new()),
        MetaMessage::Tempo(tempo) => (meta_type::TEMPO, tempo.as_int().to_be_bytes()[1..].to_vec()),
        MetaMessage::SmpteOffset(time) => (
            meta_type::SMPTE_OFFSET,
            vec![
                (fps_bits(time.fps()) << 5) | time.hour(),
                time.minute(),
                time.second(),
                time.frame(),
                time.subframe(),
            ],
        ),
        MetaMessage::TimeSignature(numerator, denominator, clocks, notated) => (
            meta_type::TIME_SIGNATURE,
            vec![*numerator, *denominator, *clocks, *notated],
        ),
        MetaMessage::KeySignature(accidentals, minor) => (
            meta_type::KEY_SIGNATURE,
            vec![*accidentals as u8, u8::from(*minor)],
        ),
        MetaMessage::SequencerSpecific(data) => (meta_type::SEQUENCER_SPECIFIC, data.to_vec()),
        MetaMessage::Unknown(kind, data) => (*kind, data.to_vec()),
    }
}

/// Borrowing conversion back to `midly` for writing.
fn decode_kind(kind: &EventKind) -> TrackEventKind<'_> {
    match kind {
        EventKind::Midi { channel, message } => TrackEventKind::Midi {
            channel: (*channel).into(),
            message: *message,
        },
        EventKind::Meta { meta_type, data } => TrackEventKind::Meta(decode_meta(*meta_type, data)),
        EventKind::SysEx(data) => TrackEventKind::SysEx(data),
        EventKind::Escape(data) => TrackEventKind::Escape(data),
    }
}

fn decode_meta(kind: u8, data: &[u8]) -> MetaMessage<'_> {
    match kind {
        meta_type::TEXT => MetaMessage::Text(data),
        meta_type::COPYRIGHT => MetaMessage::Copyright(data),
        meta_type::TRACK_NAME => MetaMessage::TrackName(data),
        meta_type::INSTRUMENT_NAME => MetaMessage::InstrumentName(data),
        meta_type::LYRIC => MetaMessage::Lyric(data),
        meta_type::MARKER => MetaMessage::Marker(data),
        meta_type::CUE_POINT => MetaMessage::CuePoint(data),
        meta_type::PROGRAM_NAME => MetaMessage::ProgramName(data),
        meta_type::DEVICE_NAME => MetaMessage::DeviceName(data),
        meta_type::SEQUENCER_SPECIFIC => MetaMessage::SequencerSpecific(data),
        // Structured types keep their original bytes
        _ => MetaMessage::Unknown(kind, data),
    }
}
