//! Standard MIDI File container for midiroll.
//!
//! Holds a MIDI file as owned tracks of events with absolute ticks, and
//! provides the structural operations the roll layer builds on: note-on/off
//! pairing, joining all tracks into one time-ordered list, splitting back by
//! track affiliation, and sorting. Encoding and decoding use `midly`.
//!
//! # Example
//! ```ignore
//! use midiroll_smf::{MidiEvent, MidiFile};
//!
//! let mut file = MidiFile::new();
//! file.add_event(0, MidiEvent::note_on(0, 0, 60, 100))?;
//! file.add_event(0, MidiEvent::note_off(120, 0, 60, 0))?;
//! file.link_note_pairs();
//! file.save("roll.mid")?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod event;
pub use event::{meta_type, EventKind, EventLocation, MidiEvent};

mod event_list;
pub use event_list::EventList;

mod file;
pub use file::{MidiFile, DEFAULT_TICKS_PER_QUARTER_NOTE, SMPTE_TIMING_FLAG};

mod smf;

pub use midly::{Format, MidiMessage};
