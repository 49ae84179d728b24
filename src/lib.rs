//! # midiroll - MIDI files of scanned piano rolls
//!
//! Roll-specific layer on top of a Standard MIDI File.
//!
//! ## Architecture
//!
//! midiroll is an umbrella crate over:
//! - **midiroll-smf** - MIDI file container (tracks, events, note pairing,
//!   join/split, sorting, SMF I/O)
//!
//! and adds to it:
//! - **Roll tempo** - tempo stored in the header's ticks-per-quarter-note field
//! - **Metadata** - `@KEY: value` text events in the first track
//! - **Trackerize** - note-off shifting that emulates a tracker bar
//! - **Roll parameters** - scan resolution along and across the roll
//!
//! ## Quick Start
//!
//! ```ignore
//! use midiroll::prelude::*;
//!
//! let mut roll = MidiRoll::open("roll.mid")?;
//!
//! roll.set_roll_tempo(95.0)?;
//! roll.set_metadata("ROLL_TEMPO", "95")?;
//! println!("{}", roll.metadata("TITLE"));
//!
//! let report = roll.trackerize(20);
//! for missing in &report.missing_pairs {
//!     println!("{missing}");
//! }
//!
//! roll.save("roll-tracked.mid")?;
//! ```

/// Re-export of midiroll-smf for direct access
pub use midiroll_smf as smf;

pub use midiroll_smf::{
    meta_type, EventKind, EventList, EventLocation, Format, MidiEvent, MidiFile, MidiMessage,
};

mod builder;
mod error;
mod metadata;
mod params;
mod roll;
mod tempo;
mod trackerize;

pub use builder::MidiRollBuilder;
pub use error::{Error, MissingPair, Result};
pub use metadata::MetadataEntry;
pub use params::RollParameters;
pub use roll::{MidiRoll, DEFAULT_METADATA_MARKER};
pub use tempo::{tempo_to_ticks, ticks_to_tempo, DEFAULT_DPI, MAX_TICKS_PER_QUARTER_NOTE};
pub use trackerize::TrackerizeReport;

/// Convenience prelude for common imports
pub mod prelude {
    // Roll
    pub use crate::{MidiRoll, MidiRollBuilder, RollParameters, TrackerizeReport};

    // Container
    pub use crate::{EventLocation, MidiEvent, MidiFile};

    // Errors
    pub use crate::{Error, Result};
}
