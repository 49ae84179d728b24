//! Centralized error type for the midiroll crate.
//!
//! Wraps container errors so `?` propagates naturally across crate boundaries.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI file: {0}")]
    Smf(#[from] midiroll_smf::Error),

    #[error(
        "Roll tempo {tempo} at {dpi} dpi gives {ticks} ticks per quarter note. Must be between 1 and 32767"
    )]
    InvalidTempoRange { tempo: f64, dpi: f64, ticks: i64 },

    #[error("Invalid metadata pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Metadata key cannot be empty")]
    EmptyKey,

    #[error("{0}")]
    MissingPair(MissingPair),
}

/// A note-on that has no note-off to shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingPair {
    /// Track the note-on belongs to
    pub track: usize,
    pub tick: u64,
    pub channel: u8,
    pub key: u8,
}

impl fmt::Display for MissingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing note-off for key {} on channel {} at tick {} (track {})",
            self.key, self.channel, self.tick, self.track
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
