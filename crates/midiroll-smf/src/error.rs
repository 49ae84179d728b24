//! Error types for the MIDI file container.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiFileParse(String),

    #[error("Invalid timing word in MIDI header: {0:#06x}")]
    InvalidTiming(u16),

    #[error("Tick gap too large to encode in track {track} at tick {tick}")]
    TickOverflow { track: usize, tick: u64 },

    #[error("Track {index} out of range ({count} tracks)")]
    TrackOutOfRange { index: usize, count: usize },
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
