//! The piano-roll MIDI file.

use crate::builder::MidiRollBuilder;
use crate::error::Result;
use crate::params::RollParameters;
use midiroll_smf::{EventLocation, MidiEvent, MidiFile};
use std::io::{Read, Write};
use std::path::Path;

/// Prefix of roll metadata text events unless changed.
pub const DEFAULT_METADATA_MARKER: &str = "@";

/// A MIDI file holding a scanned piano roll.
///
/// Wraps a [`MidiFile`] and adds the roll-specific layer: tempo stored in the
/// header's ticks-per-quarter-note field, `key: value` metadata embedded as
/// marked text events, tracker-bar emulation, and the scan resolution of the
/// source image.
///
/// # Example
/// ```ignore
/// use midiroll::MidiRoll;
///
/// let mut roll = MidiRoll::open("roll.mid")?;
/// roll.set_roll_tempo(95.0)?;
/// roll.set_metadata("ROLL_TEMPO", "95")?;
/// roll.trackerize(20);
/// roll.save("roll-tracked.mid")?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MidiRoll {
    pub(crate) file: MidiFile,
    pub(crate) params: RollParameters,
    pub(crate) marker: String,
}

impl Default for MidiRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MidiFile> for MidiRoll {
    fn from(file: MidiFile) -> Self {
        Self {
            file,
            params: RollParameters::default(),
            marker: DEFAULT_METADATA_MARKER.to_string(),
        }
    }
}

impl MidiRoll {
    /// Empty roll with one track.
    pub fn new() -> Self {
        Self::from(MidiFile::new())
    }

    pub fn builder() -> MidiRollBuilder {
        MidiRollBuilder::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from(MidiFile::open(path)?))
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self::from(MidiFile::parse(data)?))
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from(MidiFile::read_from(reader)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.file.save(path)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.file.to_bytes()?)
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        Ok(self.file.write_to(out)?)
    }

    #[inline]
    pub fn file(&self) -> &MidiFile {
        &self.file
    }

    #[inline]
    pub fn file_mut(&mut self) -> &mut MidiFile {
        &mut self.file
    }

    /// Drop the roll layer and return the underlying file.
    pub fn into_inner(self) -> MidiFile {
        self.file
    }

    /// Replace the underlying file, keeping parameters and marker.
    pub fn set_file(&mut self, file: MidiFile) {
        self.file = file;
    }

    pub fn event(&self, location: EventLocation) -> Option<&MidiEvent> {
        self.file.event(location)
    }

    pub fn metadata_marker(&self) -> &str {
        &self.marker
    }

    pub fn set_metadata_marker(&mut self, marker: impl Into<String>) {
        self.marker = marker.into();
    }
}
