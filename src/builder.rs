//! Builder for configuring and constructing a `MidiRoll`.

use crate::params::RollParameters;
use crate::roll::{MidiRoll, DEFAULT_METADATA_MARKER};
use crate::Result;
use midiroll_smf::MidiFile;

/// Options left unset keep the defaults of [`MidiRoll::new`]: an empty
/// one-track file, `@` as metadata marker and 300 dpi in both directions.
///
/// # Example
///
/// ```ignore
/// use midiroll::prelude::*;
///
/// let roll = MidiRoll::builder()
///     .file(MidiFile::open("roll.mid")?)
///     .length_dpi(300.25)
///     .roll_tempo(95.0)
///     .build()?;
///
/// assert_eq!(roll.file().ticks_per_quarter_note(), 570);
/// ```
#[derive(Debug, Clone)]
pub struct MidiRollBuilder {
    file: Option<MidiFile>,
    marker: String,
    params: RollParameters,
    roll_tempo: Option<f64>,
}

impl Default for MidiRollBuilder {
    fn default() -> Self {
        Self {
            file: None,
            marker: DEFAULT_METADATA_MARKER.to_string(),
            params: RollParameters::default(),
            roll_tempo: None,
        }
    }
}

impl MidiRollBuilder {
    pub fn file(mut self, file: MidiFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Default: `@`
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Default: 300. Non-positive values are ignored.
    pub fn length_dpi(mut self, dpi: f64) -> Self {
        self.params.set_length_dpi(dpi);
        self
    }

    /// Default: 300. Non-positive values are ignored.
    pub fn width_dpi(mut self, dpi: f64) -> Self {
        self.params.set_width_dpi(dpi);
        self
    }

    /// Written into the header on [`build`](Self::build) at the default
    /// 300 dpi, like [`MidiRoll::set_roll_tempo`]. Without it the file's
    /// ticks per quarter note are kept as they are.
    pub fn roll_tempo(mut self, tempo: f64) -> Self {
        self.roll_tempo = Some(tempo);
        self
    }

    /// Fails with `InvalidTempoRange` when the requested roll tempo does not
    /// map to a valid ticks-per-quarter-note value.
    pub fn build(self) -> Result<MidiRoll> {
        let mut roll = MidiRoll {
            file: self.file.unwrap_or_default(),
            params: self.params,
            marker: self.marker,
        };

        if let Some(tempo) = self.roll_tempo {
            roll.set_roll_tempo(tempo)?;
        }

        Ok(roll)
    }
}
