//! Roll tempo <-> ticks-per-quarter-note mapping.
//!
//! A piano roll's tempo is carried by the header's ticks-per-quarter-note
//! field rather than by tempo meta messages (those are left free to model the
//! roll's acceleration). Each tick is one scanned image row.
//!
//! Tempo 100 means the roll moves 10 feet per minute at its start. At 300 dpi
//! that is `10 * 300 * 12 = 36000` rows per minute, and with a reference
//! tempo of 60 bpm each quarter note spans `36000 / 60 = 600` rows.

use crate::error::{Error, Result};
use crate::roll::MidiRoll;
use midiroll_smf::SMPTE_TIMING_FLAG;
use tracing::debug;

/// Scan resolution of the Stanford roll collection (more precisely 300.25).
pub const DEFAULT_DPI: f64 = 300.0;

/// Largest metrical ticks-per-quarter-note value.
pub const MAX_TICKS_PER_QUARTER_NOTE: u16 = SMPTE_TIMING_FLAG - 1;

/// Convert a roll tempo to ticks per quarter note, rounding half away from
/// zero.
///
/// Fails with [`Error::InvalidTempoRange`] when the result is below 1 or
/// would spill into the SMPTE range (above 32767).
pub fn tempo_to_ticks(tempo: f64, dpi: f64) -> Result<u16> {
    let exact = tempo / 10.0 * dpi * 12.0 / 60.0;
    // NaN casts to 0 and infinities saturate, both rejected below
    let ticks = exact.round() as i64;

    if ticks < 1 || ticks > i64::from(MAX_TICKS_PER_QUARTER_NOTE) {
        return Err(Error::InvalidTempoRange { tempo, dpi, ticks });
    }

    Ok(ticks as u16)
}

/// Exact inverse of [`tempo_to_ticks`] (before rounding). No validation.
pub fn ticks_to_tempo(ticks: u16, dpi: f64) -> f64 {
    f64::from(ticks) * 10.0 / dpi / 12.0 * 60.0
}

impl MidiRoll {
    /// Set the roll tempo at [`DEFAULT_DPI`]. See [`MidiRoll::set_roll_tempo_with_dpi`].
    pub fn set_roll_tempo(&mut self, tempo: f64) -> Result<u16> {
        self.set_roll_tempo_with_dpi(tempo, DEFAULT_DPI)
    }

    /// Store the ticks-per-quarter-note value matching `tempo` in the header
    /// and return it. On error the header is left unchanged.
    pub fn set_roll_tempo_with_dpi(&mut self, tempo: f64, dpi: f64) -> Result<u16> {
        let ticks = tempo_to_ticks(tempo, dpi)?;
        self.file.set_ticks_per_quarter_note(ticks);
        debug!("Roll tempo {} at {} dpi -> {} ticks per quarter", tempo, dpi, ticks);
        Ok(ticks)
    }

    /// Roll tempo implied by the header at [`DEFAULT_DPI`].
    pub fn roll_tempo(&self) -> f64 {
        self.roll_tempo_with_dpi(DEFAULT_DPI)
    }

    /// Roll tempo implied by the current header word. SMPTE words are not
    /// rejected; they convert as plain integers.
    pub fn roll_tempo_with_dpi(&self, dpi: f64) -> f64 {
        ticks_to_tempo(self.file.ticks_per_quarter_note(), dpi)
    }
}
