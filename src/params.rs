//! Scan resolution of the original roll image.

use crate::roll::MidiRoll;
use crate::tempo::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scan resolution along the length and across the width of a roll.
///
/// Both values are always positive: setters ignore non-positive (and NaN)
/// input and keep the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "StoredParameters")]
pub struct RollParameters {
    length_dpi: f64,
    width_dpi: f64,
}

/// Unvalidated form read by serde, passed through the setters.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoredParameters {
    #[serde(default = "default_dpi")]
    length_dpi: f64,
    #[serde(default = "default_dpi")]
    width_dpi: f64,
}

fn default_dpi() -> f64 {
    DEFAULT_DPI
}

impl From<StoredParameters> for RollParameters {
    fn from(stored: StoredParameters) -> Self {
        let mut params = RollParameters::default();
        params.set_length_dpi(stored.length_dpi);
        params.set_width_dpi(stored.width_dpi);
        params
    }
}

impl Default for RollParameters {
    fn default() -> Self {
        Self {
            length_dpi: DEFAULT_DPI,
            width_dpi: DEFAULT_DPI,
        }
    }
}

impl RollParameters {
    /// Resolution along the length of the roll (the time axis).
    #[inline]
    pub fn length_dpi(&self) -> f64 {
        self.length_dpi
    }

    pub fn set_length_dpi(&mut self, value: f64) {
        if value > 0.0 {
            self.length_dpi = value;
        } else {
            debug!("Ignoring non-positive length dpi {}", value);
        }
    }

    /// Resolution across the width of the roll (the pitch axis).
    #[inline]
    pub fn width_dpi(&self) -> f64 {
        self.width_dpi
    }

    pub fn set_width_dpi(&mut self, value: f64) {
        if value > 0.0 {
            self.width_dpi = value;
        } else {
            debug!("Ignoring non-positive width dpi {}", value);
        }
    }
}

impl MidiRoll {
    pub fn parameters(&self) -> RollParameters {
        self.params
    }

    pub fn length_dpi(&self) -> f64 {
        self.params.length_dpi()
    }

    pub fn set_length_dpi(&mut self, value: f64) {
        self.params.set_length_dpi(value);
    }

    pub fn width_dpi(&self) -> f64 {
        self.params.width_dpi()
    }

    pub fn set_width_dpi(&mut self, value: f64) {
        self.params.set_width_dpi(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RollParameters::default();
        assert_eq!(params.length_dpi(), 300.0);
        assert_eq!(params.width_dpi(), 300.0);
    }

    #[test]
    fn test_set_and_get() {
        let mut roll = MidiRoll::new();
        roll.set_length_dpi(150.0);
        roll.set_width_dpi(300.25);
        assert_eq!(roll.length_dpi(), 150.0);
        assert_eq!(roll.width_dpi(), 300.25);
    }

    #[test]
    fn test_rejects_non_positive() {
        let mut roll = MidiRoll::new();
        roll.set_length_dpi(150.0);

        roll.set_length_dpi(-1.0);
        roll.set_length_dpi(0.0);
        roll.set_length_dpi(f64::NAN);
        assert_eq!(roll.length_dpi(), 150.0);

        roll.set_width_dpi(-300.0);
        assert_eq!(roll.width_dpi(), 300.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut params = RollParameters::default();
        params.set_length_dpi(300.25);

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"length-dpi":300.25,"width-dpi":300.0}"#);

        let restored: RollParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, params);
    }

    #[test]
    fn test_deserialize_validates() {
        let params: RollParameters =
            serde_json::from_str(r#"{"length-dpi":-1.0}"#).unwrap();
        assert_eq!(params, RollParameters::default());
    }

    #[test]
    fn test_parameters_are_independent() {
        let mut params = RollParameters::default();
        params.set_width_dpi(600.0);
        assert_eq!(params.length_dpi(), 300.0);
        assert_eq!(params.width_dpi(), 600.0);
    }
}
