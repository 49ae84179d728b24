//! Tracker-bar emulation.
//!
//! A roll's holes are read by a tracker bar whose openings have a height, so
//! a note keeps sounding a little after its hole has passed. Trackerizing
//! moves every note-off by a fixed number of ticks relative to its note-on.

use crate::error::{Error, MissingPair, Result};
use crate::roll::MidiRoll;
use tracing::{debug, warn};

/// Outcome of [`MidiRoll::trackerize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerizeReport {
    /// Note-offs whose tick was moved
    pub shifted: usize,
    /// Note-ons left untouched because nothing turned them off
    pub missing_pairs: Vec<MissingPair>,
}

impl TrackerizeReport {
    pub fn is_complete(&self) -> bool {
        self.missing_pairs.is_empty()
    }

    /// Fail on the first missing pair, otherwise return the shift count.
    pub fn into_result(self) -> Result<usize> {
        match self.missing_pairs.first() {
            Some(missing) => Err(Error::MissingPair(*missing)),
            None => Ok(self.shifted),
        }
    }
}

impl MidiRoll {
    /// Shift every note-off by `offset` ticks from its note-on.
    ///
    /// Tracks are joined so notes pair up across track boundaries, then split
    /// back and re-sorted. Note-ons never move and every event stays on its
    /// track. Ticks saturate at 0 and `u64::MAX`. A note-on with no matching
    /// note-off is logged, recorded in the report, and left alone.
    ///
    /// Calling this twice shifts twice.
    pub fn trackerize(&mut self, offset: i64) -> TrackerizeReport {
        let mut report = TrackerizeReport::default();

        self.file.join_tracks();
        self.file.link_note_pairs();

        if let Some(list) = self.file.track_mut(0) {
            for index in 0..list.len() {
                if !list[index].is_note_on() {
                    continue;
                }

                if let Some(off) = list.linked_event_mut(index) {
                    off.tick = off.tick.saturating_add_signed(offset);
                    report.shifted += 1;
                    continue;
                }

                let on = &list[index];
                let missing = MissingPair {
                    track: on.track(),
                    tick: on.tick,
                    channel: on.channel().unwrap_or_default(),
                    key: on.key().unwrap_or_default(),
                };
                warn!("{}", missing);
                report.missing_pairs.push(missing);
            }
        }

        self.file.split_tracks();
        self.file.sort_tracks();

        debug!(
            "Trackerized by {} ticks: {} note-offs shifted, {} unpaired",
            offset,
            report.shifted,
            report.missing_pairs.len()
        );

        report
    }
}
