//! In-memory MIDI file: header fields plus a list of tracks.

use crate::error::{Error, Result};
use crate::event::{EventLocation, MidiEvent};
use crate::event_list::EventList;
use midly::Format;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Ticks per quarter note used by [`MidiFile::new`].
pub const DEFAULT_TICKS_PER_QUARTER_NOTE: u16 = 120;

/// Header words at or above this value select SMPTE timecode timing.
pub const SMPTE_TIMING_FLAG: u16 = 0x8000;

/// A Standard MIDI File held as owned tracks with absolute ticks.
///
/// Tracks can be temporarily joined into a single list (for operations that
/// need a global time order, such as note pairing across tracks) and split
/// back using each event's track affiliation.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiFile {
    pub(crate) tracks: Vec<EventList>,
    pub(crate) ticks_per_quarter_note: u16,
    pub(crate) format: Format,
    /// Track count before [`MidiFile::join_tracks`]; `None` while split.
    pub(crate) joined_from: Option<usize>,
}

impl Default for MidiFile {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiFile {
    /// Empty file with one track.
    pub fn new() -> Self {
        Self {
            tracks: vec![EventList::new()],
            ticks_per_quarter_note: DEFAULT_TICKS_PER_QUARTER_NOTE,
            format: Format::Parallel,
            joined_from: None,
        }
    }

    /// Raw 16-bit timing word from the header. Values with the top bit set
    /// encode SMPTE timing and are returned unchanged.
    #[inline]
    pub fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }

    /// Store the header timing word verbatim.
    pub fn set_ticks_per_quarter_note(&mut self, ticks: u16) {
        self.ticks_per_quarter_note = ticks;
    }

    #[inline]
    pub fn is_smpte(&self) -> bool {
        self.ticks_per_quarter_note >= SMPTE_TIMING_FLAG
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    #[inline]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, index: usize) -> Option<&EventList> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut EventList> {
        self.tracks.get_mut(index)
    }

    pub fn tracks(&self) -> &[EventList] {
        &self.tracks
    }

    /// Total number of events across all tracks.
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(EventList::len).sum()
    }

    pub fn event(&self, location: EventLocation) -> Option<&MidiEvent> {
        self.tracks.get(location.track)?.get(location.index)
    }

    pub fn event_mut(&mut self, location: EventLocation) -> Option<&mut MidiEvent> {
        self.tracks.get_mut(location.track)?.get_mut(location.index)
    }

    /// Append an empty track and return its index.
    pub fn add_track(&mut self) -> usize {
        if let Some(count) = self.joined_from.as_mut() {
            *count += 1;
            return *count - 1;
        }
        self.tracks.push(EventList::new());
        self.tracks.len() - 1
    }

    /// Append an event to the end of `track` (no re-sort).
    ///
    /// While tracks are joined the event goes into the joined list with its
    /// affiliation set to `track`.
    pub fn add_event(&mut self, track: usize, event: MidiEvent) -> Result<EventLocation> {
        let count = self.joined_from.unwrap_or(self.tracks.len());
        if track >= count {
            return Err(Error::TrackOutOfRange {
                index: track,
                count,
            });
        }

        let list = if self.joined_from.is_some() { 0 } else { track };
        let index = self.tracks[list].push(event.with_track(track));
        Ok(EventLocation::new(list, index))
    }

    /// Append a text meta event (type 0x01).
    pub fn add_text(&mut self, track: usize, tick: u64, text: &str) -> Result<EventLocation> {
        self.add_event(track, MidiEvent::text(tick, text))
    }

    #[inline]
    pub fn is_joined(&self) -> bool {
        self.joined_from.is_some()
    }

    /// Merge every track into track 0, sorted by time. Links are cleared.
    pub fn join_tracks(&mut self) {
        if self.joined_from.is_some() {
            return;
        }

        let count = self.tracks.len();
        let mut joined = EventList::with_capacity(self.event_count());
        for (track, list) in self.tracks.drain(..).enumerate() {
            for event in list.into_events() {
                joined.push(event.with_track(track));
            }
        }
        joined.sort();

        debug!("Joined {} tracks into {} events", count, joined.len());

        self.tracks = vec![joined];
        self.joined_from = Some(count);
    }

    /// Undo [`MidiFile::join_tracks`], sending each event back to the track
    /// it came from. Events pushed straight into the joined list go to
    /// track 0. Relative order is preserved; links are cleared.
    pub fn split_tracks(&mut self) {
        let Some(count) = self.joined_from.take() else {
            return;
        };

        // Affiliations come from join_tracks and add_event, both below count
        let count = count.max(1);
        let mut tracks = vec![EventList::new(); count];
        for event in self.tracks.drain(..).flat_map(EventList::into_events) {
            let track = event.track.min(count - 1);
            tracks[track].push(event);
        }

        debug!("Split events into {} tracks", count);

        self.tracks = tracks;
    }

    /// Pair note-ons with note-offs inside each track list. Call after
    /// [`MidiFile::join_tracks`] to pair across tracks.
    pub fn link_note_pairs(&mut self) -> usize {
        self.tracks.iter_mut().map(EventList::link_note_pairs).sum()
    }

    pub fn unlink_note_pairs(&mut self) {
        for list in &mut self.tracks {
            list.unlink_note_pairs();
        }
    }

    pub fn sort_track(&mut self, track: usize) -> Result<()> {
        let count = self.tracks.len();
        let list = self
            .tracks
            .get_mut(track)
            .ok_or(Error::TrackOutOfRange {
                index: track,
                count,
            })?;
        list.sort();
        Ok(())
    }

    pub fn sort_tracks(&mut self) {
        for list in &mut self.tracks {
            list.sort();
        }
    }
}

impl Index<EventLocation> for MidiFile {
    type Output = MidiEvent;

    fn index(&self, location: EventLocation) -> &MidiEvent {
        &self.tracks[location.track][location.index]
    }
}

impl IndexMut<EventLocation> for MidiFile {
    fn index_mut(&mut self, location: EventLocation) -> &mut MidiEvent {
        &mut self.tracks[location.track][location.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_track_file() -> MidiFile {
        let mut file = MidiFile::new();
        file.add_track();
        file.add_text(0, 0, "title").unwrap();
        file.add_event(1, MidiEvent::note_on(0, 0, 60, 100)).unwrap();
        file.add_event(1, MidiEvent::note_off(100, 0, 60, 0)).unwrap();
        file.add_event(0, MidiEvent::note_on(50, 1, 72, 90)).unwrap();
        file.add_event(0, MidiEvent::note_off(80, 1, 72, 0)).unwrap();
        file
    }

    #[test]
    fn test_new_file() {
        let file = MidiFile::new();
        assert_eq!(file.track_count(), 1);
        assert_eq!(file.event_count(), 0);
        assert_eq!(file.ticks_per_quarter_note(), DEFAULT_TICKS_PER_QUARTER_NOTE);
        assert!(!file.is_smpte());
    }

    #[test]
    fn test_add_event_out_of_range() {
        let mut file = MidiFile::new();
        let result = file.add_event(3, MidiEvent::note_on(0, 0, 60, 100));
        assert!(matches!(
            result,
            Err(Error::TrackOutOfRange { index: 3, count: 1 })
        ));
        assert_eq!(file.event_count(), 0);
    }

    #[test]
    fn test_join_and_split_restore_tracks() {
        let mut file = two_track_file();
        let before = file.clone();

        file.join_tracks();
        assert!(file.is_joined());
        assert_eq!(file.track_count(), 1);
        assert_eq!(file.event_count(), 5);
        assert!(file.tracks[0].is_sorted());

        file.split_tracks();
        assert!(!file.is_joined());
        assert_eq!(file.track_count(), 2);
        assert_eq!(file.tracks[0].len(), before.tracks[0].len());
        assert_eq!(file.tracks[1].len(), before.tracks[1].len());
        assert!(file.tracks[1].iter().all(|e| e.track() == 1));
    }

    #[test]
    fn test_split_uses_track_at_join_time() {
        let mut file = MidiFile::new();
        file.add_track();
        file.add_track();
        let list = file.track_mut(2).unwrap();
        list.push(MidiEvent::note_on(0, 0, 60, 100));
        list.push(MidiEvent::note_off(40, 0, 60, 0));
        assert_eq!(file.tracks[2][0].track(), 0);

        file.join_tracks();
        assert!(file.tracks[0].iter().all(|e| e.track() == 2));

        file.split_tracks();
        let sizes: Vec<usize> = file.tracks().iter().map(EventList::len).collect();
        assert_eq!(sizes, [0, 0, 2]);
    }

    #[test]
    fn test_split_keeps_track_count() {
        let mut file = MidiFile::new();
        file.add_track();
        file.add_track();
        file.join_tracks();
        file.track_mut(0)
            .unwrap()
            .push(MidiEvent::text(10, "pushed while joined"));

        file.split_tracks();
        assert_eq!(file.track_count(), 3);
        assert_eq!(file.tracks[0].len(), 1);
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut file = two_track_file();
        file.join_tracks();
        file.join_tracks();
        file.split_tracks();
        assert_eq!(file.track_count(), 2);
    }

    #[test]
    fn test_link_across_joined_tracks() {
        let mut file = MidiFile::new();
        file.add_track();
        file.add_event(0, MidiEvent::note_on(0, 0, 60, 100)).unwrap();
        file.add_event(1, MidiEvent::note_off(40, 0, 60, 0)).unwrap();

        assert_eq!(file.link_note_pairs(), 0);

        file.join_tracks();
        assert_eq!(file.link_note_pairs(), 1);
        assert_eq!(
            file.tracks[0].linked_event(0).map(|e| e.tick),
            Some(40)
        );
    }

    #[test]
    fn test_add_event_while_joined() {
        let mut file = two_track_file();
        file.join_tracks();
        let location = file.add_text(1, 500, "late").unwrap();
        assert_eq!(location.track, 0);

        file.split_tracks();
        assert_eq!(file.tracks[1].len(), 3);
        assert!(file.tracks[1][2].is_text());
    }

    #[test]
    fn test_sort_track_out_of_range() {
        let mut file = MidiFile::new();
        assert!(file.sort_track(0).is_ok());
        assert!(matches!(
            file.sort_track(2),
            Err(Error::TrackOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_index_by_location() {
        let mut file = two_track_file();
        let location = EventLocation::new(1, 1);
        assert_eq!(file[location].tick, 100);

        file[location].tick = 120;
        assert_eq!(file.event(location).map(|e| e.tick), Some(120));
    }

    #[test]
    fn test_smpte_flag() {
        let mut file = MidiFile::new();
        file.set_ticks_per_quarter_note(0xE728);
        assert!(file.is_smpte());
    }
}
