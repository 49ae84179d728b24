//! Roll metadata stored in-band as marked text events.
//!
//! A metadata entry is a text meta event (type 0x01) whose payload reads
//! `<marker><key>: <value>`, for example `@ROLL_TYPE: 88-note` with the
//! default `@` marker. Lookups and updates only consider the first track, and
//! only the first event matching a key counts; later duplicates are ignored.
//!
//! Marker and key are inserted into the search pattern verbatim, so regex
//! metacharacters in either act as pattern syntax.

use crate::error::{Error, Result};
use crate::roll::MidiRoll;
use midiroll_smf::EventLocation;
use regex::Regex;
use tracing::{debug, warn};

/// One decoded metadata event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
    pub tick: u64,
    pub location: EventLocation,
}

impl MidiRoll {
    /// Every text meta event, ordered by track and then by stored position.
    pub fn text_events(&self) -> Vec<EventLocation> {
        self.locate(|content| content.is_some())
    }

    /// Text events that start with the marker and contain a `:` after it.
    pub fn metadata_events(&self) -> Vec<EventLocation> {
        let marker = self.marker.as_str();
        self.locate(|content| {
            content.is_some_and(|text| {
                text.starts_with(marker) && text[marker.len()..].contains(':')
            })
        })
    }

    /// Metadata events of the first track decoded into key and value.
    /// Duplicate keys are all returned, in stored order.
    pub fn metadata_entries(&self) -> Vec<MetadataEntry> {
        let marker = self.marker.as_str();
        let Some(track) = self.file.track(0) else {
            return Vec::new();
        };

        track
            .iter()
            .enumerate()
            .filter(|(_, event)| event.is_text())
            .filter_map(|(index, event)| {
                let content = event.meta_content()?;
                let body = content.strip_prefix(marker)?;
                let (key, value) = body.split_once(':')?;
                Some(MetadataEntry {
                    key: key.to_string(),
                    value: value.trim_start().to_string(),
                    tick: event.tick,
                    location: EventLocation::new(0, index),
                })
            })
            .collect()
    }

    /// Value stored under `key`, or an empty string when the key is absent.
    ///
    /// A marker/key combination that does not form a valid pattern is logged
    /// and treated as absent; use [`MidiRoll::try_metadata`] to see the error.
    pub fn metadata(&self, key: &str) -> String {
        match self.try_metadata(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!("Problem searching for metadata key {:?}: {}", key, e);
                String::new()
            }
        }
    }

    pub fn try_metadata(&self, key: &str) -> Result<Option<String>> {
        let pattern = self.key_pattern(key)?;
        Ok(self.find_metadata(&pattern).map(|(_, value)| value))
    }

    /// Insert or update the metadata entry for `key`.
    ///
    /// An existing entry is rewritten in place and its tick returned. Otherwise
    /// a new text event is added to the first track at tick 0, the track is
    /// re-sorted, and 0 is returned.
    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<u64> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        let pattern = self.key_pattern(key)?;
        let line = format!("{}{}: {}", self.marker, key, value);

        if let Some((index, _)) = self.find_metadata(&pattern) {
            let event = &mut self.file[EventLocation::new(0, index)];
            event.set_meta_content(&line);
            debug!("Updated metadata {:?} at tick {}", key, event.tick);
            return Ok(event.tick);
        }

        self.file.add_text(0, 0, &line)?;
        self.file.sort_track(0)?;
        debug!("Added metadata {:?}", key);
        Ok(0)
    }

    fn key_pattern(&self, key: &str) -> Result<Regex> {
        let query = format!(r"{}{}:\s*(.*)\s*$", self.marker, key);
        Ok(Regex::new(&query)?)
    }

    /// First text event of track 0 matching `pattern`: its index and capture.
    fn find_metadata(&self, pattern: &Regex) -> Option<(usize, String)> {
        let track = self.file.track(0)?;
        track
            .iter()
            .enumerate()
            .filter(|(_, event)| event.is_text())
            .find_map(|(index, event)| {
                let content = event.meta_content()?;
                let value = pattern.captures(&content)?.get(1)?.as_str().to_string();
                Some((index, value))
            })
    }

    fn locate(&self, mut keep: impl FnMut(Option<&str>) -> bool) -> Vec<EventLocation> {
        let mut found = Vec::new();
        for (track_index, track) in self.file.tracks().iter().enumerate() {
            for (index, event) in track.iter().enumerate() {
                if !event.is_text() {
                    continue;
                }
                let content = event.meta_content();
                if keep(content.as_deref()) {
                    found.push(EventLocation::new(track_index, index));
                }
            }
        }
        found
    }
}
