//! Ordered event storage for one track.

use crate::event::MidiEvent;
use std::collections::{HashMap, VecDeque};
use std::ops::{Index, IndexMut};
use tracing::debug;

/// Events of a single track, in stored order.
///
/// Ordering by tick is not maintained automatically: after editing ticks call
/// [`EventList::sort`]. Note links are slot indices into this list; `sort`
/// rewrites them so paired events stay paired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventList {
    events: Vec<MidiEvent>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MidiEvent> {
        self.events.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MidiEvent> {
        self.events.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MidiEvent> {
        self.events.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MidiEvent> {
        self.events.iter_mut()
    }

    pub fn as_slice(&self) -> &[MidiEvent] {
        &self.events
    }

    /// Append an event and return its index. Any link it carries is dropped.
    pub fn push(&mut self, mut event: MidiEvent) -> usize {
        event.link = None;
        self.events.push(event);
        self.events.len() - 1
    }

    /// The event paired with the event at `index`.
    pub fn linked_event(&self, index: usize) -> Option<&MidiEvent> {
        let link = self.events.get(index)?.link?;
        self.events.get(link)
    }

    pub fn linked_event_mut(&mut self, index: usize) -> Option<&mut MidiEvent> {
        let link = self.events.get(index)?.link?;
        self.events.get_mut(link)
    }

    pub fn is_sorted(&self) -> bool {
        self.events
            .windows(2)
            .all(|pair| pair[0].time_order(&pair[1]).is_le())
    }

    /// Stable sort by [`MidiEvent::time_order`], remapping links.
    pub fn sort(&mut self) {
        if self.is_sorted() {
            return;
        }

        let mut slots: Vec<(usize, MidiEvent)> =
            std::mem::take(&mut self.events).into_iter().enumerate().collect();
        slots.sort_by(|(_, a), (_, b)| a.time_order(b));

        let mut new_index = vec![0; slots.len()];
        for (new, (old, _)) in slots.iter().enumerate() {
            new_index[*old] = new;
        }

        self.events = slots
            .into_iter()
            .map(|(_, mut event)| {
                event.link = event.link.map(|old| new_index[old]);
                event
            })
            .collect();
    }

    /// Pair every note-on with the first later unclaimed note-off of the
    /// same channel and key, walking the list in stored order.
    ///
    /// Existing links are cleared first. Returns the number of pairs made.
    pub fn link_note_pairs(&mut self) -> usize {
        self.unlink_note_pairs();

        let mut pending: HashMap<(u8, u8), VecDeque<usize>> = HashMap::new();
        let mut pairs = 0;

        for index in 0..self.events.len() {
            let event = &self.events[index];
            let (Some(channel), Some(key)) = (event.channel(), event.key()) else {
                continue;
            };

            if event.is_note_on() {
                pending.entry((channel, key)).or_default().push_back(index);
            } else if event.is_note_off() {
                let Some(on) = pending
                    .get_mut(&(channel, key))
                    .and_then(|queue| queue.pop_front())
                else {
                    continue;
                };
                self.events[on].link = Some(index);
                self.events[index].link = Some(on);
                pairs += 1;
            }
        }

        let unmatched: usize = pending.values().map(VecDeque::len).sum();
        if unmatched > 0 {
            debug!("Linked {} note pairs, {} note-ons unmatched", pairs, unmatched);
        }

        pairs
    }

    pub fn unlink_note_pairs(&mut self) {
        for event in &mut self.events {
            event.link = None;
        }
    }

    pub(crate) fn into_events(self) -> Vec<MidiEvent> {
        self.events
    }
}

impl Index<usize> for EventList {
    type Output = MidiEvent;

    fn index(&self, index: usize) -> &MidiEvent {
        &self.events[index]
    }
}

impl IndexMut<usize> for EventList {
    fn index_mut(&mut self, index: usize) -> &mut MidiEvent {
        &mut self.events[index]
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a MidiEvent;
    type IntoIter = std::slice::Iter<'a, MidiEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<MidiEvent> for EventList {
    fn from_iter<I: IntoIterator<Item = MidiEvent>>(iter: I) -> Self {
        let mut list = EventList::new();
        for event in iter {
            list.push(event);
        }
        list
    }
}
