//! Test helpers and fixtures for midiroll integration tests

#![allow(dead_code)]

use midiroll::prelude::*;

/// Tolerance for roll tempo round-trips through whole ticks at 300 dpi.
/// One tick is 1/6 of a tempo unit, rounding moves at most half of that.
pub const TEMPO_ROUNDING: f64 = 1.0 / 12.0;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Append a note on channel 0 as a note-on/note-off pair.
pub fn add_note(file: &mut MidiFile, track: usize, on: u64, off: u64, key: u8) {
    file.add_event(track, MidiEvent::note_on(on, 0, key, 64))
        .expect("note-on");
    file.add_event(track, MidiEvent::note_off(off, 0, key, 0))
        .expect("note-off");
}

/// A small two-track roll: metadata in the first track, bass and treble
/// holes in the second and third.
pub fn sample_roll() -> MidiRoll {
    let mut file = MidiFile::new();
    file.add_track();
    file.add_track();

    file.add_text(0, 0, "@TITLE: Maple Leaf Rag").unwrap();
    file.add_text(0, 0, "@COMPOSER: Scott Joplin").unwrap();
    file.add_text(0, 0, "@ROLL_TYPE: 88-note").unwrap();

    add_note(&mut file, 1, 100, 160, 41);
    add_note(&mut file, 1, 200, 260, 48);
    add_note(&mut file, 2, 100, 130, 68);
    add_note(&mut file, 2, 140, 190, 72);

    let mut roll = MidiRoll::from(file);
    roll.set_roll_tempo(95.0).expect("valid tempo");
    roll
}

/// `(tick, is_note_on, key)` for every note event of a track.
pub fn notes(roll: &MidiRoll, track: usize) -> Vec<(u64, bool, u8)> {
    roll.file()
        .track(track)
        .expect("track exists")
        .iter()
        .filter_map(|event| Some((event.tick, event.is_note_on(), event.key()?)))
        .collect()
}
