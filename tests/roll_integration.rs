//! End-to-end tests: roll edits that survive writing and re-reading a file.
//!
//! Run with:
//! ```bash
//! cargo test -p midiroll --test roll_integration
//! ```

mod helpers;

use approx::assert_abs_diff_eq;
use helpers::*;
use midiroll::prelude::*;
use midiroll::{tempo_to_ticks, ticks_to_tempo, MissingPair, DEFAULT_DPI};
use proptest::prelude::*;

#[test]
fn test_edits_survive_save_and_open() {
    init_tracing();

    let mut roll = sample_roll();
    roll.set_metadata("TITLE", "Elite Syncopations").unwrap();
    roll.set_metadata("ROLL_TEMPO", "95").unwrap();
    assert!(roll.trackerize(10).is_complete());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roll.mid");
    roll.save(&path).unwrap();

    let reopened = MidiRoll::open(&path).unwrap();
    assert_eq!(reopened.file().ticks_per_quarter_note(), 570);
    assert_abs_diff_eq!(reopened.roll_tempo(), 95.0, epsilon = 1e-9);
    assert_eq!(reopened.metadata("TITLE"), "Elite Syncopations");
    assert_eq!(reopened.metadata("COMPOSER"), "Scott Joplin");
    assert_eq!(reopened.metadata("ROLL_TEMPO"), "95");
    assert_eq!(reopened.file().track_count(), 3);
    assert_eq!(
        notes(&reopened, 2),
        [(100, true, 68), (140, false, 68), (140, true, 72), (200, false, 72)]
    );
}

#[test]
fn test_byte_round_trip_is_stable() {
    let roll = sample_roll();
    let bytes = roll.to_bytes().unwrap();

    let parsed = MidiRoll::parse(&bytes).unwrap();
    assert_eq!(parsed.to_bytes().unwrap(), bytes);
    assert_eq!(parsed.file().event_count(), roll.file().event_count());
}

#[test]
fn test_repeated_metadata_updates_keep_one_event() {
    let mut roll = sample_roll();
    roll.set_metadata("speed", "60").unwrap();
    roll.set_metadata("speed", "72").unwrap();

    let matching: Vec<_> = roll
        .metadata_entries()
        .into_iter()
        .filter(|entry| entry.key == "speed")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].value, "72");
    assert_eq!(roll.metadata("speed"), "72");
}

#[test]
fn test_metadata_events_span_tracks() {
    let mut roll = sample_roll();
    roll.file_mut().add_text(2, 500, "@NOTE: treble only").unwrap();

    let locations = roll.metadata_events();
    assert_eq!(locations.len(), 4);
    assert_eq!(locations[3], EventLocation::new(2, 4));
    assert_eq!(roll.text_events().len(), 4);
    assert_eq!(roll.metadata("NOTE"), "");
}

#[test]
fn test_trackerize_two_notes() {
    init_tracing();

    let mut file = MidiFile::new();
    add_note(&mut file, 0, 0, 100, 60);
    add_note(&mut file, 0, 50, 80, 64);
    let mut roll = MidiRoll::from(file);

    let report = roll.trackerize(50);
    assert_eq!(report.into_result().unwrap(), 2);
    assert_eq!(
        notes(&roll, 0),
        [(0, true, 60), (50, true, 64), (130, false, 64), (150, false, 60)]
    );
}

#[test]
fn test_trackerize_keeps_track_sizes() {
    let mut roll = sample_roll();
    let sizes: Vec<usize> = roll.file().tracks().iter().map(|t| t.len()).collect();

    roll.trackerize(25);

    let after: Vec<usize> = roll.file().tracks().iter().map(|t| t.len()).collect();
    assert_eq!(after, sizes);
    assert!(roll.file().tracks().iter().all(|t| t.is_sorted()));
    assert_eq!(roll.metadata("TITLE"), "Maple Leaf Rag");
}

#[test]
fn test_trackerize_reports_hanging_note() {
    init_tracing();

    let mut roll = sample_roll();
    roll.file_mut()
        .add_event(1, MidiEvent::note_on(300, 0, 36, 80))
        .unwrap();

    let report = roll.trackerize(10);
    assert_eq!(report.shifted, 4);
    assert_eq!(
        report.missing_pairs,
        [MissingPair {
            track: 1,
            tick: 300,
            channel: 0,
            key: 36,
        }]
    );
    assert!(notes(&roll, 1).contains(&(300, true, 36)));
    assert!(matches!(report.into_result(), Err(Error::MissingPair(_))));
}

#[test]
fn test_builder_from_existing_file() {
    let bytes = sample_roll().to_bytes().unwrap();

    let roll = MidiRoll::builder()
        .file(MidiFile::parse(&bytes).unwrap())
        .length_dpi(300.25)
        .roll_tempo(70.0)
        .build()
        .unwrap();

    assert_eq!(roll.file().ticks_per_quarter_note(), 420);
    assert_eq!(roll.length_dpi(), 300.25);
    assert_eq!(roll.metadata("ROLL_TYPE"), "88-note");
}

#[test]
fn test_invalid_tempo_leaves_file_untouched() {
    let mut roll = sample_roll();
    let before = roll.to_bytes().unwrap();

    assert!(matches!(
        roll.set_roll_tempo(6000.0),
        Err(Error::InvalidTempoRange { ticks: 36000, .. })
    ));
    assert_eq!(roll.to_bytes().unwrap(), before);
}

proptest! {
    #[test]
    fn prop_tempo_round_trip(tempo in 0.2f64..5461.0) {
        let ticks = tempo_to_ticks(tempo, DEFAULT_DPI).unwrap();
        let back = ticks_to_tempo(ticks, DEFAULT_DPI);
        prop_assert!((back - tempo).abs() <= TEMPO_ROUNDING + 1e-9);
    }

    #[test]
    fn prop_ticks_round_trip(ticks in 1u16..=32767) {
        let tempo = ticks_to_tempo(ticks, DEFAULT_DPI);
        prop_assert_eq!(tempo_to_ticks(tempo, DEFAULT_DPI).unwrap(), ticks);
    }
}
