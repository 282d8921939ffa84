use crate::core::{
    Beat,
    clip::ResizeAnchor,
    error::ModelError,
    source::AudioItem,
    state::ProjectState,
    track::{Track, TrackKind},
};
use std::sync::Arc;

fn item(length_in_samples: u64) -> Arc<AudioItem> {
    Arc::new(AudioItem {
        name: "loop.wav".into(),
        path: "loop.wav".into(),
        sample_rate: 44100,
        channels: 2,
        length_in_samples,
        samples: Vec::new(),
    })
}

fn project_with_midi_track() -> (ProjectState, String) {
    let mut state = ProjectState::new();
    let track_id = state.add_track(TrackKind::Midi).unwrap();
    (state, track_id)
}

#[test]
fn new_project_has_only_the_master_track() {
    let state = ProjectState::new();
    assert_eq!(state.track_len(), 0);
    assert_eq!(state.master_track().id, "master");
    assert_eq!(state.tempo(), 120.0);
    assert_eq!(state.time_signature.beats_per_bar, 4);
}

#[test]
fn tempo_is_clamped() {
    let mut state = ProjectState::new();
    state.set_tempo(5.0);
    assert_eq!(state.tempo(), 10.0);
    state.set_tempo(2000.0);
    assert_eq!(state.tempo(), 999.9);
    state.set_tempo(140.0);
    assert_eq!(state.tempo(), 140.0);
}

#[test]
fn track_lifecycle() {
    let mut state = ProjectState::new();
    let a = state.add_track(TrackKind::Midi).unwrap();
    let b = state.add_track_at(TrackKind::Audio, 0).unwrap();
    assert_eq!(state.track_len(), 2);
    // Insertion at 0 put b first.
    assert_eq!(state.tracks.from_index(0).unwrap().id, b);
    assert_eq!(state.tracks.from_index(1).unwrap().id, a);

    assert!(matches!(
        state.add_track(TrackKind::Master),
        Err(ModelError::InvalidParameter(_))
    ));
    assert!(matches!(
        state.remove_track("master"),
        Err(ModelError::InvalidParameter(_))
    ));

    state.remove_track(&a).unwrap();
    assert_eq!(state.track_len(), 1);
    assert_eq!(state.remove_track(&a), Err(ModelError::NotFound));
}

#[test]
fn audio_clip_duration_follows_tempo() {
    let mut state = ProjectState::new();
    let track_id = state.add_track(TrackKind::Audio).unwrap();
    // One second of audio at 120 BPM covers two beats.
    let clip_id = state.add_audio_clip(&track_id, item(44100), 0.0).unwrap();
    let (_, audio) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(audio[0].id, clip_id);
    assert_eq!(audio[0].duration_in_beats, 2.0);
}

#[test]
fn clip_kind_is_checked_against_track_kind() {
    let mut state = ProjectState::new();
    let audio_track = state.add_track(TrackKind::Audio).unwrap();
    assert!(matches!(
        state.add_midi_clip(&audio_track, "Keys", 0.0, 4.0),
        Err(ModelError::InvalidParameter(_))
    ));
}

#[test]
fn edits_preserve_the_non_overlap_invariant() {
    let (mut state, track_id) = project_with_midi_track();
    let a = state.add_midi_clip(&track_id, "a", 0.0, 4.0).unwrap();
    state.add_midi_clip(&track_id, "b", 6.0, 2.0).unwrap();
    state.move_clip(&a, 5.0).unwrap();
    state.resize_clip(&a, 8.0, ResizeAnchor::Right).unwrap();
    state.set_playhead(7.0);
    state.split_at_playhead();
    let track = state.tracks.get(&track_id).unwrap();
    assert!(track.invariant_holds());
}

#[test]
fn delete_selection_splits_a_straddling_clip() {
    let (mut state, track_id) = project_with_midi_track();
    state.add_midi_clip(&track_id, "a", 0.0, 8.0).unwrap();
    state.selection.begin(3.0, &track_id);
    state.selection.update(5.0);
    let edit = state.delete_selection().unwrap();
    assert_eq!(edit.created.len(), 1);
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 2);
    assert_eq!((midi[0].start_beat, midi[0].end_beat()), (0.0, 3.0));
    assert_eq!((midi[1].start_beat, midi[1].end_beat()), (5.0, 8.0));
    // Selection is consumed by the edit.
    assert!(!state.selection.is_active());
}

#[test]
fn delete_selection_without_selection_is_an_error() {
    let (mut state, _) = project_with_midi_track();
    assert!(matches!(
        state.delete_selection(),
        Err(ModelError::InvalidParameter(_))
    ));
}

#[test]
fn split_selection_rebases_midi_notes() {
    // Clip [0, 10) with a note at 2..6, split at [3, 5): the left part keeps
    // 2..3 of the note, the middle 3..5, the right 5..6 rebased to 0.
    let (mut state, track_id) = project_with_midi_track();
    let clip_id = state.add_midi_clip(&track_id, "a", 0.0, 10.0).unwrap();
    {
        let track = state.tracks.get_mut(&track_id).unwrap();
        let clip = track.midi_clips.iter_mut().find(|c| c.id == clip_id).unwrap();
        clip.add_note(60, 2.0, 4.0, 100).unwrap();
    }
    state.selection.begin(3.0, &track_id);
    state.selection.update(5.0);
    let edit = state.split_selection().unwrap();
    assert_eq!(edit.created.len(), 2);

    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 3);
    // Left part keeps the original id and its note tail is truncated.
    assert_eq!(midi[0].id, clip_id);
    assert_eq!(midi[0].notes[0].start_beat, 2.0);
    assert_eq!(midi[0].notes[0].duration, 1.0);
    // Middle part holds the covered slice, rebased to local 0.
    assert_eq!(midi[1].notes[0].start_beat, 0.0);
    assert_eq!(midi[1].notes[0].duration, 2.0);
    // Right part gets the remainder.
    assert_eq!(midi[2].notes[0].start_beat, 0.0);
    assert_eq!(midi[2].notes[0].duration, 1.0);
    // No note material was lost.
    let total: Beat = midi.iter().flat_map(|c| &c.notes).map(|n| n.duration).sum();
    assert_eq!(total, 4.0);
}

#[test]
fn split_at_playhead_conserves_audio_samples() {
    let mut state = ProjectState::new();
    let track_id = state.add_track(TrackKind::Audio).unwrap();
    state.add_audio_clip(&track_id, item(44100), 0.0).unwrap();
    state.set_playhead(0.7);
    let splits = state.split_at_playhead();
    assert_eq!(splits.len(), 1);
    let (_, audio) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(audio.len(), 2);
    let total: u64 = audio.iter().map(|c| c.length_in_samples).sum();
    assert!(total.abs_diff(44100) <= 1, "total {total}");
    assert_eq!(
        audio[1].start_offset_in_samples,
        audio[0].start_offset_in_samples + audio[0].length_in_samples
    );
}

#[test]
fn move_is_destructive_toward_overlapped_clips() {
    let (mut state, track_id) = project_with_midi_track();
    let a = state.add_midi_clip(&track_id, "a", 0.0, 4.0).unwrap();
    let b = state.add_midi_clip(&track_id, "b", 6.0, 2.0).unwrap();
    let deleted = state.move_clip(&a, 5.0).unwrap();
    assert_eq!(deleted, vec![b]);
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 1);
    assert_eq!(midi[0].start_beat, 5.0);
}

#[test]
fn copy_paste_round_trip() {
    let (mut state, track_id) = project_with_midi_track();
    let original = state.add_midi_clip(&track_id, "riff", 2.0, 2.0).unwrap();
    state.selection.toggle_clip(&original);
    assert_eq!(state.copy_selection().unwrap(), 1);

    let ids = state.paste_at(&track_id, 10.0).unwrap();
    assert_eq!(ids.len(), 1);
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 2);
    assert_eq!(midi[1].start_beat, 10.0);
    assert_ne!(midi[1].id, original);
    assert!(midi[1].name.starts_with("riff (copy "));
    // The source clip is untouched.
    assert_eq!(midi[0].id, original);
}

#[test]
fn range_copy_records_edge_trims() {
    let (mut state, track_id) = project_with_midi_track();
    state.add_midi_clip(&track_id, "a", 0.0, 8.0).unwrap();
    state.selection.begin(2.0, &track_id);
    state.selection.update(5.0);
    state.copy_selection().unwrap();

    let ids = state.paste_at(&track_id, 10.0).unwrap();
    assert_eq!(ids.len(), 1);
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    // Pasted clip covers only the selected 3 beats.
    assert_eq!(midi[1].start_beat, 10.0);
    assert_eq!(midi[1].duration, 3.0);
    // The source is still whole.
    assert_eq!(midi[0].duration, 8.0);
}

#[test]
fn paste_conflict_rejects_wholesale() {
    let (mut state, track_id) = project_with_midi_track();
    let a = state.add_midi_clip(&track_id, "a", 0.0, 1.0).unwrap();
    let b = state.add_midi_clip(&track_id, "b", 3.0, 1.0).unwrap();
    state.add_midi_clip(&track_id, "blocker", 12.0, 2.0).unwrap();
    state.selection.toggle_clip(&a);
    state.selection.toggle_clip(&b);
    state.copy_selection().unwrap();

    // The second pasted clip would land on "blocker".
    assert_eq!(
        state.paste_at(&track_id, 9.0),
        Err(ModelError::OverlapConflict)
    );
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 3);
}

#[test]
fn paste_with_empty_clipboard_is_an_error() {
    let (mut state, track_id) = project_with_midi_track();
    assert!(matches!(
        state.paste_at(&track_id, 0.0),
        Err(ModelError::InvalidParameter(_))
    ));
}

#[test]
fn cut_then_paste_relocates_the_material() {
    let (mut state, track_id) = project_with_midi_track();
    let a = state.add_midi_clip(&track_id, "a", 0.0, 4.0).unwrap();
    state.selection.toggle_clip(&a);
    state.cut_selection().unwrap();
    assert!(state.clips_for_track(&track_id).unwrap().0.is_empty());

    let ids = state.paste_at(&track_id, 8.0).unwrap();
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi[0].id, ids[0]);
    assert_eq!(midi[0].start_beat, 8.0);
    assert_eq!(midi[0].duration, 4.0);
}

#[test]
fn duplicate_places_the_copy_right_behind() {
    let (mut state, track_id) = project_with_midi_track();
    state.add_midi_clip(&track_id, "a", 2.0, 2.0).unwrap();
    state.selection.begin(2.0, &track_id);
    state.selection.update(4.0);
    let ids = state.duplicate_selection().unwrap();
    assert_eq!(ids.len(), 1);
    let (midi, _) = state.clips_for_track(&track_id).unwrap();
    assert_eq!(midi.len(), 2);
    assert_eq!(midi[1].start_beat, 4.0);
    assert_eq!(midi[1].duration, 2.0);
}

#[test]
fn solo_modifier_semantics() {
    let mut state = ProjectState::new();
    let a = state.add_track(TrackKind::Midi).unwrap();
    let b = state.add_track(TrackKind::Midi).unwrap();
    let c = state.add_track(TrackKind::Midi).unwrap();

    // Plain solo is exclusive.
    state.toggle_solo(&a, false);
    state.toggle_solo(&b, false);
    assert!(!state.tracks.is_solo(&a));
    assert!(state.tracks.is_solo(&b));

    // Modifier accumulates.
    state.toggle_solo(&c, true);
    assert!(state.tracks.is_solo(&b));
    assert!(state.tracks.is_solo(&c));
    assert!(state.tracks.any_solo());

    let any_solo = state.tracks.any_solo();
    assert!(!state.tracks.get(&a).unwrap().audible(any_solo));
    assert!(state.tracks.get(&b).unwrap().audible(any_solo));

    // Plain solo on an already-soloed track clears the set.
    state.toggle_solo(&b, false);
    assert!(!state.tracks.any_solo());
    assert!(state.tracks.get(&a).unwrap().audible(false));
}

#[test]
fn mute_and_solo_interact() {
    let mut state = ProjectState::new();
    let a = state.add_track(TrackKind::Midi).unwrap();
    state.set_mute(&a, true).unwrap();
    assert!(!state.tracks.get(&a).unwrap().audible(false));
    // Soloing a muted track makes it audible again.
    state.toggle_solo(&a, false);
    assert!(state.tracks.get(&a).unwrap().audible(true));
}

#[test]
fn mixer_values_are_clamped() {
    let mut state = ProjectState::new();
    let a = state.add_track(TrackKind::Midi).unwrap();
    state.set_volume(&a, 1.8).unwrap();
    state.set_pan(&a, -0.3).unwrap();
    let track = state.tracks.get(&a).unwrap();
    assert_eq!(track.volume, 1.0);
    assert_eq!(track.pan, 0.0);
    assert_eq!(state.set_volume("ghost", 0.5), Err(ModelError::NotFound));
}

#[test]
fn removing_a_track_clears_its_selection() {
    let (mut state, track_id) = project_with_midi_track();
    state.selection.begin(0.0, &track_id);
    state.selection.update(4.0);
    state.remove_track(&track_id).unwrap();
    assert!(!state.selection.is_active());
}

#[test]
fn update_track_refuses_overlapping_replacements() {
    let (mut state, track_id) = project_with_midi_track();
    state.add_midi_clip(&track_id, "a", 0.0, 4.0).unwrap();

    let mut replacement = state.tracks.get(&track_id).unwrap().clone();
    let mut rogue = replacement.midi_clips[0].clone();
    rogue.id = "rogue".into();
    rogue.start_beat = 2.0;
    replacement.midi_clips.push(rogue);
    assert_eq!(
        state.update_track(&track_id, replacement),
        Err(ModelError::OverlapConflict)
    );
    // The old track is still in place.
    assert_eq!(state.clips_for_track(&track_id).unwrap().0.len(), 1);

    let mut renamed = state.tracks.get(&track_id).unwrap().clone();
    renamed.name = "Lead".into();
    state.update_track(&track_id, renamed).unwrap();
    assert_eq!(state.tracks.get(&track_id).unwrap().name, "Lead");
}

#[test]
fn can_add_queries_check_track_and_interval() {
    let (mut state, track_id) = project_with_midi_track();
    state.add_midi_clip(&track_id, "a", 0.0, 4.0).unwrap();
    assert!(state.can_add_midi_clip(&track_id, 4.0, 2.0));
    assert!(!state.can_add_midi_clip(&track_id, 3.0, 2.0));
    assert!(!state.can_add_audio_clip(&track_id, 10.0, 2.0));
    assert!(!state.can_add_midi_clip("ghost", 0.0, 1.0));
}

#[test]
fn tracks_serialize_round_trip() {
    let mut track = Track::new(TrackKind::Midi);
    let mut clip = crate::core::clip::MidiClip::empty("Keys", 0.0, 4.0, None);
    clip.add_note(60, 1.0, 1.0, 100).unwrap();
    track.add_midi_clip(clip).unwrap();

    let json = serde_json::to_string(&track).unwrap();
    let back: Track = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, track.id);
    assert_eq!(back.midi_clips.len(), 1);
    assert_eq!(back.midi_clips[0].notes[0].pitch, 60);
    assert_eq!(back.midi_clips[0].end_beat(), 4.0);
}
