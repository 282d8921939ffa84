pub mod services;

#[cfg(test)]
mod tests;

use crate::core::{
    Beat,
    clip::{AudioClip, MidiClip, ResizeAnchor},
    clipboard::{ClipSnapshot, Clipboard, ClipboardEntry},
    error::{ModelError, ModelResult},
    selection::Selection,
    source::AudioItem,
    track::{RangeEdit, Track, TrackKind},
};
use serde::{Deserialize, Serialize};
use services::TrackService;
use std::sync::Arc;

pub const MIN_TEMPO: f32 = 10.0;
pub const MAX_TEMPO: f32 = 999.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u32,
    pub unit_note: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            unit_note: 4,
        }
    }
}

/// The whole editable project: tracks and clips, transport basics, the
/// current selection and the clipboard.
///
/// Single-writer: all mutation goes through `&mut self` methods, each of
/// which either applies completely or returns an error leaving the project
/// untouched.
pub struct ProjectState {
    tempo: f32,
    pub time_signature: TimeSignature,
    pub playhead: Beat,
    pub tracks: TrackService,
    pub selection: Selection,
    pub clipboard: Clipboard,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectState {
    pub fn new() -> Self {
        Self {
            tempo: 120.0,
            time_signature: TimeSignature::default(),
            playhead: 0.0,
            tracks: TrackService::new(),
            selection: Selection::new(),
            clipboard: Clipboard::new(),
        }
    }

    // Transport

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    /// Set the project tempo in BPM, clamped to the supported range.
    pub fn set_tempo(&mut self, tempo: f32) {
        self.tempo = tempo.clamp(MIN_TEMPO, MAX_TEMPO);
    }

    pub fn set_playhead(&mut self, beat: Beat) {
        self.playhead = beat.max(0.0);
    }

    // Tracks

    /// Append a new track of `kind`, returning its id.
    pub fn add_track(&mut self, kind: TrackKind) -> ModelResult<String> {
        let index = self.tracks.length();
        self.add_track_at(kind, index)
    }

    pub fn add_track_at(&mut self, kind: TrackKind, index: usize) -> ModelResult<String> {
        if kind == TrackKind::Master {
            return Err(ModelError::InvalidParameter("master track is permanent"));
        }
        let track = Track::new(kind);
        let id = track.id.clone();
        log::debug!("Adding {:?} track {id} at index {index}", kind);
        self.tracks.insert(track, index)?;
        Ok(id)
    }

    pub fn remove_track(&mut self, id: &str) -> ModelResult<Track> {
        log::debug!("Removing track {id}");
        let (track, _) = self.tracks.delete(id)?;
        if self.selection.track_id() == Some(id) {
            self.selection.clear();
        }
        Ok(track)
    }

    pub fn toggle_solo(&mut self, id: &str, modifier_pressed: bool) {
        self.tracks.toggle_solo(id, modifier_pressed);
    }

    pub fn set_mute(&mut self, id: &str, mute: bool) -> ModelResult<()> {
        let track = self.tracks.get_mut(id).ok_or(ModelError::NotFound)?;
        track.muted = mute;
        Ok(())
    }

    pub fn set_volume(&mut self, id: &str, volume: f32) -> ModelResult<()> {
        let track = self.tracks.get_mut(id).ok_or(ModelError::NotFound)?;
        track.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_pan(&mut self, id: &str, pan: f32) -> ModelResult<()> {
        let track = self.tracks.get_mut(id).ok_or(ModelError::NotFound)?;
        track.pan = pan.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_armed(&mut self, id: &str, armed: bool) -> ModelResult<()> {
        let track = self.tracks.get_mut(id).ok_or(ModelError::NotFound)?;
        track.armed = armed;
        Ok(())
    }

    /// Replace a track wholesale (e.g. after an external edit round trip).
    /// Refused when the replacement violates the non-overlap invariant.
    pub fn update_track(&mut self, id: &str, track: Track) -> ModelResult<()> {
        self.tracks.update_track(id, track)
    }

    // Clips

    /// Create an empty MIDI clip on `track_id`, returning the clip id.
    pub fn add_midi_clip(
        &mut self,
        track_id: &str,
        name: &str,
        start_beat: Beat,
        duration: Beat,
    ) -> ModelResult<String> {
        let track = self.tracks.get_mut(track_id).ok_or(ModelError::NotFound)?;
        let clip = MidiClip::empty(name, start_beat, duration, None);
        let id = clip.id.clone();
        log::debug!("Adding MIDI clip {id} to track {track_id} at beat {start_beat}");
        track.add_midi_clip(clip)?;
        Ok(id)
    }

    /// Place `item` on `track_id` as a clip spanning its natural length at
    /// the current tempo.
    pub fn add_audio_clip(
        &mut self,
        track_id: &str,
        item: Arc<AudioItem>,
        start_beat: Beat,
    ) -> ModelResult<String> {
        let duration = item.duration_secs() * self.tempo as f64 / 60.0;
        let track = self.tracks.get_mut(track_id).ok_or(ModelError::NotFound)?;
        let clip = AudioClip::from_item(item, start_beat, duration)?;
        let id = clip.id.clone();
        log::debug!("Adding audio clip {id} to track {track_id} at beat {start_beat}");
        track.add_audio_clip(clip)?;
        Ok(id)
    }

    pub fn remove_clip(&mut self, clip_id: &str) -> ModelResult<()> {
        let track = self
            .tracks
            .track_from_clip_id_mut(clip_id)
            .ok_or(ModelError::NotFound)?;
        track.remove_clip(clip_id)?;
        self.selection.clip_ids.retain(|id| id != clip_id);
        Ok(())
    }

    pub fn rename_clip(&mut self, clip_id: &str, name: &str) -> ModelResult<()> {
        let track = self
            .tracks
            .track_from_clip_id_mut(clip_id)
            .ok_or(ModelError::NotFound)?;
        track.rename_clip(clip_id, name)
    }

    /// Move a clip within its track. Returns the ids of clips deleted to
    /// make room.
    pub fn move_clip(&mut self, clip_id: &str, new_start: Beat) -> ModelResult<Vec<String>> {
        let track = self
            .tracks
            .track_from_clip_id_mut(clip_id)
            .ok_or(ModelError::NotFound)?;
        log::debug!("Moving clip {clip_id} to beat {new_start}");
        track.move_clip(clip_id, new_start)
    }

    /// Resize a clip around `anchor`. Returns the ids of clips deleted to
    /// make room.
    pub fn resize_clip(
        &mut self,
        clip_id: &str,
        new_duration: Beat,
        anchor: ResizeAnchor,
    ) -> ModelResult<Vec<String>> {
        let track = self
            .tracks
            .track_from_clip_id_mut(clip_id)
            .ok_or(ModelError::NotFound)?;
        log::debug!("Resizing clip {clip_id} to {new_duration} beats");
        track.resize_clip(clip_id, new_duration, anchor)
    }

    // Selection edits

    /// Cut clip boundaries at both edges of the active range selection.
    pub fn split_selection(&mut self) -> ModelResult<RangeEdit> {
        let (track_id, start, end) = self.selected_range()?;
        let track = self
            .tracks
            .get_mut(&track_id)
            .ok_or(ModelError::NotFound)?;
        log::debug!("Splitting [{start}, {end}) on track {track_id}");
        Ok(track.split_range(start, end))
    }

    /// Split every clip under the playhead, across all tracks.
    pub fn split_at_playhead(&mut self) -> Vec<(String, String)> {
        let beat = self.playhead;
        let ids: Vec<String> = self.tracks.tracks().map(|t| t.id.clone()).collect();
        let mut splits = Vec::new();
        for id in ids {
            if let Some(track) = self.tracks.get_mut(&id)
                && let Some(pair) = track.split_at(beat)
            {
                splits.push(pair);
            }
        }
        splits
    }

    /// Delete the selection: the toggled clip set when non-empty, otherwise
    /// the range selection's material.
    pub fn delete_selection(&mut self) -> ModelResult<RangeEdit> {
        if !self.selection.clip_ids.is_empty() {
            let ids = std::mem::take(&mut self.selection.clip_ids);
            let removed = self.tracks.delete_clips(&ids);
            return Ok(RangeEdit {
                removed,
                created: Vec::new(),
            });
        }
        let (track_id, start, end) = self.selected_range()?;
        let track = self
            .tracks
            .get_mut(&track_id)
            .ok_or(ModelError::NotFound)?;
        log::debug!("Deleting [{start}, {end}) on track {track_id}");
        let edit = track.remove_range(start, end);
        self.selection.clear();
        Ok(edit)
    }

    /// Copy the selection to the clipboard. The project itself is untouched.
    pub fn copy_selection(&mut self) -> ModelResult<usize> {
        let entries = self.snapshot_selection()?;
        let count = entries.len();
        self.clipboard.set(entries);
        Ok(count)
    }

    /// Copy, then delete the selected material.
    pub fn cut_selection(&mut self) -> ModelResult<RangeEdit> {
        let entries = self.snapshot_selection()?;
        self.clipboard.set(entries);
        self.delete_selection()
    }

    /// Paste the clipboard onto `track_id` with the earliest entry at `at`.
    /// All-or-nothing; on conflict nothing changes. Returns the new clip ids.
    pub fn paste_at(&mut self, track_id: &str, at: Beat) -> ModelResult<Vec<String>> {
        if self.clipboard.is_empty() {
            return Err(ModelError::InvalidParameter("clipboard is empty"));
        }
        let entries = self.clipboard.entries().to_vec();
        let track = self.tracks.get_mut(track_id).ok_or(ModelError::NotFound)?;
        log::debug!("Pasting {} clip(s) at beat {at} on track {track_id}", entries.len());
        track.paste_clips(at, &entries)
    }

    /// Copy the selection and paste it right behind itself on the same
    /// track. The clipboard is left as the copy.
    pub fn duplicate_selection(&mut self) -> ModelResult<Vec<String>> {
        let entries = self.snapshot_selection()?;
        let track_id = self
            .selection
            .track_id()
            .map(str::to_string)
            .or_else(|| {
                self.selection
                    .clip_ids
                    .first()
                    .and_then(|id| self.tracks.track_from_clip_id(id))
                    .map(|t| t.id.clone())
            })
            .ok_or(ModelError::NotFound)?;
        let end = entries
            .iter()
            .map(|e| e.effective_range().1)
            .max_by(|a, b| a.total_cmp(b))
            .ok_or(ModelError::InvalidParameter("empty selection"))?;
        self.clipboard.set(entries.clone());
        let track = self.tracks.get_mut(&track_id).ok_or(ModelError::NotFound)?;
        track.paste_clips(end, &entries)
    }

    // Queries

    pub fn track_len(&self) -> usize {
        self.tracks.length()
    }

    pub fn master_track(&self) -> &Track {
        self.tracks.master_track()
    }

    pub fn can_add_midi_clip(&self, track_id: &str, start_beat: Beat, duration: Beat) -> bool {
        self.tracks
            .get(track_id)
            .is_some_and(|t| t.can_add_midi_clip(start_beat, duration))
    }

    pub fn can_add_audio_clip(&self, track_id: &str, start_beat: Beat, duration: Beat) -> bool {
        self.tracks
            .get(track_id)
            .is_some_and(|t| t.can_add_audio_clip(start_beat, duration))
    }

    /// `(midi, audio)` clip slices of a track.
    pub fn clips_for_track(&self, track_id: &str) -> ModelResult<(&[MidiClip], &[AudioClip])> {
        let track = self.tracks.get(track_id).ok_or(ModelError::NotFound)?;
        Ok((&track.midi_clips, &track.audio_clips))
    }

    fn selected_range(&self) -> ModelResult<(String, Beat, Beat)> {
        let (start, end) = self
            .selection
            .normalized_range()
            .ok_or(ModelError::InvalidParameter("no active selection"))?;
        if end - start <= 0.0 {
            return Err(ModelError::InvalidParameter("empty selection range"));
        }
        let track_id = self
            .selection
            .track_id()
            .ok_or(ModelError::InvalidParameter("no selected track"))?;
        Ok((track_id.to_string(), start, end))
    }

    /// Clipboard entries for the current selection: the toggled clip set is
    /// copied whole, a range selection records edge trims against each clip
    /// it touches.
    fn snapshot_selection(&self) -> ModelResult<Vec<ClipboardEntry>> {
        if !self.selection.clip_ids.is_empty() {
            let mut entries = Vec::new();
            for clip_id in &self.selection.clip_ids {
                let track = self
                    .tracks
                    .track_from_clip_id(clip_id)
                    .ok_or(ModelError::NotFound)?;
                if let Some(clip) = track.midi_clips.iter().find(|c| c.id == *clip_id) {
                    entries.push(ClipboardEntry::whole(ClipSnapshot::Midi(clip.clone())));
                } else if let Some(clip) = track.audio_clips.iter().find(|c| c.id == *clip_id) {
                    entries.push(ClipboardEntry::whole(ClipSnapshot::Audio(clip.clone())));
                }
            }
            return Ok(entries);
        }

        let (track_id, start, end) = self.selected_range()?;
        let track = self.tracks.get(&track_id).ok_or(ModelError::NotFound)?;
        let mut entries = Vec::new();
        for clip in &track.midi_clips {
            if clip.start_beat < end && clip.end_beat() > start {
                entries.push(trimmed_entry(
                    ClipSnapshot::Midi(clip.clone()),
                    start,
                    end,
                ));
            }
        }
        for clip in &track.audio_clips {
            if clip.start_beat < end && clip.end_beat() > start {
                entries.push(trimmed_entry(
                    ClipSnapshot::Audio(clip.clone()),
                    start,
                    end,
                ));
            }
        }
        if entries.is_empty() {
            return Err(ModelError::InvalidParameter("nothing selected"));
        }
        Ok(entries)
    }
}

fn trimmed_entry(snapshot: ClipSnapshot, start: Beat, end: Beat) -> ClipboardEntry {
    let left_trim = (start - snapshot.start_beat()).max(0.0);
    let right_trim = (snapshot.end_beat() - end).max(0.0);
    ClipboardEntry {
        snapshot,
        left_trim,
        right_trim,
    }
}
