use crate::core::{
    error::{ModelError, ModelResult},
    track::Track,
};
use std::collections::HashMap;

/// Service managing tracks: the track map, their display order, the solo set
/// and the selected set. The master track exists from construction on and is
/// never part of `order`.
pub struct TrackService {
    tracks: HashMap<String, Track>,
    order: Vec<String>,

    solo_tracks: Vec<String>,
    pub selected_tracks: Vec<String>,
}

impl Default for TrackService {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackService {
    pub fn new() -> Self {
        let mut tracks = HashMap::new();
        tracks.insert("master".to_string(), Track::master());
        Self {
            tracks,
            order: Vec::new(),
            solo_tracks: Vec::new(),
            selected_tracks: Vec::new(),
        }
    }

    // Getters

    /// Number of tracks, master excluded.
    pub fn length(&self) -> usize {
        self.order.len()
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.get_mut(id)
    }

    pub fn from_index(&self, index: usize) -> Option<&Track> {
        self.order.get(index).and_then(|id| self.tracks.get(id))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|t_id| t_id == id)
    }

    /// Tracks in display order, master excluded.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn master_track(&self) -> &Track {
        &self.tracks["master"]
    }

    pub fn master_track_mut(&mut self) -> &mut Track {
        self.tracks.get_mut("master").unwrap()
    }

    pub fn any_solo(&self) -> bool {
        !self.solo_tracks.is_empty()
    }

    pub fn is_solo(&self, id: &str) -> bool {
        self.solo_tracks.iter().any(|t_id| t_id == id)
    }

    pub fn track_from_clip_id(&self, clip_id: &str) -> Option<&Track> {
        self.tracks.values().find(|t| t.contains_clip(clip_id))
    }

    pub fn track_from_clip_id_mut(&mut self, clip_id: &str) -> Option<&mut Track> {
        self.tracks.values_mut().find(|t| t.contains_clip(clip_id))
    }

    // Mutations

    /// Insert a track at position `index` in the display order.
    pub fn insert(&mut self, track: Track, index: usize) -> ModelResult<()> {
        if track.id == "master" || self.tracks.contains_key(&track.id) {
            return Err(ModelError::InvalidParameter("duplicate track id"));
        }
        if index > self.order.len() {
            return Err(ModelError::InvalidParameter("track index out of range"));
        }
        self.order.insert(index, track.id.clone());
        self.tracks.insert(track.id.clone(), track);
        Ok(())
    }

    pub fn push(&mut self, track: Track) -> ModelResult<()> {
        let index = self.order.len();
        self.insert(track, index)
    }

    /// Delete a track by `id`. The master track cannot be deleted. Returns
    /// the removed track and its position.
    pub fn delete(&mut self, id: &str) -> ModelResult<(Track, usize)> {
        if id == "master" {
            return Err(ModelError::InvalidParameter("master track is permanent"));
        }
        let pos = self.index_of(id).ok_or(ModelError::NotFound)?;
        let track = self.tracks.remove(id).ok_or(ModelError::NotFound)?;

        self.order.remove(pos);
        self.selected_tracks.retain(|sel| sel != id);
        self.solo_tracks.retain(|sel| sel != id);

        Ok((track, pos))
    }

    /// Replace a track wholesale, keeping its position. The replacement must
    /// satisfy the track invariant; a replacement with internally overlapping
    /// clips is refused and the old track stays.
    pub fn update_track(&mut self, id: &str, track: Track) -> ModelResult<()> {
        if track.id != id || !self.tracks.contains_key(id) {
            return Err(ModelError::NotFound);
        }
        if !track.invariant_holds() {
            return Err(ModelError::OverlapConflict);
        }
        self.tracks.insert(id.to_string(), track);
        Ok(())
    }

    /// Remove clips whose id is in `ids` from every track. Returns the ids
    /// actually removed.
    pub fn delete_clips(&mut self, ids: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        for track in self.tracks.values_mut() {
            removed.extend(track.delete_clips(ids));
        }
        removed
    }

    /// Mark `id` as the single selected track.
    pub fn select(&mut self, id: &str) {
        if self.tracks.contains_key(id) {
            self.selected_tracks = vec![id.to_string()];
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.selected_tracks
            .first()
            .and_then(|id| self.tracks.get(id))
    }

    /// Solo/unsolo a track. Without the modifier, soloing is exclusive;
    /// with it, tracks accumulate in the solo set.
    pub fn toggle_solo(&mut self, id: &str, modifier_pressed: bool) {
        if !self.tracks.contains_key(id) {
            return;
        }
        let was_solo = self.is_solo(id);
        if modifier_pressed {
            if was_solo {
                self.solo_tracks.retain(|t_id| t_id != id);
            } else {
                self.solo_tracks.push(id.to_string());
            }
        } else {
            self.solo_tracks = if was_solo {
                vec![]
            } else {
                vec![id.to_string()]
            };
        }
        for track in self.tracks.values_mut() {
            track.solo = false;
        }
        for t_id in &self.solo_tracks {
            if let Some(track) = self.tracks.get_mut(t_id) {
                track.solo = true;
            }
        }
    }
}
