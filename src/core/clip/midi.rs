use crate::core::{
    BEAT_EPSILON, Beat,
    clip::{MIN_CLIP_DURATION, ResizeAnchor, TimelineClip, clamp_range},
    color::Color,
    error::{ModelError, ModelResult},
};
use serde::{Deserialize, Serialize};

/// A note inside a [`MidiClip`]. `start_beat` is relative to the clip start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub id: String,
    pub pitch: u8,
    pub start_beat: Beat,
    pub duration: Beat,
    pub velocity: u8,
}

/// A placed region of MIDI notes on a track.
///
/// Invariant: every note fits inside `[0, duration]`. The constructor gate in
/// [`MidiClip::add_note`] enforces it for new notes and the slicing/resize
/// code re-derives the note list whenever the clip bounds change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidiClip {
    pub id: String,
    pub name: String,
    pub start_beat: Beat,
    pub duration: Beat,
    pub color: Option<Color>,
    pub notes: Vec<MidiNote>,
}

impl MidiClip {
    /// New clip with no notes.
    pub fn empty(name: &str, start_beat: Beat, duration: Beat, color: Option<Color>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().into(),
            name: name.into(),
            start_beat,
            duration,
            color,
            notes: Vec::new(),
        }
    }

    pub fn end_beat(&self) -> Beat {
        self.start_beat + self.duration
    }

    /// Add a note, keeping the list ordered by start. Rejects out-of-range
    /// pitch/velocity and notes that would not fit inside the clip; on
    /// rejection the clip is unchanged.
    pub fn add_note(
        &mut self,
        pitch: u8,
        start_beat: Beat,
        duration: Beat,
        velocity: u8,
    ) -> ModelResult<&MidiNote> {
        if pitch > 127 {
            return Err(ModelError::InvalidParameter("pitch out of range"));
        }
        if velocity > 127 {
            return Err(ModelError::InvalidParameter("velocity out of range"));
        }
        if duration <= 0.0 {
            return Err(ModelError::InvalidParameter("non-positive note duration"));
        }
        if start_beat < 0.0 || start_beat >= self.duration {
            return Err(ModelError::InvalidParameter("note start outside clip"));
        }
        if start_beat + duration > self.duration + BEAT_EPSILON {
            return Err(ModelError::InvalidParameter("note end past clip end"));
        }
        let note = MidiNote {
            id: uuid::Uuid::new_v4().into(),
            pitch,
            start_beat,
            duration,
            velocity,
        };
        let index = self
            .notes
            .partition_point(|n| n.start_beat <= note.start_beat);
        self.notes.insert(index, note);
        Ok(&self.notes[index])
    }

    /// Remove a note by id, returning it.
    pub fn remove_note(&mut self, note_id: &str) -> ModelResult<MidiNote> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or(ModelError::NotFound)?;
        Ok(self.notes.remove(index))
    }
}

impl TimelineClip for MidiClip {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn start_beat(&self) -> Beat {
        self.start_beat
    }
    fn set_start_beat(&mut self, beat: Beat) {
        self.start_beat = beat;
    }
    fn duration(&self) -> Beat {
        self.duration
    }

    fn sliced(&self, start: Beat, end: Beat) -> Option<Self> {
        let (s, e) = clamp_range(self.start_beat, self.end_beat(), start, end)?;
        let mut notes = Vec::new();
        for note in &self.notes {
            // Note bounds in absolute beats.
            let note_start = self.start_beat + note.start_beat;
            let note_end = note_start + note.duration;
            let kept_start = note_start.max(s);
            let kept_end = note_end.min(e);
            if kept_end - kept_start <= BEAT_EPSILON {
                continue;
            }
            notes.push(MidiNote {
                id: uuid::Uuid::new_v4().into(),
                pitch: note.pitch,
                start_beat: (note_start - s).max(0.0),
                duration: kept_end - kept_start,
                velocity: note.velocity,
            });
        }
        Some(Self {
            id: uuid::Uuid::new_v4().into(),
            name: self.name.clone(),
            start_beat: s,
            duration: e - s,
            color: self.color,
            notes,
        })
    }

    // MIDI clips can extend freely to the right; anchored left they stop at
    // beat 0.
    fn clamp_duration(&self, new_duration: Beat, anchor: ResizeAnchor) -> Beat {
        let clamped = new_duration.max(MIN_CLIP_DURATION);
        match anchor {
            ResizeAnchor::Right => clamped,
            ResizeAnchor::Left => clamped.min(self.end_beat()),
        }
    }

    // Notes are shifted to the new local origin, truncated at the new
    // bounds, and dropped once nothing of them remains.
    fn apply_resize(&mut self, new_duration: Beat, anchor: ResizeAnchor) {
        let new_start = match anchor {
            ResizeAnchor::Right => self.start_beat,
            ResizeAnchor::Left => self.end_beat() - new_duration,
        };
        let shift = self.start_beat - new_start;
        self.notes.retain_mut(|note| {
            let mut start = note.start_beat + shift;
            let mut duration = note.duration;
            if start < 0.0 {
                duration += start;
                start = 0.0;
            }
            duration = duration.min(new_duration - start);
            note.start_beat = start;
            note.duration = duration;
            duration > BEAT_EPSILON
        });
        self.start_beat = new_start;
        self.duration = new_duration;
    }
}
