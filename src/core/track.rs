use crate::core::{
    Beat,
    clip::{AudioClip, MidiClip, ResizeAnchor, TimelineClip},
    clipboard::{ClipSnapshot, ClipboardEntry},
    color::Color,
    error::{ModelError, ModelResult},
    naming,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Audio,
    Midi,
    Instrument,
    Master,
}

impl TrackKind {
    /// Whether tracks of this kind carry MIDI clips.
    pub fn holds_midi(self) -> bool {
        matches!(self, TrackKind::Midi | TrackKind::Instrument)
    }

    /// Whether tracks of this kind carry audio clips.
    pub fn holds_audio(self) -> bool {
        matches!(self, TrackKind::Audio)
    }

    fn default_name(self) -> &'static str {
        match self {
            TrackKind::Audio => "Audio Track",
            TrackKind::Midi => "MIDI Track",
            TrackKind::Instrument => "Instrument Track",
            TrackKind::Master => "Master",
        }
    }
}

/// Opaque effect slot. The DSP lives in the host; the model only keeps the
/// chain order and the enabled flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

impl Effect {
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().into(),
            name: name.into(),
            enabled: true,
        }
    }
}

/// Ids touched by a range edit, reported back to the host so it can update
/// whatever it keeps per clip.
#[derive(Debug, Clone, Default)]
pub struct RangeEdit {
    /// Clips that no longer exist.
    pub removed: Vec<String>,
    /// Newly created clip parts.
    pub created: Vec<String>,
}

impl RangeEdit {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.created.is_empty()
    }
}

/// A track: ordered clips of one kind plus mixer state.
///
/// Central invariant: same-kind clips on one track never overlap in
/// `[start, end)`. `add_*_clip` refuses conflicting clips outright; the
/// move/resize/split operations resolve conflicts per their own policies.
/// Only the list matching `kind` is ever populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub kind: TrackKind,
    pub muted: bool,
    pub solo: bool,
    pub armed: bool,
    pub enabled: bool,
    /// Gain fader position, 0..=1.
    pub volume: f32,
    /// Pan position, 0..=1 with 0.5 centered.
    pub pan: f32,
    pub height: f32,
    pub color: Color,
    pub effects: Vec<Effect>,
    pub instrument: Option<Effect>,
    pub midi_clips: Vec<MidiClip>,
    pub audio_clips: Vec<AudioClip>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: kind.default_name().into(),
            kind,
            muted: false,
            solo: false,
            armed: false,
            enabled: true,
            volume: 1.0,
            pan: 0.5,
            height: 60.0,
            color: Color::random(),
            effects: Vec::new(),
            instrument: None,
            midi_clips: Vec::new(),
            audio_clips: Vec::new(),
        }
    }

    /// The permanent master track, created once at project init.
    pub fn master() -> Self {
        let mut track = Self::new(TrackKind::Master);
        track.id = "master".into();
        track
    }

    /// Solo-mute interaction: with any track soloed, non-soloed tracks are
    /// inaudible. Derived on demand, never stored.
    pub fn audible(&self, any_solo: bool) -> bool {
        self.enabled && !(self.muted && !self.solo) && (self.solo || !any_solo)
    }

    // Queries

    pub fn can_add_midi_clip(&self, start_beat: Beat, duration: Beat) -> bool {
        self.kind.holds_midi()
            && duration > 0.0
            && !overlaps_any(&self.midi_clips, start_beat, start_beat + duration, None)
    }

    pub fn can_add_audio_clip(&self, start_beat: Beat, duration: Beat) -> bool {
        self.kind.holds_audio()
            && duration > 0.0
            && !overlaps_any(&self.audio_clips, start_beat, start_beat + duration, None)
    }

    /// Batch variant: the incoming clips are checked against the existing
    /// ones and against each other.
    pub fn can_add_midi_clips(&self, clips: &[MidiClip]) -> bool {
        self.kind.holds_midi() && batch_fits(&self.midi_clips, clips)
    }

    pub fn can_add_audio_clips(&self, clips: &[AudioClip]) -> bool {
        self.kind.holds_audio() && batch_fits(&self.audio_clips, clips)
    }

    pub fn contains_clip(&self, clip_id: &str) -> bool {
        self.midi_clips.iter().any(|c| c.id == clip_id)
            || self.audio_clips.iter().any(|c| c.id == clip_id)
    }

    /// `[start, end)` of a clip on this track.
    pub fn clip_interval(&self, clip_id: &str) -> Option<(Beat, Beat)> {
        if let Some(clip) = self.midi_clips.iter().find(|c| c.id == clip_id) {
            return Some((clip.start_beat, clip.end_beat()));
        }
        self.audio_clips
            .iter()
            .find(|c| c.id == clip_id)
            .map(|clip| (clip.start_beat, clip.end_beat()))
    }

    pub(crate) fn invariant_holds(&self) -> bool {
        pairwise_disjoint(&self.midi_clips)
            && pairwise_disjoint(&self.audio_clips)
            && (self.kind.holds_midi() || self.midi_clips.is_empty())
            && (self.kind.holds_audio() || self.audio_clips.is_empty())
    }

    // Plain list mutation. No implicit overlap resolution; conflicts are
    // refused and the caller clears them first.

    pub fn add_midi_clip(&mut self, clip: MidiClip) -> ModelResult<()> {
        if !self.kind.holds_midi() {
            return Err(ModelError::InvalidParameter("track holds no MIDI clips"));
        }
        if clip.duration <= 0.0 {
            return Err(ModelError::InvalidParameter("non-positive clip duration"));
        }
        if overlaps_any(&self.midi_clips, clip.start_beat, clip.end_beat(), None) {
            return Err(ModelError::OverlapConflict);
        }
        insert_sorted(&mut self.midi_clips, clip);
        Ok(())
    }

    pub fn add_audio_clip(&mut self, clip: AudioClip) -> ModelResult<()> {
        if !self.kind.holds_audio() {
            return Err(ModelError::InvalidParameter("track holds no audio clips"));
        }
        if clip.duration_in_beats <= 0.0 {
            return Err(ModelError::InvalidParameter("non-positive clip duration"));
        }
        if overlaps_any(&self.audio_clips, clip.start_beat, clip.end_beat(), None) {
            return Err(ModelError::OverlapConflict);
        }
        insert_sorted(&mut self.audio_clips, clip);
        Ok(())
    }

    pub fn remove_clip(&mut self, clip_id: &str) -> ModelResult<()> {
        if let Some(index) = self.midi_clips.iter().position(|c| c.id == clip_id) {
            self.midi_clips.remove(index);
            return Ok(());
        }
        if let Some(index) = self.audio_clips.iter().position(|c| c.id == clip_id) {
            self.audio_clips.remove(index);
            return Ok(());
        }
        Err(ModelError::NotFound)
    }

    pub fn rename_clip(&mut self, clip_id: &str, name: &str) -> ModelResult<()> {
        if let Some(clip) = self.midi_clips.iter_mut().find(|c| c.id == clip_id) {
            clip.name = name.into();
            return Ok(());
        }
        if let Some(clip) = self.audio_clips.iter_mut().find(|c| c.id == clip_id) {
            clip.name = name.into();
            return Ok(());
        }
        Err(ModelError::NotFound)
    }

    /// Remove any clips whose id is in `ids`, returning the removed ids.
    pub fn delete_clips(&mut self, ids: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        self.midi_clips.retain(|c| {
            let hit = ids.contains(&c.id);
            if hit {
                removed.push(c.id.clone());
            }
            !hit
        });
        self.audio_clips.retain(|c| {
            let hit = ids.contains(&c.id);
            if hit {
                removed.push(c.id.clone());
            }
            !hit
        });
        removed
    }

    // Interval engine

    /// Relocate a clip. Destructive policy: every other clip overlapping the
    /// landing interval is deleted outright, nothing is shifted. Returns the
    /// deleted ids.
    pub fn move_clip(&mut self, clip_id: &str, new_start: Beat) -> ModelResult<Vec<String>> {
        if new_start < 0.0 {
            return Err(ModelError::InvalidParameter("negative clip start"));
        }
        if self.midi_clips.iter().any(|c| c.id == clip_id) {
            move_in(&mut self.midi_clips, clip_id, new_start)
        } else if self.audio_clips.iter().any(|c| c.id == clip_id) {
            move_in(&mut self.audio_clips, clip_id, new_start)
        } else {
            Err(ModelError::NotFound)
        }
    }

    /// Resize a clip around the anchored edge, clamped per clip type. Same
    /// destructive policy toward overlapped clips as [`Track::move_clip`].
    pub fn resize_clip(
        &mut self,
        clip_id: &str,
        new_duration: Beat,
        anchor: ResizeAnchor,
    ) -> ModelResult<Vec<String>> {
        if new_duration <= 0.0 {
            return Err(ModelError::InvalidParameter("non-positive clip duration"));
        }
        if self.midi_clips.iter().any(|c| c.id == clip_id) {
            resize_in(&mut self.midi_clips, clip_id, new_duration, anchor)
        } else if self.audio_clips.iter().any(|c| c.id == clip_id) {
            resize_in(&mut self.audio_clips, clip_id, new_duration, anchor)
        } else {
            Err(ModelError::NotFound)
        }
    }

    /// Delete `[start, end)` from every clip it touches: covered clips go
    /// away, straddled clips are trimmed, a strictly straddling clip is cut
    /// into a left and a right part.
    pub fn remove_range(&mut self, start: Beat, end: Beat) -> RangeEdit {
        let mut edit = remove_range_in(&mut self.midi_clips, start, end);
        let audio = remove_range_in(&mut self.audio_clips, start, end);
        edit.removed.extend(audio.removed);
        edit.created.extend(audio.created);
        edit
    }

    /// Cut clip boundaries at `start` and `end`, keeping all material: a
    /// strictly straddling clip becomes three parts.
    pub fn split_range(&mut self, start: Beat, end: Beat) -> RangeEdit {
        let mut edit = split_range_in(&mut self.midi_clips, start, end);
        let audio = split_range_in(&mut self.audio_clips, start, end);
        edit.removed.extend(audio.removed);
        edit.created.extend(audio.created);
        edit
    }

    /// Split the clip under `beat` in two. No-op when no clip spans the
    /// position. Returns `(left, right)` ids.
    pub fn split_at(&mut self, beat: Beat) -> Option<(String, String)> {
        if let Some(ids) = split_point_in(&mut self.midi_clips, beat) {
            return Some(ids);
        }
        split_point_in(&mut self.audio_clips, beat)
    }

    /// Place the clipboard entries, preserving their relative spacing, with
    /// the earliest entry at `at`. All-or-nothing: any conflict rejects the
    /// whole paste and deletes nothing.
    pub fn paste_clips(&mut self, at: Beat, entries: &[ClipboardEntry]) -> ModelResult<Vec<String>> {
        if entries.is_empty() {
            return Err(ModelError::InvalidParameter("clipboard is empty"));
        }
        if self.kind.holds_midi() {
            let mut incoming = Vec::new();
            for entry in entries {
                if !matches!(entry.snapshot, ClipSnapshot::Midi(_)) {
                    return Err(ModelError::InvalidParameter("clipboard kind mismatch"));
                }
                if let Some(clip) = entry.materialize_midi() {
                    incoming.push(clip);
                }
            }
            place_at(&mut self.midi_clips, incoming, at)
        } else if self.kind.holds_audio() {
            let mut incoming = Vec::new();
            for entry in entries {
                if !matches!(entry.snapshot, ClipSnapshot::Audio(_)) {
                    return Err(ModelError::InvalidParameter("clipboard kind mismatch"));
                }
                if let Some(clip) = entry.materialize_audio() {
                    incoming.push(clip);
                }
            }
            place_at(&mut self.audio_clips, incoming, at)
        } else {
            Err(ModelError::InvalidParameter("track holds no clips"))
        }
    }
}

fn overlaps_any<C: TimelineClip>(clips: &[C], start: Beat, end: Beat, skip: Option<&str>) -> bool {
    clips
        .iter()
        .any(|c| skip != Some(c.id()) && c.overlaps(start, end))
}

fn pairwise_disjoint<C: TimelineClip>(clips: &[C]) -> bool {
    for (i, a) in clips.iter().enumerate() {
        for b in &clips[i + 1..] {
            if a.overlaps(b.start_beat(), b.end_beat()) {
                return false;
            }
        }
    }
    true
}

fn batch_fits<C: TimelineClip>(existing: &[C], incoming: &[C]) -> bool {
    for (i, clip) in incoming.iter().enumerate() {
        if clip.duration() <= 0.0 {
            return false;
        }
        if overlaps_any(existing, clip.start_beat(), clip.end_beat(), None) {
            return false;
        }
        for other in &incoming[i + 1..] {
            if clip.overlaps(other.start_beat(), other.end_beat()) {
                return false;
            }
        }
    }
    true
}

fn insert_sorted<C: TimelineClip>(clips: &mut Vec<C>, clip: C) {
    let index = clips.partition_point(|c| c.start_beat() <= clip.start_beat());
    clips.insert(index, clip);
}

fn sort_clips<C: TimelineClip>(clips: &mut [C]) {
    clips.sort_by(|a, b| a.start_beat().total_cmp(&b.start_beat()));
}

fn move_in<C: TimelineClip>(
    clips: &mut Vec<C>,
    clip_id: &str,
    new_start: Beat,
) -> ModelResult<Vec<String>> {
    let index = clips
        .iter()
        .position(|c| c.id() == clip_id)
        .ok_or(ModelError::NotFound)?;
    let new_end = new_start + clips[index].duration();
    let deleted: Vec<String> = clips
        .iter()
        .filter(|c| c.id() != clip_id && c.overlaps(new_start, new_end))
        .map(|c| c.id().to_string())
        .collect();
    clips.retain(|c| !deleted.contains(&c.id().to_string()));
    if let Some(clip) = clips.iter_mut().find(|c| c.id() == clip_id) {
        clip.set_start_beat(new_start);
    }
    sort_clips(clips);
    Ok(deleted)
}

fn resize_in<C: TimelineClip>(
    clips: &mut Vec<C>,
    clip_id: &str,
    new_duration: Beat,
    anchor: ResizeAnchor,
) -> ModelResult<Vec<String>> {
    let index = clips
        .iter()
        .position(|c| c.id() == clip_id)
        .ok_or(ModelError::NotFound)?;
    let mut resized = clips[index].clone();
    let clamped = resized.clamp_duration(new_duration, anchor);
    resized.apply_resize(clamped, anchor);

    let (new_start, new_end) = (resized.start_beat(), resized.end_beat());
    let deleted: Vec<String> = clips
        .iter()
        .filter(|c| c.id() != clip_id && c.overlaps(new_start, new_end))
        .map(|c| c.id().to_string())
        .collect();
    clips.retain(|c| !deleted.contains(&c.id().to_string()));
    if let Some(clip) = clips.iter_mut().find(|c| c.id() == clip_id) {
        *clip = resized;
    }
    sort_clips(clips);
    Ok(deleted)
}

fn remove_range_in<C: TimelineClip>(clips: &mut Vec<C>, start: Beat, end: Beat) -> RangeEdit {
    let mut edit = RangeEdit::default();
    let mut next = Vec::with_capacity(clips.len());
    for clip in clips.drain(..) {
        if !clip.overlaps(start, end) {
            next.push(clip);
            continue;
        }
        let (clip_start, clip_end) = (clip.start_beat(), clip.end_beat());
        let covers_start = start <= clip_start;
        let covers_end = end >= clip_end;
        match (covers_start, covers_end) {
            // Fully contained: whole-clip delete.
            (true, true) => edit.removed.push(clip.id().to_string()),
            // Strict straddle: left part keeps the clip's identity, the
            // right part is a fresh clip.
            (false, false) => {
                let left = clip.sliced(clip_start, start);
                let right = clip.sliced(end, clip_end);
                match left {
                    Some(mut part) => {
                        part.set_id(clip.id().to_string());
                        part.set_name(clip.name().to_string());
                        next.push(part);
                    }
                    None => edit.removed.push(clip.id().to_string()),
                }
                if let Some(mut part) = right {
                    part.set_name(naming::split_name(clip.name()));
                    edit.created.push(part.id().to_string());
                    next.push(part);
                }
            }
            // Left edge covered: the clip survives from `end` on.
            (true, false) => match clip.sliced(end, clip_end) {
                Some(mut rest) => {
                    rest.set_id(clip.id().to_string());
                    rest.set_name(clip.name().to_string());
                    next.push(rest);
                }
                None => edit.removed.push(clip.id().to_string()),
            },
            // Right edge covered: truncate at `start`.
            (false, true) => match clip.sliced(clip_start, start) {
                Some(mut rest) => {
                    rest.set_id(clip.id().to_string());
                    rest.set_name(clip.name().to_string());
                    next.push(rest);
                }
                None => edit.removed.push(clip.id().to_string()),
            },
        }
    }
    *clips = next;
    edit
}

fn split_range_in<C: TimelineClip>(clips: &mut Vec<C>, start: Beat, end: Beat) -> RangeEdit {
    let mut edit = RangeEdit::default();
    let mut next = Vec::with_capacity(clips.len());
    for clip in clips.drain(..) {
        let (clip_start, clip_end) = (clip.start_beat(), clip.end_beat());
        let covers_start = start <= clip_start;
        let covers_end = end >= clip_end;
        // Disjoint and fully contained clips are untouched; only clips a
        // boundary runs through get cut.
        if !clip.overlaps(start, end) || (covers_start && covers_end) {
            next.push(clip);
            continue;
        }
        let mut cuts = Vec::new();
        if !covers_start {
            cuts.push(start);
        }
        if !covers_end {
            cuts.push(end);
        }
        let mut edges = vec![clip_start];
        edges.extend(cuts);
        edges.push(clip_end);
        let mut first = true;
        for window in edges.windows(2) {
            let Some(mut part) = clip.sliced(window[0], window[1]) else {
                continue;
            };
            if first {
                part.set_id(clip.id().to_string());
                part.set_name(clip.name().to_string());
            } else {
                part.set_name(naming::split_name(clip.name()));
                edit.created.push(part.id().to_string());
            }
            first = false;
            next.push(part);
        }
        if first {
            // Nothing of the clip survived the cuts.
            edit.removed.push(clip.id().to_string());
        }
    }
    *clips = next;
    edit
}

fn split_point_in<C: TimelineClip>(clips: &mut Vec<C>, beat: Beat) -> Option<(String, String)> {
    let index = clips
        .iter()
        .position(|c| c.start_beat() < beat && beat < c.end_beat())?;
    let clip = clips[index].clone();
    let mut left = clip.sliced(clip.start_beat(), beat)?;
    let mut right = clip.sliced(beat, clip.end_beat())?;
    left.set_id(clip.id().to_string());
    left.set_name(clip.name().to_string());
    right.set_name(naming::split_name(clip.name()));
    let ids = (left.id().to_string(), right.id().to_string());
    clips[index] = left;
    insert_sorted(clips, right);
    Some(ids)
}

fn place_at<C: TimelineClip>(
    clips: &mut Vec<C>,
    mut incoming: Vec<C>,
    at: Beat,
) -> ModelResult<Vec<String>> {
    let anchor = incoming
        .iter()
        .map(|c| c.start_beat())
        .min_by(|a, b| a.total_cmp(b))
        .ok_or(ModelError::InvalidParameter("nothing to paste"))?;
    for clip in &mut incoming {
        let offset = clip.start_beat() - anchor;
        clip.set_start_beat(at + offset);
        clip.set_name(naming::copy_name(clip.name()));
    }
    if !batch_fits(clips, &incoming) {
        return Err(ModelError::OverlapConflict);
    }
    let ids = incoming.iter().map(|c| c.id().to_string()).collect();
    for clip in incoming {
        insert_sorted(clips, clip);
    }
    Ok(ids)
}
