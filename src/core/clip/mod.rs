pub mod audio;
pub mod midi;

pub use audio::AudioClip;
pub use midi::{MidiClip, MidiNote};

use crate::core::{Beat, BEAT_EPSILON};

/// Shortest clip the engine will produce or accept, in beats.
pub const MIN_CLIP_DURATION: Beat = 0.25;

/// Edge that stays put during a resize, matching the drag handles: `Right`
/// keeps the left edge fixed and moves the clip end, `Left` keeps the right
/// edge fixed and moves the clip start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    Left,
    Right,
}

/// Common surface of MIDI and audio clips. The interval engine in
/// [`crate::core::track`] only talks to clips through this trait.
pub trait TimelineClip: Clone {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn start_beat(&self) -> Beat;
    fn set_start_beat(&mut self, beat: Beat);
    fn duration(&self) -> Beat;

    fn end_beat(&self) -> Beat {
        self.start_beat() + self.duration()
    }

    /// Half-open interval overlap test against `[start, end)`.
    fn overlaps(&self, start: Beat, end: Beat) -> bool {
        self.start_beat() < end && self.end_beat() > start
    }

    /// Copy of this clip restricted to `[start, end)` in absolute beats,
    /// with a fresh id and the same name. `None` when the intersection with
    /// the clip is empty.
    ///
    /// MIDI clips re-derive their note list; audio clips re-derive their
    /// sample window. Both are pure, the original is untouched.
    fn sliced(&self, start: Beat, end: Beat) -> Option<Self>;

    /// Duration `new_duration` clamped to what a resize with this anchor may
    /// actually reach: at least [`MIN_CLIP_DURATION`], never past beat 0 when
    /// anchored left, and for audio never outside the decodable source.
    fn clamp_duration(&self, new_duration: Beat, anchor: ResizeAnchor) -> Beat;

    /// Apply a resize whose duration went through
    /// [`TimelineClip::clamp_duration`]. Engine hook; overlap handling is the
    /// track's job.
    fn apply_resize(&mut self, new_duration: Beat, anchor: ResizeAnchor);
}

/// Clamped intersection of a clip interval with `[start, end)`, or `None`
/// when only an empty sliver remains.
pub(crate) fn clamp_range(
    clip_start: Beat,
    clip_end: Beat,
    start: Beat,
    end: Beat,
) -> Option<(Beat, Beat)> {
    let s = start.max(clip_start);
    let e = end.min(clip_end);
    if e - s > BEAT_EPSILON { Some((s, e)) } else { None }
}
