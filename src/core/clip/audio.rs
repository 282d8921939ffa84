use crate::core::{
    Beat,
    clip::{MIN_CLIP_DURATION, ResizeAnchor, TimelineClip, clamp_range},
    color::Color,
    error::{ModelError, ModelResult},
    source::AudioItem,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A placed sample window into a shared [`AudioItem`].
///
/// Invariant: `start_offset_in_samples + length_in_samples` never exceeds the
/// item length. Splits and resizes are pure offset arithmetic on the shared
/// buffer, no audio is ever copied or re-encoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub id: String,
    pub name: String,
    pub start_beat: Beat,
    pub duration_in_beats: Beat,
    pub item: Arc<AudioItem>,
    pub start_offset_in_samples: u64,
    pub length_in_samples: u64,
    pub color: Option<Color>,
    /// Duration the clip had when it was first placed, before any trims.
    pub original_duration: Option<Beat>,
}

impl AudioClip {
    /// Clip covering the whole source item.
    pub fn from_item(
        item: Arc<AudioItem>,
        start_beat: Beat,
        duration_in_beats: Beat,
    ) -> ModelResult<Self> {
        if duration_in_beats <= 0.0 {
            return Err(ModelError::InvalidParameter("non-positive clip duration"));
        }
        let length = item.length_in_samples;
        Ok(Self {
            id: uuid::Uuid::new_v4().into(),
            name: item.name.clone(),
            start_beat,
            duration_in_beats,
            item,
            start_offset_in_samples: 0,
            length_in_samples: length,
            color: None,
            original_duration: Some(duration_in_beats),
        })
    }

    pub fn end_beat(&self) -> Beat {
        self.start_beat + self.duration_in_beats
    }

    /// Seconds of audio covered by the sample window.
    pub fn audio_window_duration(&self) -> f64 {
        self.length_in_samples as f64 / self.item.sample_rate as f64
    }

    /// Seconds of audio consumed per beat; converts beat deltas into sample
    /// deltas for split and trim math.
    pub fn beat_duration(&self) -> f64 {
        self.audio_window_duration() / self.duration_in_beats
    }

    /// Offset of the window start inside the source, in seconds.
    pub fn audio_start_time(&self) -> f64 {
        self.start_offset_in_samples as f64 / self.item.sample_rate as f64
    }

    pub fn samples_per_beat(&self) -> f64 {
        self.length_in_samples as f64 / self.duration_in_beats
    }
}

impl TimelineClip for AudioClip {
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
        self.duration_in_beats
    }

    fn sliced(&self, start: Beat, end: Beat) -> Option<Self> {
        let (s, e) = clamp_range(self.start_beat, self.end_beat(), start, end)?;
        let spb = self.samples_per_beat();
        // Floor at cut points; a slice that reaches the clip end keeps the
        // exact window end so that the part lengths of a cut always sum back
        // to the original length.
        let from = ((s - self.start_beat) * spb).floor() as u64;
        let to = if e >= self.end_beat() {
            self.length_in_samples
        } else {
            (((e - self.start_beat) * spb).floor() as u64).max(from)
        };
        Some(Self {
            id: uuid::Uuid::new_v4().into(),
            name: self.name.clone(),
            start_beat: s,
            duration_in_beats: e - s,
            item: Arc::clone(&self.item),
            start_offset_in_samples: self.start_offset_in_samples + from,
            length_in_samples: to - from,
            color: self.color,
            original_duration: self.original_duration,
        })
    }

    // Never outside the decodable source item.
    fn clamp_duration(&self, new_duration: Beat, anchor: ResizeAnchor) -> Beat {
        let spb = self.samples_per_beat();
        let clamped = new_duration.max(MIN_CLIP_DURATION);
        match anchor {
            ResizeAnchor::Right => {
                let available =
                    (self.item.length_in_samples - self.start_offset_in_samples) as f64 / spb;
                clamped.min(available)
            }
            ResizeAnchor::Left => {
                let available =
                    self.duration_in_beats + self.start_offset_in_samples as f64 / spb;
                clamped.min(available).min(self.end_beat())
            }
        }
    }

    // The samples-per-beat rate stays fixed, so the window grows or shrinks
    // by the beat delta converted to samples.
    fn apply_resize(&mut self, new_duration: Beat, anchor: ResizeAnchor) {
        let spb = self.samples_per_beat();
        match anchor {
            ResizeAnchor::Right => {
                let end = self.start_offset_in_samples + (new_duration * spb).floor() as u64;
                self.length_in_samples =
                    end.min(self.item.length_in_samples) - self.start_offset_in_samples;
                self.duration_in_beats = new_duration;
            }
            ResizeAnchor::Left => {
                // The window's right boundary sample stays fixed.
                let window_end = self.start_offset_in_samples + self.length_in_samples;
                let new_offset = (self.start_offset_in_samples as f64
                    - (new_duration - self.duration_in_beats) * spb)
                    .floor()
                    .max(0.0) as u64;
                self.start_beat = self.end_beat() - new_duration;
                self.start_offset_in_samples = new_offset;
                self.length_in_samples = window_end - new_offset;
                self.duration_in_beats = new_duration;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn item(length_in_samples: u64) -> Arc<AudioItem> {
        Arc::new(AudioItem {
            name: "loop.wav".into(),
            path: "loop.wav".into(),
            sample_rate: 44100,
            channels: 2,
            length_in_samples,
            samples: Vec::new(),
        })
    }

    #[test]
    fn window_math() {
        let clip = AudioClip::from_item(item(44100), 0.0, 2.0).unwrap();
        assert_eq!(clip.audio_window_duration(), 1.0);
        assert_eq!(clip.beat_duration(), 0.5);
        assert_eq!(clip.samples_per_beat(), 22050.0);
        assert_eq!(clip.audio_start_time(), 0.0);
        assert!(AudioClip::from_item(item(44100), 0.0, 0.0).is_err());
    }

    #[test]
    fn sliced_partitions_sample_window() {
        let clip = AudioClip::from_item(item(44100), 0.0, 2.0).unwrap();
        let left = clip.sliced(0.0, 1.0).unwrap();
        let right = clip.sliced(1.0, 2.0).unwrap();
        assert_eq!(left.start_offset_in_samples, 0);
        assert_eq!(right.start_offset_in_samples, left.length_in_samples);
        // Sample conservation across the cut.
        assert_eq!(left.length_in_samples + right.length_in_samples, 44100);
        assert!(Arc::ptr_eq(&left.item, &clip.item));
    }

    #[test]
    fn sliced_conserves_samples_at_awkward_cut() {
        let clip = AudioClip::from_item(item(44101), 0.0, 3.0).unwrap();
        let cut = 1.0 / 3.0 * 2.9;
        let left = clip.sliced(0.0, cut).unwrap();
        let right = clip.sliced(cut, 3.0).unwrap();
        let total = left.length_in_samples + right.length_in_samples;
        assert!(total.abs_diff(44101) <= 1, "total {total}");
        assert_eq!(
            right.start_offset_in_samples,
            left.start_offset_in_samples + left.length_in_samples
        );
    }

    #[test]
    fn resize_right_clamps_to_source() {
        let mut clip = AudioClip::from_item(item(44100), 0.0, 2.0).unwrap();
        // 22050 samples per beat, so at most 2 beats of audio exist.
        let clamped = clip.clamp_duration(5.0, ResizeAnchor::Right);
        assert_eq!(clamped, 2.0);
        clip.apply_resize(clip.clamp_duration(1.0, ResizeAnchor::Right), ResizeAnchor::Right);
        assert_eq!(clip.duration_in_beats, 1.0);
        assert_eq!(clip.length_in_samples, 22050);
    }

    #[test]
    fn resize_left_keeps_window_end() {
        let mut clip = AudioClip::from_item(item(44100), 2.0, 2.0).unwrap();
        clip.apply_resize(clip.clamp_duration(1.0, ResizeAnchor::Left), ResizeAnchor::Left);
        assert_eq!(clip.start_beat, 3.0);
        assert_eq!(clip.start_offset_in_samples, 22050);
        assert_eq!(clip.length_in_samples, 22050);
        // Growing back is limited by the samples left before the window.
        let restored = clip.clamp_duration(5.0, ResizeAnchor::Left);
        assert_eq!(restored, 2.0);
        clip.apply_resize(restored, ResizeAnchor::Left);
        assert_eq!(clip.start_offset_in_samples, 0);
        assert_eq!(clip.length_in_samples, 44100);
    }
}
