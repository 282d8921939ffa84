use crate::core::{
    Beat,
    clip::{AudioClip, MidiClip, TimelineClip},
};

/// Snapshot of one copied clip, by clip type.
#[derive(Debug, Clone)]
pub enum ClipSnapshot {
    Midi(MidiClip),
    Audio(AudioClip),
}

impl ClipSnapshot {
    pub fn start_beat(&self) -> Beat {
        match self {
            ClipSnapshot::Midi(c) => c.start_beat,
            ClipSnapshot::Audio(c) => c.start_beat,
        }
    }

    pub fn end_beat(&self) -> Beat {
        match self {
            ClipSnapshot::Midi(c) => c.end_beat(),
            ClipSnapshot::Audio(c) => c.end_beat(),
        }
    }
}

/// One clipboard slot: the untouched clip snapshot plus how much of each edge
/// the selection cut away. The trims are applied when the entry is pasted.
#[derive(Debug, Clone)]
pub struct ClipboardEntry {
    pub snapshot: ClipSnapshot,
    pub left_trim: Beat,
    pub right_trim: Beat,
}

impl ClipboardEntry {
    pub fn whole(snapshot: ClipSnapshot) -> Self {
        Self { snapshot, left_trim: 0.0, right_trim: 0.0 }
    }

    /// Snapshot bounds with the trims applied, in the source coordinates.
    pub fn effective_range(&self) -> (Beat, Beat) {
        (
            self.snapshot.start_beat() + self.left_trim,
            self.snapshot.end_beat() - self.right_trim,
        )
    }

    /// The trimmed clip, still at its source position.
    pub fn materialize_midi(&self) -> Option<MidiClip> {
        let (start, end) = self.effective_range();
        match &self.snapshot {
            ClipSnapshot::Midi(clip) => clip.sliced(start, end),
            ClipSnapshot::Audio(_) => None,
        }
    }

    /// Audio counterpart of [`ClipboardEntry::materialize_midi`].
    pub fn materialize_audio(&self) -> Option<AudioClip> {
        let (start, end) = self.effective_range();
        match &self.snapshot {
            ClipSnapshot::Audio(clip) => clip.sliced(start, end),
            ClipSnapshot::Midi(_) => None,
        }
    }
}

/// Process-local clipboard. Entries keep their source positions so a paste
/// can restore the relative spacing of a multi-clip copy.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard content.
    pub fn set(&mut self, entries: Vec<ClipboardEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    /// Earliest trimmed start among the entries; pastes anchor to it.
    pub fn anchor_beat(&self) -> Option<Beat> {
        self.entries
            .iter()
            .map(|e| e.effective_range().0)
            .min_by(|a, b| a.total_cmp(b))
    }
}
