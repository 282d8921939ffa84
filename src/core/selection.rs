use crate::core::Beat;

/// Transient beat-range selection plus the independent multi-clip set.
///
/// Raw `start`/`end` keep the drag direction for the UI; everything that
/// consumes the range goes through [`Selection::normalized_range`]. One
/// selection is active at a time: `Idle -> Active -> Idle`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    active: bool,
    start: Beat,
    end: Beat,
    track_id: Option<String>,
    /// Toggle-selected clip ids (modifier-click). Coexists with the range;
    /// clipboard operations prefer this set when it is non-empty.
    pub clip_ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag selection: `start = end = beat`.
    pub fn begin(&mut self, beat: Beat, track_id: &str) {
        self.active = true;
        self.start = beat;
        self.end = beat;
        self.track_id = Some(track_id.to_string());
    }

    /// Move the selection end while dragging. May end up before `start`;
    /// not normalized here.
    pub fn update(&mut self, beat: Beat) {
        if self.active {
            self.end = beat;
        }
    }

    /// Back to `Idle`, clearing the clip set as well.
    pub fn clear(&mut self) {
        self.active = false;
        self.track_id = None;
        self.clip_ids.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    /// Raw drag endpoints, in drag order.
    pub fn raw_range(&self) -> (Beat, Beat) {
        (self.start, self.end)
    }

    /// `(min, max)` of the drag endpoints while active.
    pub fn normalized_range(&self) -> Option<(Beat, Beat)> {
        self.active
            .then(|| (self.start.min(self.end), self.start.max(self.end)))
    }

    /// Toggle a clip in the multi-clip set.
    pub fn toggle_clip(&mut self, clip_id: &str) {
        if let Some(index) = self.clip_ids.iter().position(|id| id == clip_id) {
            self.clip_ids.remove(index);
        } else {
            self.clip_ids.push(clip_id.to_string());
        }
    }
}
