use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shared, read-only reference to a decoded audio file.
///
/// Many clips may point at the same item through an `Arc`; the item itself is
/// owned by the host's asset table. The model only does offset arithmetic on
/// it, never decoding.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioItem {
    pub name: String,
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub length_in_samples: u64,
    /// Precomputed display samples. May be empty; persistence goes through
    /// `path` instead.
    #[serde(skip)]
    pub samples: Vec<f32>,
}

impl AudioItem {
    /// Total duration of the source in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.length_in_samples as f64 / self.sample_rate as f64
    }
}
