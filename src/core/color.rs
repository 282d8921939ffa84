use rand::Rng;
use serde::{Deserialize, Serialize};

/// Plain RGB color attached to tracks and clips. The host maps it to its own
/// color type for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Random color used as the default for new tracks.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            r: rng.random_range(0..=255),
            g: rng.random_range(0..=255),
            b: rng.random_range(0..=255),
        }
    }
}
