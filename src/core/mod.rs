pub mod clip;
pub mod clipboard;
pub mod color;
pub mod error;
pub mod grid;
pub mod naming;
pub mod selection;
pub mod source;
pub mod state;
pub mod track;

/// Musical-time coordinate in beats. 0 is the project start. Tempo only
/// affects wall-clock playback, never clip placement.
pub type Beat = f64;

/// Tolerance used when comparing beat positions. Slivers shorter than this
/// are treated as empty by the slicing code.
pub(crate) const BEAT_EPSILON: Beat = 1e-9;
