//! In-memory timeline model for a beat-based music arrangement: tracks,
//! MIDI/audio clips, grid snapping and the interval engine behind
//! move/resize/split/copy/paste.
//!
//! The crate holds no UI and no audio I/O; a host front-end drives the
//! [`core::state::ProjectState`] container and renders the result.

pub mod core;
