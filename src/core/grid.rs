use crate::core::Beat;
use serde::{Deserialize, Serialize};

/// Pixels a beat occupies at zoom level 2 (the quarter-note grid).
pub const BASE_PIXELS_PER_BEAT: f32 = 24.0;

/// Number of discrete zoom levels, 0 = closest, 6 = furthest.
pub const ZOOM_LEVEL_COUNT: usize = 7;

/// Grid granularity attached to a zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridDivision {
    Sixteenth,
    Eighth,
    Quarter,
    /// Half a bar.
    Half,
    Bar,
    TwoBar,
    FourBar,
}

impl GridDivision {
    /// Grid steps per beat for the simple subdivisions, `None` for the
    /// bar-relative ones (those snap against the bar length instead).
    fn steps_per_beat(self) -> Option<f64> {
        match self {
            GridDivision::Sixteenth => Some(4.0),
            GridDivision::Eighth => Some(2.0),
            GridDivision::Quarter => Some(1.0),
            _ => None,
        }
    }

    /// Bar span of the bar-relative divisions.
    fn bar_span(self) -> f64 {
        match self {
            GridDivision::TwoBar => 2.0,
            GridDivision::FourBar => 4.0,
            _ => 1.0,
        }
    }
}

/// One row of the zoom table.
#[derive(Debug, Clone, Copy)]
pub struct ZoomSpec {
    /// Multiplier applied to [`BASE_PIXELS_PER_BEAT`].
    pub multiplier: f32,
    pub division: GridDivision,
    /// Ruler label interval in bars.
    pub label_every_bars: u32,
}

/// Fixed lookup table over the 7 zoom levels. Pure data, no hidden state.
pub const ZOOM_LEVELS: [ZoomSpec; ZOOM_LEVEL_COUNT] = [
    ZoomSpec { multiplier: 4.0, division: GridDivision::Sixteenth, label_every_bars: 1 },
    ZoomSpec { multiplier: 2.0, division: GridDivision::Eighth, label_every_bars: 1 },
    ZoomSpec { multiplier: 1.0, division: GridDivision::Quarter, label_every_bars: 1 },
    ZoomSpec { multiplier: 0.5, division: GridDivision::Half, label_every_bars: 2 },
    ZoomSpec { multiplier: 0.25, division: GridDivision::Bar, label_every_bars: 4 },
    ZoomSpec { multiplier: 0.125, division: GridDivision::TwoBar, label_every_bars: 8 },
    ZoomSpec { multiplier: 0.0625, division: GridDivision::FourBar, label_every_bars: 16 },
];

/// Zoom table row for `level`, clamped to the last level.
pub fn zoom_spec(level: usize) -> &'static ZoomSpec {
    &ZOOM_LEVELS[level.min(ZOOM_LEVEL_COUNT - 1)]
}

pub fn pixels_per_beat(level: usize) -> f32 {
    BASE_PIXELS_PER_BEAT * zoom_spec(level).multiplier
}

pub fn beats_to_pixels(beats: Beat, level: usize) -> f32 {
    beats as f32 * pixels_per_beat(level)
}

pub fn pixels_to_beats(pixels: f32, level: usize) -> Beat {
    (pixels / pixels_per_beat(level)) as Beat
}

/// Quantize `beat` to the grid. Deterministic and side-effect free; called on
/// every drag-update tick.
///
/// The simple subdivisions round to the nearest step. `Half` picks the
/// nearest of bar start / half bar / next bar start, switching at the bar
/// quarter-points. The bar divisions round to the nearest bar-span multiple
/// (midpoint rule).
pub fn snap_to_grid(beat: Beat, division: GridDivision, beats_per_bar: u32) -> Beat {
    if let Some(steps) = division.steps_per_beat() {
        return (beat * steps).round() / steps;
    }
    let bar_len = beats_per_bar.max(1) as f64 * division.bar_span();
    match division {
        GridDivision::Half => {
            let bar_start = (beat / bar_len).floor() * bar_len;
            let frac = (beat - bar_start) / bar_len;
            if frac < 0.25 {
                bar_start
            } else if frac < 0.75 {
                bar_start + bar_len / 2.0
            } else {
                bar_start + bar_len
            }
        }
        _ => (beat / bar_len).round() * bar_len,
    }
}

/// 1-indexed bar number and 1-indexed beat position inside that bar, for
/// ruler display.
pub fn bar_and_beat(beat: Beat, beats_per_bar: u32) -> (i64, f64) {
    let bpb = beats_per_bar.max(1) as f64;
    let bar = (beat / bpb).floor();
    (bar as i64 + 1, beat - bar * bpb + 1.0)
}
