//! Ambient scene lighting: the five-parameter environment vector and its interpolation.
//!
//! Hue lives on a circle (`0.0` and `1.0` are the same colour), so it is interpolated
//! along the shorter arc. The other four parameters are plain linear values.

pub mod interpolator;
pub mod scene;

pub use interpolator::{Completion, CompletionState, InterpolationTimings, LightingInterpolator};
pub use scene::Scene;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::segment::Segment;

/// Baseline lighting for one segment, or an intermediate value during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingEnvironment {
    /// Circular hue in `[0, 1)`.
    pub hue: f64,
    /// `-1.0..=1.0`
    pub luminosity: f64,
    /// `-1.0..=1.0`
    pub saturation: f64,
    /// `0.0..=1.0`
    pub shadows: f64,
    /// `0.0..=1.0`
    pub intensity: f64,
}

impl LightingEnvironment {
    /// Built-in baseline for a segment.
    pub fn default_for(segment: Segment) -> Self {
        let (hue, luminosity, saturation, shadows, intensity) = match segment {
            Segment::Dusk => (0.075, -0.3, -0.15, 0.15, 0.6),
            Segment::Nightfall => (0.011111, -0.3, -0.4, 0.25, 0.5),
            Segment::Evening => (0.363888, -0.6, -0.6, 0.55, 0.25),
            Segment::Midnight => (0.630555, -1.0, -0.5, 0.75, 0.3),
            Segment::Witching => (0.758333, -0.9, -0.4, 0.65, 0.45),
            Segment::Twilight => (0.886611, -0.6, -0.35, 0.6, 0.45),
        };
        Self {
            hue,
            luminosity,
            saturation,
            shadows,
            intensity,
        }
    }

    /// Blend towards `target` by `progress` (already eased).
    pub fn interpolate(&self, target: &Self, progress: f64) -> Self {
        Self {
            hue: lerp_hue(self.hue, target.hue, progress),
            luminosity: lerp(self.luminosity, target.luminosity, progress),
            saturation: lerp(self.saturation, target.saturation, progress),
            shadows: lerp(self.shadows, target.shadows, progress),
            intensity: lerp(self.intensity, target.intensity, progress),
        }
    }

    /// Element-wise comparison with hue compared around the circle.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        hue_distance(self.hue, other.hue) <= epsilon
            && (self.luminosity - other.luminosity).abs() <= epsilon
            && (self.saturation - other.saturation).abs() <= epsilon
            && (self.shadows - other.shadows).abs() <= epsilon
            && (self.intensity - other.intensity).abs() <= epsilon
    }
}

impl fmt::Display for LightingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hue {:.3}, luminosity {:.2}, saturation {:.2}, shadows {:.2}, intensity {:.2}",
            self.hue, self.luminosity, self.saturation, self.shadows, self.intensity
        )
    }
}

/// Linear interpolation that returns the endpoints exactly at `0.0` and `1.0`.
pub fn lerp(start: f64, end: f64, progress: f64) -> f64 {
    start * (1.0 - progress) + end * progress
}

/// Wrap any hue into `[0, 1)`.
pub fn normalize_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(1.0);
    // rem_euclid can round tiny negatives up to exactly 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Signed shortest step from `start` to `end` on the hue circle, in `[-0.5, 0.5]`.
pub fn hue_delta(start: f64, end: f64) -> f64 {
    let mut diff = normalize_hue(end) - normalize_hue(start);
    if diff > 0.5 {
        diff -= 1.0;
    }
    if diff < -0.5 {
        diff += 1.0;
    }
    diff
}

/// Unsigned circular distance between two hues.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    hue_delta(a, b).abs()
}

/// Interpolate hue along the shorter arc of the circle.
pub fn lerp_hue(start: f64, end: f64, progress: f64) -> f64 {
    if progress >= 1.0 {
        return normalize_hue(end);
    }
    let start = normalize_hue(start);
    normalize_hue(start + hue_delta(start, end) * progress)
}

/// Quadratic ease-in-out on `[0, 1]`.
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}
