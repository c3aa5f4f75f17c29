use std::f64::consts::PI;

use crate::visual::clamp_percentage;

pub const RING_RADIUS: f64 = 90.0;

pub fn circumference() -> f64 {
    2.0 * PI * RING_RADIUS
}

/// Stroke-dash offset of the score ring: the full circumference hides the
/// stroke, zero draws all of it.
pub fn ring_offset(percentage: f64) -> f64 {
    let c = circumference();
    c - (clamp_percentage(percentage) / 100.0) * c
}

/// Drawn share of the ring in `[0, 1]`.
pub fn ring_fraction(percentage: f64) -> f64 {
    1.0 - ring_offset(percentage) / circumference()
}
