//! Gradient fills - re-exported from twinkle_core for unified type system

pub use twinkle_core::{Gradient, GradientStop};

use crate::{Color, Point};

/// Radial glow of a single color
///
/// `falloff` lists `(offset, alpha)` pairs; each stop uses `color` at that
/// alpha.
pub fn radial_glow(center: Point, radius: f32, color: Color, falloff: &[(f32, f32)]) -> Gradient {
    Gradient::radial_with_stops(
        center,
        radius,
        falloff
            .iter()
            .map(|&(offset, alpha)| GradientStop::new(offset, color.with_alpha(alpha))),
    )
}

/// Linear fade from `color` at `start` to fully transparent at `end`
pub fn linear_fade(start: Point, end: Point, color: Color) -> Gradient {
    Gradient::linear(start, end, color, color.with_alpha(0.0))
}
