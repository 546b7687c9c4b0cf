//! Colors, gradients and brushes

use smallvec::{smallvec, SmallVec};

use crate::geometry::Point;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color with components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Replace alpha, clamped to [0, 1]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Quantize back to 8-bit channels
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gradients
// ─────────────────────────────────────────────────────────────────────────────

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Stops are few for particle glows; keep them inline
pub type GradientStops = SmallVec<[GradientStop; 4]>;

/// Gradient type
#[derive(Clone, Debug, PartialEq)]
pub enum Gradient {
    /// Linear gradient between two points
    Linear {
        start: Point,
        end: Point,
        stops: GradientStops,
    },
    /// Radial gradient from center outward
    Radial {
        center: Point,
        radius: f32,
        stops: GradientStops,
    },
}

impl Gradient {
    /// Two-color linear gradient
    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Gradient::Linear {
            start,
            end,
            stops: smallvec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }

    /// Two-color radial gradient
    pub fn radial(center: Point, radius: f32, from: Color, to: Color) -> Self {
        Gradient::Radial {
            center,
            radius,
            stops: smallvec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }

    /// Radial gradient with arbitrary stops (should be sorted by offset)
    pub fn radial_with_stops(
        center: Point,
        radius: f32,
        stops: impl IntoIterator<Item = GradientStop>,
    ) -> Self {
        Gradient::Radial {
            center,
            radius: radius.max(0.0),
            stops: stops.into_iter().collect(),
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        match self {
            Gradient::Linear { stops, .. } | Gradient::Radial { stops, .. } => stops,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Brushes
// ─────────────────────────────────────────────────────────────────────────────

/// Brush for filling shapes
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl Brush {
    /// Highest alpha the brush can paint with
    pub fn max_alpha(&self) -> f32 {
        match self {
            Brush::Solid(color) => color.a,
            Brush::Gradient(gradient) => gradient
                .stops()
                .iter()
                .map(|s| s.color.a)
                .fold(0.0, f32::max),
        }
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

impl From<Gradient> for Brush {
    fn from(gradient: Gradient) -> Self {
        Brush::Gradient(gradient)
    }
}

/// Blend mode for compositing particle draws onto the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Normal,
    Screen,
    /// Additive ("lighter") blending for glows
    Add,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_rgb8() {
        let c = Color::from_hex(0x87cefa);
        assert_eq!(c.to_rgb8(), [0x87, 0xce, 0xfa]);
        assert_eq!(Color::from_rgb8(255, 0, 129).to_rgb8(), [255, 0, 129]);
    }

    #[test]
    fn test_with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(1.7).a, 1.0);
        assert_eq!(Color::WHITE.with_alpha(-0.2).a, 0.0);
    }

    #[test]
    fn test_gradient_stops_are_clamped() {
        let g = Gradient::radial_with_stops(
            Point::ZERO,
            4.0,
            [
                GradientStop::new(-1.0, Color::WHITE),
                GradientStop::new(2.0, Color::TRANSPARENT),
            ],
        );
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0]);
    }

    #[test]
    fn test_brush_max_alpha() {
        let glow = Gradient::radial(
            Point::ZERO,
            3.0,
            Color::WHITE.with_alpha(0.8),
            Color::TRANSPARENT,
        );
        assert!((Brush::from(glow).max_alpha() - 0.8).abs() < 1e-6);
        assert_eq!(Brush::from(Color::WHITE.with_alpha(0.25)).max_alpha(), 0.25);
    }
}
