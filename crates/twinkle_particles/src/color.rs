//! Particle colors
//!
//! A [`ColorSpec`] describes where colors come from (an effect palette, a
//! caller list, or a theme-derived base color). [`ColorResolver`] turns it into
//! a fixed set of swatches once per configuration; every spawned particle then
//! picks one swatch uniformly and keeps it for life.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use twinkle_core::Color;

use crate::config::EffectType;
use crate::error::{EngineError, Result};
use crate::presets::{self, PaletteId};

/// 8-bit RGB color fixed on a particle at spawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn hex(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidColor(input.to_string());
        let digits = input.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Multiply each channel by `factor`, rounding and clamping to [0, 255]
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn to_color(self) -> Color {
        Color::from_rgb8(self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        rgb.to_color()
    }
}

/// Theme color used when an adaptive base color is missing or invalid
pub const DEFAULT_ADAPTIVE_BASE: Rgb = Rgb::hex(0x0099ff);

/// Number of swatches derived from an adaptive base color
pub const ADAPTIVE_SWATCHES: usize = 4;

/// Where particle colors come from
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSpec {
    /// A built-in palette
    Static(PaletteId),
    /// Caller-supplied colors
    Custom(Vec<Rgb>),
    /// Swatches derived from one theme color
    Adaptive {
        base: String,
        intensity: f32,
        variation: f32,
    },
}

/// Concrete swatches resolved from a [`ColorSpec`]
#[derive(Clone, Debug, PartialEq)]
pub struct ColorResolver {
    swatches: SmallVec<[Rgb; 8]>,
}

impl ColorResolver {
    /// Resolve a spec into swatches; never fails
    ///
    /// An invalid adaptive base falls back to [`DEFAULT_ADAPTIVE_BASE`] and an
    /// empty custom list falls back to the normal palette.
    pub fn new(spec: &ColorSpec, rng: &mut fastrand::Rng) -> Self {
        let swatches: SmallVec<[Rgb; 8]> = match spec {
            ColorSpec::Static(id) => id.swatches().iter().copied().collect(),
            ColorSpec::Custom(colors) if !colors.is_empty() => colors.iter().copied().collect(),
            ColorSpec::Custom(_) => presets::palette(EffectType::Normal).iter().copied().collect(),
            ColorSpec::Adaptive {
                base,
                intensity,
                variation,
            } => {
                let base = Rgb::parse(base).unwrap_or_else(|err| {
                    tracing::warn!(
                        %err,
                        fallback = %DEFAULT_ADAPTIVE_BASE,
                        "adaptive base color rejected"
                    );
                    DEFAULT_ADAPTIVE_BASE
                });
                adaptive_swatches(base, *intensity, *variation, rng)
            }
        };
        Self { swatches }
    }

    /// Uniform pick from the swatches
    pub fn pick(&self, rng: &mut fastrand::Rng) -> Rgb {
        match self.swatches.len() {
            0 => Rgb::WHITE,
            n => self.swatches[rng.usize(..n)],
        }
    }

    pub fn swatches(&self) -> &[Rgb] {
        &self.swatches
    }
}

/// Scale `base` by `intensity`, then perturb each swatch by a random factor in
/// `1 +- variation`
fn adaptive_swatches(
    base: Rgb,
    intensity: f32,
    variation: f32,
    rng: &mut fastrand::Rng,
) -> SmallVec<[Rgb; 8]> {
    let adjusted = base.scaled(intensity);
    (0..ADAPTIVE_SWATCHES)
        .map(|_| {
            let factor = 1.0 + (rng.f32() - 0.5) * variation * 2.0;
            adjusted.scaled(factor)
        })
        .collect()
}
