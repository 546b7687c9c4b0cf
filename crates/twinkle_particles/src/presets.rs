//! Built-in palettes and ambient field presets

use crate::color::Rgb;
use crate::config::EffectType;

const NORMAL: &[Rgb] = &[
    Rgb::hex(0x87cefa),
    Rgb::hex(0xffffff),
    Rgb::hex(0xff0081),
    Rgb::hex(0x20c997),
];
const STARS: &[Rgb] = &[Rgb::hex(0xffcc00), Rgb::hex(0xfffacd), Rgb::hex(0xffd700)];
const PAWS: &[Rgb] = &[Rgb::hex(0xff69b4), Rgb::hex(0xffffff)];
const WATER_DROPS: &[Rgb] = &[Rgb::hex(0xe0ffff), Rgb::hex(0xb0e0e6), Rgb::hex(0xadd8e6)];
const SPARKLES: &[Rgb] = &[
    Rgb::hex(0xffffff),
    Rgb::hex(0xffd700),
    Rgb::hex(0xff69b4),
    Rgb::hex(0x00ff00),
];
const MAGIC: &[Rgb] = &[
    Rgb::hex(0xff0081),
    Rgb::hex(0x00ffff),
    Rgb::hex(0xff69b4),
    Rgb::hex(0xffff00),
    Rgb::hex(0x00ff00),
];
const FIREFLIES: &[Rgb] = &[
    Rgb::hex(0xffff00),
    Rgb::hex(0xffd700),
    Rgb::hex(0xffed4e),
    Rgb::hex(0xfffacd),
];
const DUST: &[Rgb] = &[
    Rgb::hex(0xf5f5dc),
    Rgb::hex(0xd2b48c),
    Rgb::hex(0xdeb887),
    Rgb::hex(0xf4a460),
];
const ENERGY: &[Rgb] = &[
    Rgb::hex(0x00ffff),
    Rgb::hex(0x7df9ff),
    Rgb::hex(0xffffff),
    Rgb::hex(0x0099ff),
];

// Ambient weather palettes
const SNOW: &[Rgb] = &[Rgb::hex(0xffffff), Rgb::hex(0xf0f8ff), Rgb::hex(0xe6f3ff)];
const RAIN: &[Rgb] = &[Rgb::hex(0x87ceeb), Rgb::hex(0xb0e0e6), Rgb::hex(0xadd8e6)];
const LEAVES: &[Rgb] = &[
    Rgb::hex(0x8fbc8f),
    Rgb::hex(0x90ee90),
    Rgb::hex(0x98fb98),
    Rgb::hex(0x228b22),
];
const AMBIENT_FIREFLIES: &[Rgb] = &[Rgb::hex(0xffff00), Rgb::hex(0xffd700), Rgb::hex(0xffa500)];
const AMBIENT_DUST: &[Rgb] = &[Rgb::hex(0xd2b48c), Rgb::hex(0xdeb887), Rgb::hex(0xf5deb3)];
const FIRE: &[Rgb] = &[
    Rgb::hex(0xff4500),
    Rgb::hex(0xff6347),
    Rgb::hex(0xff7f50),
    Rgb::hex(0xff8c00),
    Rgb::hex(0xffa500),
];

/// Dock palette for an effect
///
/// Weather-only effects reuse their ambient palette.
pub fn palette(effect: EffectType) -> &'static [Rgb] {
    match effect {
        EffectType::Normal => NORMAL,
        EffectType::Stars => STARS,
        EffectType::Paws => PAWS,
        EffectType::WaterDrops => WATER_DROPS,
        EffectType::Sparkles => SPARKLES,
        EffectType::Magic => MAGIC,
        EffectType::Fireflies => FIREFLIES,
        EffectType::Dust => DUST,
        EffectType::Energy => ENERGY,
        EffectType::Snow => SNOW,
        EffectType::Rain => RAIN,
        EffectType::Leaves => LEAVES,
        EffectType::Fire => FIRE,
    }
}

/// Palette identifier resolved by [`PaletteId::swatches`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteId {
    Dock(EffectType),
    Ambient(EffectType),
}

impl PaletteId {
    pub fn swatches(self) -> &'static [Rgb] {
        match self {
            PaletteId::Dock(effect) => palette(effect),
            PaletteId::Ambient(effect) => ambient(effect).palette,
        }
    }
}

/// Population and look of a full-surface ambient field
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientPreset {
    /// Particles kept alive on the surface
    pub population: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub palette: &'static [Rgb],
    /// Opacity follows a sine flicker instead of staying fixed
    pub flicker: bool,
    /// Field drifts up instead of falling
    pub rising: bool,
}

const fn field(
    population: usize,
    min_size: f32,
    max_size: f32,
    palette: &'static [Rgb],
) -> AmbientPreset {
    AmbientPreset {
        population,
        min_size,
        max_size,
        palette,
        flicker: false,
        rising: false,
    }
}

/// Ambient preset for an effect
///
/// Dock-only effects get the snow population with their own palette.
pub fn ambient(effect: EffectType) -> AmbientPreset {
    match effect {
        EffectType::Snow => field(80, 2.0, 6.0, SNOW),
        EffectType::Rain => field(120, 1.0, 3.0, RAIN),
        EffectType::Leaves => field(30, 8.0, 15.0, LEAVES),
        EffectType::Fireflies => AmbientPreset {
            flicker: true,
            ..field(20, 3.0, 6.0, AMBIENT_FIREFLIES)
        },
        EffectType::Dust => field(100, 1.0, 4.0, AMBIENT_DUST),
        EffectType::Fire => AmbientPreset {
            flicker: true,
            rising: true,
            ..field(50, 3.0, 12.0, FIRE)
        },
        other => field(80, 2.0, 6.0, palette(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_has_a_palette() {
        for effect in EffectType::ALL {
            assert!(!palette(effect).is_empty(), "{effect:?}");
            let preset = ambient(effect);
            assert!(!preset.palette.is_empty());
            assert!(preset.min_size <= preset.max_size);
        }
    }

    #[test]
    fn test_weather_presets() {
        assert_eq!(ambient(EffectType::Rain).population, 120);
        assert!(ambient(EffectType::Fire).rising);
        assert!(ambient(EffectType::Fire).flicker);
        assert!(!ambient(EffectType::Snow).rising);
        assert_eq!(ambient(EffectType::Stars).palette, palette(EffectType::Stars));
        assert_ne!(
            PaletteId::Ambient(EffectType::Fireflies).swatches(),
            PaletteId::Dock(EffectType::Fireflies).swatches()
        );
    }
}
