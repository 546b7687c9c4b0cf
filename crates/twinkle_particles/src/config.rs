//! Host configuration
//!
//! [`EngineConfig`] mirrors the payload the host UI sends: every field is
//! optional and unknown fields are ignored. [`EngineConfig::sanitize`] turns it
//! into [`EffectSettings`], replacing non-finite numbers with defaults and
//! clamping everything else into the ranges the host's sliders allow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::{ColorSpec, Rgb, DEFAULT_ADAPTIVE_BASE};
use crate::error::{EngineError, Result};
use crate::presets::PaletteId;

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

/// Visual effect selected by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectType {
    #[default]
    Normal,
    Stars,
    Paws,
    WaterDrops,
    Sparkles,
    Magic,
    Fireflies,
    Dust,
    Energy,
    Snow,
    Rain,
    Leaves,
    Fire,
}

impl EffectType {
    pub const ALL: [EffectType; 13] = [
        EffectType::Normal,
        EffectType::Stars,
        EffectType::Paws,
        EffectType::WaterDrops,
        EffectType::Sparkles,
        EffectType::Magic,
        EffectType::Fireflies,
        EffectType::Dust,
        EffectType::Energy,
        EffectType::Snow,
        EffectType::Rain,
        EffectType::Leaves,
        EffectType::Fire,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectType::Normal => "normal",
            EffectType::Stars => "stars",
            EffectType::Paws => "paws",
            EffectType::WaterDrops => "waterDrops",
            EffectType::Sparkles => "sparkles",
            EffectType::Magic => "magic",
            EffectType::Fireflies => "fireflies",
            EffectType::Dust => "dust",
            EffectType::Energy => "energy",
            EffectType::Snow => "snow",
            EffectType::Rain => "rain",
            EffectType::Leaves => "leaves",
            EffectType::Fire => "fire",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        EffectType::ALL
            .into_iter()
            .find(|effect| effect.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::ConfigParse(format!("unknown effect type {s:?}")))
    }
}

/// Where particles come from and where they head
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Rise from the bottom edge of the anchor
    #[default]
    Upward,
    /// Burst from the anchor center in every direction
    All,
    /// Fill the whole surface and drift (weather overlay)
    AmbientField,
}

impl Direction {
    pub fn is_ambient(self) -> bool {
        matches!(self, Direction::AmbientField)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Upward => "upward",
            Direction::All => "all",
            Direction::AmbientField => "ambientField",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upward" | "up" => Ok(Direction::Upward),
            "all" | "omnidirectional" => Ok(Direction::All),
            "ambientfield" | "ambient" => Ok(Direction::AmbientField),
            _ => Err(EngineError::ConfigParse(format!("unknown direction {s:?}"))),
        }
    }
}

/// Deserialize through `FromStr`, falling back to the default on unknown names
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = EngineError> + Default,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| {
            value
                .parse()
                .map_err(|err: EngineError| tracing::warn!(%err, "using default"))
                .ok()
        })
        .unwrap_or_default())
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw configuration (host payload)
// ─────────────────────────────────────────────────────────────────────────────

/// Physics section of the host payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Particle radius in pixels
    pub size: f32,
    /// Acceleration per frame; dock default 0.02, ambient default 0.1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f32>,
    /// Opacity lost per frame
    pub fade_speed: f32,
    /// Size lost per frame
    pub size_decay: f32,
    /// Max spin per frame in radians
    pub rotation_speed: f32,
    /// Seconds a dock particle may live
    pub particle_lifetime: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            size: 3.0,
            gravity: None,
            fade_speed: 0.008,
            size_decay: 0.02,
            rotation_speed: 0.05,
            particle_lifetime: 3.0,
        }
    }
}

/// Color section of the host payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorConfig {
    pub use_adaptive_color: bool,
    /// Takes priority over adaptive and palette colors when non-empty
    pub custom_colors: Vec<String>,
    /// Theme color for adaptive mode (the ribbon glow color)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color: Option<String>,
    pub color_intensity: f32,
    pub color_variation: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            use_adaptive_color: false,
            custom_colors: Vec::new(),
            base_color: None,
            color_intensity: 1.0,
            color_variation: 0.3,
        }
    }
}

/// The configuration object the host hands to the engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub enabled: bool,
    #[serde(deserialize_with = "lenient")]
    pub effect_type: EffectType,
    #[serde(deserialize_with = "lenient")]
    pub direction: Direction,
    /// Position multiplier; dock default 2, ambient default 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Particles per spawn event
    pub particle_count: f32,
    /// Spawn events per second
    pub spawn_rate: f32,
    /// Emit from the anchor border instead of its base
    pub clip_path_follow: bool,
    /// Global alpha in percent; dock default 100, ambient default 50
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    /// Horizontal acceleration; dock default 0, ambient default 0.02
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<f32>,
    pub physics: PhysicsConfig,
    pub color: ColorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            effect_type: EffectType::Normal,
            direction: Direction::Upward,
            speed: None,
            particle_count: 3.0,
            spawn_rate: 60.0,
            clip_path_follow: false,
            intensity: None,
            wind: None,
            physics: PhysicsConfig::default(),
            color: ColorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration for a full-surface weather effect
    pub fn ambient(effect: EffectType) -> Self {
        Self {
            effect_type: effect,
            direction: Direction::AmbientField,
            ..Self::default()
        }
    }

    /// Parse a JSON payload
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))
    }

    /// Parse a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::ConfigParse(e.to_string()))
    }

    /// Validate and clamp into [`EffectSettings`]
    ///
    /// Never fails: every rejected value is logged and replaced.
    pub fn sanitize(&self) -> EffectSettings {
        let ambient = self.direction.is_ambient();
        let mode = if ambient { &AMBIENT_DEFAULTS } else { &DOCK_DEFAULTS };
        let physics = &self.physics;

        EffectSettings {
            enabled: self.enabled,
            effect: self.effect_type,
            direction: self.direction,
            speed: clamp_field("speed", self.speed, mode.speed, 0.5, 5.0),
            particle_count: clamp_field("particleCount", Some(self.particle_count), 3.0, 1.0, 10.0)
                .round() as usize,
            spawn_rate: clamp_field("spawnRate", Some(self.spawn_rate), 60.0, 10.0, 120.0),
            clip_path_follow: self.clip_path_follow,
            intensity: clamp_field("intensity", self.intensity, mode.intensity, 0.0, 100.0),
            wind: clamp_field("wind", self.wind, mode.wind, -1.0, 1.0),
            size: clamp_field("size", Some(physics.size), 3.0, 1.0, 8.0),
            gravity: clamp_field("gravity", physics.gravity, mode.gravity, 0.0, 0.1),
            fade_speed: clamp_field("fadeSpeed", Some(physics.fade_speed), 0.008, 0.001, 0.02),
            size_decay: clamp_field("sizeDecay", Some(physics.size_decay), 0.02, 0.001, 0.05),
            rotation_speed: clamp_field(
                "rotationSpeed",
                Some(physics.rotation_speed),
                0.05,
                0.0,
                0.2,
            ),
            lifetime_ms: clamp_field(
                "particleLifetime",
                Some(physics.particle_lifetime),
                3.0,
                1.0,
                10.0,
            ) * 1000.0,
            color: self.color_spec(),
        }
    }

    /// Custom colors, then adaptive, then the effect palette
    fn color_spec(&self) -> ColorSpec {
        let color = &self.color;
        let custom: Vec<Rgb> = color
            .custom_colors
            .iter()
            .filter_map(|raw| {
                Rgb::parse(raw)
                    .map_err(|err| tracing::warn!(%err, "dropping custom color"))
                    .ok()
            })
            .collect();
        if !custom.is_empty() {
            return ColorSpec::Custom(custom);
        }

        if color.use_adaptive_color {
            return ColorSpec::Adaptive {
                base: color
                    .base_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADAPTIVE_BASE.to_string()),
                intensity: clamp_field(
                    "colorIntensity",
                    Some(color.color_intensity),
                    1.0,
                    0.1,
                    2.0,
                ),
                variation: clamp_field(
                    "colorVariation",
                    Some(color.color_variation),
                    0.3,
                    0.0,
                    1.0,
                ),
            };
        }

        if self.direction.is_ambient() {
            ColorSpec::Static(PaletteId::Ambient(self.effect_type))
        } else {
            ColorSpec::Static(PaletteId::Dock(self.effect_type))
        }
    }
}

/// Defaults that differ between dock ornaments and ambient fields
struct ModeDefaults {
    speed: f32,
    gravity: f32,
    wind: f32,
    intensity: f32,
}

const DOCK_DEFAULTS: ModeDefaults = ModeDefaults {
    speed: 2.0,
    gravity: 0.02,
    wind: 0.0,
    intensity: 100.0,
};

const AMBIENT_DEFAULTS: ModeDefaults = ModeDefaults {
    speed: 1.0,
    gravity: 0.1,
    wind: 0.02,
    intensity: 50.0,
};

/// Missing or non-finite values take `default`; the rest are clamped
fn clamp_field(field: &'static str, value: Option<f32>, default: f32, min: f32, max: f32) -> f32 {
    let Some(value) = value else {
        return default;
    };
    if !value.is_finite() {
        tracing::warn!(field, default, "non-finite setting replaced");
        return default;
    }
    if value < min || value > max {
        let err = EngineError::OutOfRange { field, value };
        tracing::warn!(%err, min, max, "setting clamped");
    }
    value.clamp(min, max)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sanitized settings
// ─────────────────────────────────────────────────────────────────────────────

/// Validated settings the engine runs on
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSettings {
    pub enabled: bool,
    pub effect: EffectType,
    pub direction: Direction,
    pub speed: f32,
    pub particle_count: usize,
    pub spawn_rate: f32,
    pub clip_path_follow: bool,
    /// Percent, [0, 100]
    pub intensity: f32,
    pub wind: f32,
    pub size: f32,
    /// Magnitude; the emitter picks the sign per motion mode
    pub gravity: f32,
    pub fade_speed: f32,
    pub size_decay: f32,
    pub rotation_speed: f32,
    pub lifetime_ms: f32,
    pub color: ColorSpec,
}

impl EffectSettings {
    /// Milliseconds between spawn events
    pub fn spawn_interval_ms(&self) -> f32 {
        1000.0 / self.spawn_rate
    }

    /// Global alpha multiplier in [0, 1]
    pub fn alpha_scale(&self) -> f32 {
        self.intensity / 100.0
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        EngineConfig::default().sanitize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineConfig::default().sanitize();
        assert!(settings.enabled);
        assert_eq!(settings.speed, 2.0);
        assert_eq!(settings.particle_count, 3);
        assert_eq!(settings.gravity, 0.02);
        assert_eq!(settings.lifetime_ms, 3000.0);
        assert_eq!(settings.intensity, 100.0);
        assert_eq!(settings.color, ColorSpec::Static(PaletteId::Dock(EffectType::Normal)));
    }

    #[test]
    fn test_ambient_defaults() {
        let settings = EngineConfig::ambient(EffectType::Snow).sanitize();
        assert_eq!(settings.speed, 1.0);
        assert_eq!(settings.gravity, 0.1);
        assert_eq!(settings.wind, 0.02);
        assert_eq!(settings.alpha_scale(), 0.5);
        assert_eq!(settings.color, ColorSpec::Static(PaletteId::Ambient(EffectType::Snow)));
    }

    #[test]
    fn test_json_camel_case_payload() {
        let config = EngineConfig::from_json_str(
            r##"{
                "enabled": true,
                "effectType": "waterDrops",
                "direction": "all",
                "speed": 3.5,
                "particleCount": 4,
                "spawnRate": 30,
                "physics": { "fadeSpeed": 0.01, "particleLifetime": 5 },
                "color": { "customColors": ["#ff0000", "nope"] },
                "somethingTheEngineIgnores": 1
            }"##,
        )
        .unwrap();

        assert_eq!(config.effect_type, EffectType::WaterDrops);
        assert_eq!(config.direction, Direction::All);

        let settings = config.sanitize();
        assert_eq!(settings.speed, 3.5);
        assert_eq!(settings.particle_count, 4);
        assert_eq!(settings.fade_speed, 0.01);
        assert_eq!(settings.size_decay, 0.02);
        assert_eq!(settings.lifetime_ms, 5000.0);
        assert_eq!(settings.color, ColorSpec::Custom(vec![Rgb::hex(0xff0000)]));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let config = EngineConfig {
            speed: Some(50.0),
            particle_count: 0.0,
            spawn_rate: f32::NAN,
            physics: PhysicsConfig {
                gravity: Some(-4.0),
                size: f32::INFINITY,
                ..Default::default()
            },
            ..Default::default()
        };
        let settings = config.sanitize();
        assert_eq!(settings.speed, 5.0);
        assert_eq!(settings.particle_count, 1);
        assert_eq!(settings.spawn_rate, 60.0);
        assert_eq!(settings.gravity, 0.0);
        assert_eq!(settings.size, 3.0);
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let config =
            EngineConfig::from_json_str(r#"{"effectType": "lasers", "direction": "sideways"}"#)
                .unwrap();
        assert_eq!(config.effect_type, EffectType::Normal);
        assert_eq!(config.direction, Direction::Upward);

        let alias = EngineConfig::from_json_str(r#"{"direction": "omnidirectional"}"#).unwrap();
        assert_eq!(alias.direction, Direction::All);
    }

    #[test]
    fn test_adaptive_spec() {
        let mut config = EngineConfig::default();
        config.color.use_adaptive_color = true;
        config.color.color_intensity = 9.0;
        match config.sanitize().color {
            ColorSpec::Adaptive {
                base, intensity, ..
            } => {
                assert_eq!(base, "#0099ff");
                assert_eq!(intensity, 2.0);
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(EngineError::ConfigParse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("enabled = = true"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_toml_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            effectType = "fire"
            direction = "ambientField"
            intensity = 80

            [physics]
            gravity = 0.05
            "#,
        )
        .unwrap();
        let settings = config.sanitize();
        assert_eq!(settings.effect, EffectType::Fire);
        assert!(settings.direction.is_ambient());
        assert_eq!(settings.intensity, 80.0);
        assert_eq!(settings.gravity, 0.05);

        let written = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&written).unwrap(), config);
    }

    #[test]
    fn test_spawn_interval() {
        let settings = EffectSettings::default();
        assert!((settings.spawn_interval_ms() - 16.666_666).abs() < 1e-3);
    }
}
