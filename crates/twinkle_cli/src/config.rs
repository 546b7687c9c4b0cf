//! Effect configuration files
//!
//! Configs are [`EngineConfig`] documents in TOML or JSON, picked by file
//! extension. JSON is the payload shape hosts send; TOML is the hand-edited
//! form written by `twinkle init`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use twinkle_particles::EngineConfig;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "twinkle.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by the extension, TOML when there is none
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            None | Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => anyhow::bail!(
                "Unsupported config extension '.{}' for {} (expected .toml or .json)",
                other,
                path.display()
            ),
        }
    }
}

/// Parse `content` as a config document in `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<EngineConfig> {
    let config = match format {
        ConfigFormat::Toml => EngineConfig::from_toml_str(content)?,
        ConfigFormat::Json => EngineConfig::from_json_str(content)?,
    };
    Ok(config)
}

/// Load a config file
pub fn load(path: &Path) -> Result<EngineConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content, format).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Render `config` in `format`
pub fn render(config: &EngineConfig, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => Ok(config.to_toml_string()?),
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to serialize config")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinkle_particles::{Direction, EffectType};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("twinkle.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("dock.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("twinkle")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("dock.yaml")).is_err());
    }

    #[test]
    fn test_parse_host_payload() {
        let json = r#"{"effectType": "rain", "direction": "ambientField", "intensity": 30}"#;
        let config = parse(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.effect_type, EffectType::Rain);
        assert_eq!(config.direction, Direction::AmbientField);
        assert_eq!(config.intensity, Some(30.0));
    }

    #[test]
    fn test_render_then_parse_toml() {
        let config = EngineConfig::ambient(EffectType::Leaves);
        let text = render(&config, ConfigFormat::Toml).unwrap();
        assert_eq!(parse(&text, ConfigFormat::Toml).unwrap(), config);
    }

    #[test]
    fn test_malformed_document() {
        assert!(parse("effectType = [", ConfigFormat::Toml).is_err());
        assert!(parse("{", ConfigFormat::Json).is_err());
    }
}
