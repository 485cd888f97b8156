// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kit configuration: TOML file, environment overrides and mesh quality

use crate::error::{FastenerError, Result};
use crate::geometry::profile::MIN_CIRCLE_SEGMENTS;
use crate::params::FastenerParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "boltforge.toml";

pub const ENV_QUANTITY: &str = "BOLTFORGE_QUANTITY";
pub const ENV_NOZZLE_SIZE: &str = "BOLTFORGE_NOZZLE_SIZE";
pub const ENV_QUALITY: &str = "BOLTFORGE_QUALITY";

/// Named tessellation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Draft,
    Standard,
    Fine,
}

impl FromStr for QualityPreset {
    type Err = FastenerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "standard" => Ok(Self::Standard),
            "fine" => Ok(Self::Fine),
            other => Err(FastenerError::Config {
                details: format!("unknown quality preset `{}` (expected draft, standard or fine)", other),
            }),
        }
    }
}

/// Segment counts used when tessellating curved surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshQuality {
    /// Segments around a thread ring's tube
    pub ring_minor_segments: u32,
    /// Segments around a thread ring's axis
    pub ring_major_segments: u32,
    /// Segments for round heads, bores and washers
    pub circle_segments: u32,
    /// Segments for the shaft and tip
    pub shaft_segments: u32,
}

pub const MIN_RING_MINOR_SEGMENTS: u32 = 12;
pub const MIN_RING_MAJOR_SEGMENTS: u32 = 32;

impl Default for MeshQuality {
    fn default() -> Self {
        Self::preset(QualityPreset::Standard)
    }
}

impl MeshQuality {
    pub fn preset(preset: QualityPreset) -> Self {
        match preset {
            QualityPreset::Draft => Self {
                ring_minor_segments: 12,
                ring_major_segments: 32,
                circle_segments: 32,
                shaft_segments: 32,
            },
            QualityPreset::Standard => Self {
                ring_minor_segments: 12,
                ring_major_segments: 32,
                circle_segments: 64,
                shaft_segments: 32,
            },
            QualityPreset::Fine => Self {
                ring_minor_segments: 16,
                ring_major_segments: 64,
                circle_segments: 96,
                shaft_segments: 64,
            },
        }
    }

    /// Raise every count to its minimum; ring tubes also get an even count
    pub fn clamped(&self) -> Self {
        let minor = self.ring_minor_segments.max(MIN_RING_MINOR_SEGMENTS);
        Self {
            ring_minor_segments: minor + minor % 2,
            ring_major_segments: self.ring_major_segments.max(MIN_RING_MAJOR_SEGMENTS),
            circle_segments: self.circle_segments.max(MIN_CIRCLE_SEGMENTS),
            shaft_segments: self.shaft_segments.max(MIN_CIRCLE_SEGMENTS),
        }
    }
}

/// Everything needed for one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub fastener: FastenerParams,
    pub quality: MeshQuality,
}

fn config_error(details: impl Into<String>) -> FastenerError {
    FastenerError::Config {
        details: details.into(),
    }
}

impl KitConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("failed to parse config: {}", e)))
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("failed to read config file {:?}: {}", path, e)))?;
        Self::from_toml_str(&content)
    }

    /// Load an explicit file, or `boltforge.toml` when present, or defaults,
    /// then apply environment variable overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; used with the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(quantity) = lookup(ENV_QUANTITY) {
            self.fastener.quantity = quantity
                .trim()
                .parse()
                .map_err(|_| config_error(format!("{} must be a positive integer, got `{}`", ENV_QUANTITY, quantity)))?;
        }

        if let Some(nozzle) = lookup(ENV_NOZZLE_SIZE) {
            self.fastener.nozzle_size = nozzle
                .trim()
                .parse()
                .map_err(|_| config_error(format!("{} must be a number, got `{}`", ENV_NOZZLE_SIZE, nozzle)))?;
        }

        if let Some(quality) = lookup(ENV_QUALITY) {
            self.quality = MeshQuality::preset(quality.parse()?);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| config_error(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| config_error(format!("failed to write config file {:?}: {}", path.as_ref(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{HeadShape, TipShape};
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = KitConfig::from_toml_str(
            r#"
            [fastener]
            head_shape = "hex"
            tip_shape = "dog_point"
            quantity = 4
            has_nut = true
            "#,
        )
        .unwrap();

        assert_eq!(config.fastener.head_shape, HeadShape::Hex);
        assert_eq!(config.fastener.tip_shape, TipShape::DogPoint);
        assert_eq!(config.fastener.quantity, 4);
        assert_eq!(config.fastener.d, 4.0);
        assert_eq!(config.quality, MeshQuality::default());
    }

    #[test]
    fn test_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_QUANTITY, "9"),
            (ENV_NOZZLE_SIZE, "0.6"),
            (ENV_QUALITY, "Fine"),
        ]
        .into_iter()
        .collect();

        let mut config = KitConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.fastener.quantity, 9);
        assert_eq!(config.fastener.nozzle_size, 0.6);
        assert_eq!(config.quality, MeshQuality::preset(QualityPreset::Fine));
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let mut config = KitConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_QUANTITY).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, FastenerError::Config { .. }));

        assert!("ultra".parse::<QualityPreset>().is_err());
    }

    #[test]
    fn test_quality_clamps_to_minimums() {
        let quality = MeshQuality {
            ring_minor_segments: 5,
            ring_major_segments: 8,
            circle_segments: 3,
            shaft_segments: 4,
        }
        .clamped();
        assert_eq!(quality.ring_minor_segments, 12);
        assert_eq!(quality.ring_major_segments, 32);
        assert_eq!(quality.circle_segments, 32);

        let odd = MeshQuality {
            ring_minor_segments: 13,
            ..Default::default()
        };
        assert_eq!(odd.clamped().ring_minor_segments, 14);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.toml");

        let mut config = KitConfig::default();
        config.fastener.has_washer = true;
        config.save(&path).unwrap();

        let loaded = KitConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = KitConfig::from_file("/nonexistent/boltforge.toml").unwrap_err();
        assert!(matches!(err, FastenerError::Config { .. }));
    }
}
