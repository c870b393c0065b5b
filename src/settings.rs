use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdfpager";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Scale pages render at, relative to their natural size
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,

    /// Whether binding a page warms the slot one page ahead
    #[serde(default = "default_true")]
    pub prefetch: bool,
}

fn default_true() -> bool {
    true
}

fn default_render_scale() -> f32 {
    1.0
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            render_scale: default_render_scale(),
            prefetch: true,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    /// Load from the default location; any failure falls back to
    /// defaults with a log line.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    error!("Failed to parse settings at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::config_path() else {
            anyhow::bail!("no config directory available");
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.version, CURRENT_VERSION);
        assert!((settings.render_scale - 1.0).abs() < f32::EPSILON);
        assert!(settings.prefetch);
    }

    #[test]
    fn partial_yaml_fills_remaining_defaults() {
        let settings: Settings = serde_yaml::from_str("render_scale: 2.0\n").unwrap();
        assert!((settings.render_scale - 2.0).abs() < f32::EPSILON);
        assert!(settings.prefetch);
        assert_eq!(settings.version, CURRENT_VERSION);
    }

    #[test]
    fn empty_yaml_is_all_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert!(settings.prefetch);
        assert!((settings.render_scale - 1.0).abs() < f32::EPSILON);
    }
}
