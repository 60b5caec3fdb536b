//! Configuration file handling for backdrop.
//!
//! The file lives at `config.toml` in the platform config directory. Every
//! field has a default, so a partial or missing file is fine.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use backdrop_core::{EffectiveType, Theme};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Accepted frame rate range.
pub const FPS_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
pub const DEFAULT_FPS: u32 = 30;

/// Errors from reading or writing the config file.
#[derive(Debug)]
pub enum ConfigError {
    /// No config directory could be resolved for this platform.
    NoConfigDir,
    Io(PathBuf, io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    /// A value parsed but is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfigDir => write!(f, "could not determine a config directory"),
            Self::Io(path, e) => write!(f, "{}: {e}", path.display()),
            Self::Parse(path, e) => write!(f, "invalid config {}: {e}", path.display()),
            Self::Serialize(e) => write!(f, "could not serialize config: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Parse(_, e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::NoConfigDir | Self::Invalid(_) => None,
        }
    }
}

/// Forced capability readings. Unset fields fall through to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<EffectiveType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target frames per second.
    pub fps: u32,
    pub theme: Theme,
    /// Procedural rain layer.
    pub rain: bool,
    /// Interactive particle field.
    pub particles: bool,
    /// Floating shapes layer.
    pub shapes: bool,
    /// Log filter directive, `off` disables logging.
    pub log_level: String,
    pub capabilities: CapabilityOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            theme: Theme::default(),
            rain: true,
            particles: true,
            shapes: true,
            log_level: "info".to_string(),
            capabilities: CapabilityOverrides::default(),
        }
    }
}

impl Config {
    /// Platform project directories for backdrop.
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "backdrop")
    }

    /// Location of the default config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse(_, e) => ConfigError::Parse(path.to_path_buf(), e),
            other => other,
        })?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, self.to_toml()?)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FPS_RANGE.contains(&self.fps) {
            return Err(ConfigError::Invalid(format!(
                "fps must be between {} and {}, got {}",
                FPS_RANGE.start(),
                FPS_RANGE.end(),
                self.fps
            )));
        }
        if let Some(gb) = self.capabilities.memory_gb
            && !(gb.is_finite() && gb >= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "capabilities.memory_gb must be a non-negative number, got {gb}"
            )));
        }
        Ok(())
    }

    /// Frame period derived from `fps`.
    pub fn frame_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.clamp(1, 120)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("backdrop-config-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            theme = "light"
            rain = false

            [capabilities]
            network = "2g"
            cores = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.theme, Theme::Light);
        assert!(!config.rain);
        assert!(config.particles);
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.capabilities.network, Some(EffectiveType::TwoG));
        assert_eq!(config.capabilities.cores, Some(2));
        assert_eq!(config.capabilities.memory_gb, None);
    }

    #[test]
    fn test_fps_out_of_range() {
        for raw in ["fps = 0", "fps = 121"] {
            assert!(matches!(Config::parse(raw), Err(ConfigError::Invalid(_))));
        }
        assert!(Config::parse("fps = 120").is_ok());
    }

    #[test]
    fn test_negative_memory_rejected() {
        let err = Config::parse("[capabilities]\nmemory_gb = -1.0").unwrap_err();
        assert!(err.to_string().contains("memory_gb"));
    }

    #[test]
    fn test_unknown_network_is_parse_error() {
        let err = Config::parse("[capabilities]\nnetwork = \"5g\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_path("missing");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let config = Config {
            fps: 60,
            theme: Theme::Light,
            shapes: false,
            capabilities: CapabilityOverrides {
                reduced_motion: Some(true),
                memory_gb: Some(2.0),
                ..CapabilityOverrides::default()
            },
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let path = temp_path("broken");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(&path, "fps = \"fast\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_frame_period() {
        let config = Config {
            fps: 50,
            ..Config::default()
        };
        assert_eq!(config.frame_period().as_millis(), 20);
    }
}
