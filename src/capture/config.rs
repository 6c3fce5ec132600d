//! Preview configuration.
//!
//! The preview runs at a fixed resolution and a fixed frame rate. The
//! frame rate is pinned by setting both ends of the auto-exposure target
//! range to the same value.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest API level that supports explicit session configurations.
pub const SESSION_CONFIGURATION_MIN_API: u32 = 28;

/// Configuration for the preview stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Target frames per second (used for both ends of the range).
    pub fps: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl PreviewConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid surface dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Properties of the host platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// API level reported by the simulated camera service.
    pub api_level: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self { api_level: 34 }
    }
}

/// Behaviour of the simulated camera and permission services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cameras the simulated service enumerates.
    pub camera_count: u32,
    /// Whether the camera permission starts out granted.
    pub permission_granted: bool,
    /// Whether the user ticked "don't ask again" on a denial.
    pub permanently_denied: bool,
    /// Make every session configuration fail.
    pub fail_session_configure: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            camera_count: 1,
            permission_granted: false,
            permanently_denied: false,
            fail_session_configure: false,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.preview.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = PreviewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.width, config.height, config.fps), (640, 480, 30));
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = PreviewConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_frame_rate_bounds() {
        let mut config = PreviewConfig::default();
        config.fps = 121;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrameRate)
        ));
        config.fps = 120;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [preview]
            fps = 24

            [platform]
            api_level = 26
            "#,
        )
        .unwrap();

        assert_eq!(config.preview.fps, 24);
        assert_eq!(config.preview.width, 640);
        assert_eq!(config.platform.api_level, 26);
        assert_eq!(config.simulation.camera_count, 1);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = FileConfig::from_toml("[preview]\nwidth = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidDimensions)));

        let result = FileConfig::from_toml("preview = 3");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
