use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for clipforge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Encoder settings
    pub encode: EncodeConfig,

    /// Font resolution settings for text overlays
    pub fonts: FontConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encode: EncodeConfig::default(),
            fonts: FontConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string(),
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.encode.validate()?;
        self.fonts.validate()?;
        Ok(())
    }
}

/// Encoder configuration for the output container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// Video codec passed to the encoder (e.g. "libx264")
    pub video_codec: String,

    /// Audio codec passed to the encoder (e.g. "aac")
    pub audio_codec: String,

    /// Encoder-side worker threads; does not affect frame content
    pub threads: usize,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            threads: num_cpus::get(),
            quality: 85,
        }
    }
}

impl EncodeConfig {
    /// Map the 0-100 quality setting onto the encoder's CRF scale.
    ///
    /// Quality 100 maps to CRF 15 (near-lossless), quality 0 to CRF 35.
    pub fn crf(&self) -> u8 {
        35u8.saturating_sub((self.quality.min(100) as u32 * 20 / 100) as u8)
    }

    fn validate(&self) -> Result<()> {
        if self.video_codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encode.video_codec".to_string(),
                value: self.video_codec.clone(),
            }
            .into());
        }

        if self.audio_codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encode.audio_codec".to_string(),
                value: self.audio_codec.clone(),
            }
            .into());
        }

        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "encode.threads".to_string(),
                value: self.threads.to_string(),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "encode.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Where to look for font files when rasterizing text overlays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Directories searched (recursively) for font files
    pub search_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec![
                PathBuf::from("/usr/share/fonts"),
                PathBuf::from("/usr/local/share/fonts"),
                PathBuf::from("/System/Library/Fonts"),
                PathBuf::from("/Library/Fonts"),
            ],
        }
    }
}

impl FontConfig {
    fn validate(&self) -> Result<()> {
        if self.search_dirs.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "fonts.search_dirs".to_string(),
                value: "[]".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original = Config::default();

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original.encode.video_codec, loaded.encode.video_codec);
        assert_eq!(original.encode.quality, loaded.encode.quality);
        assert_eq!(original.fonts.search_dirs, loaded.fonts.search_dirs);
    }

    #[test]
    fn test_invalid_threads() {
        let mut config = Config::default();
        config.encode.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_crf_mapping() {
        let mut encode = EncodeConfig::default();
        encode.quality = 100;
        assert_eq!(encode.crf(), 15);
        encode.quality = 0;
        assert_eq!(encode.crf(), 35);
        encode.quality = 85;
        assert_eq!(encode.crf(), 18);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file("/nonexistent/clipforge.toml");
        assert!(result.is_err());
    }
}
