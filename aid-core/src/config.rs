//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an absent file or a partial file is valid.
//! Values are checked after parsing; a threshold that would make the carousel
//! unusable is rejected instead of silently clamped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TimeRange;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Swipe geometry and timing for the page carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Horizontal travel before the neighbouring page is revealed.
    pub reveal_threshold: f64,
    /// Fraction of the page width a drag must exceed to commit.
    pub commit_fraction: f64,
    /// Gap between the active page and a neighbour sliding in.
    pub page_spacing: f64,
    /// Page width in layout units.
    pub page_width: f64,
    /// Duration of the settle animation after a drag ends.
    pub animation_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            reveal_threshold: 10.0,
            commit_fraction: 0.25,
            page_spacing: 24.0,
            page_width: 80.0,
            animation_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Range selected when a details screen opens.
    pub default_range: TimeRange,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            default_range: TimeRange::Month,
        }
    }
}

/// Settings for the bundled synthetic market provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub seed: u64,
    /// Probability in `[0, 1]` that a fetch fails with a network error.
    pub failure_rate: f64,
    /// Simulated round-trip latency.
    pub latency_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            failure_rate: 0.0,
            latency_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub carousel: CarouselConfig,
    pub details: DetailsConfig,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Default location: `<config dir>/aid/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aid")
            .join("config.toml")
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.carousel;
        if !(c.reveal_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "carousel.reveal_threshold must be non-negative, got {}",
                c.reveal_threshold
            )));
        }
        if !(c.commit_fraction > 0.0 && c.commit_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "carousel.commit_fraction must be in (0, 1], got {}",
                c.commit_fraction
            )));
        }
        if !(c.page_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "carousel.page_width must be positive, got {}",
                c.page_width
            )));
        }
        if !(c.page_spacing >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "carousel.page_spacing must be non-negative, got {}",
                c.page_spacing
            )));
        }
        if !(0.0..=1.0).contains(&self.provider.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "provider.failure_rate must be in [0, 1], got {}",
                self.provider.failure_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [carousel]
            page_width = 120.0

            [details]
            default_range = "week"
            "#,
        )
        .unwrap();
        assert_eq!(config.carousel.page_width, 120.0);
        assert_eq!(config.carousel.reveal_threshold, 10.0);
        assert_eq!(config.details.default_range, TimeRange::Week);
        assert_eq!(config.provider, ProviderConfig::default());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = AppConfig::default();
        config.provider.seed = 7;
        config.details.default_range = TimeRange::AllTime;
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_commit_fraction() {
        let err = AppConfig::from_toml_str("[carousel]\ncommit_fraction = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_failure_rate_above_one() {
        let err = AppConfig::from_toml_str("[provider]\nfailure_rate = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("failure_rate"));
    }

    #[test]
    fn rejects_unknown_range() {
        let err = AppConfig::from_toml_str("[details]\ndefault_range = \"decade\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nseed = 99\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.provider.seed, 99);
    }
}
