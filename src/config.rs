//! Configuration management for cubedeck
//!
//! Handles loading and parsing of the YAML configuration file.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::sets::MAX_CUBES;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Maximum number of concurrently connected cubes
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    /// Path to a scenario file for the simulated event source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

/// Audio configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Play the background track at startup
    #[serde(default = "default_true")]
    pub music: bool,
    /// Background track volume in [0, 1]
    #[serde(default = "default_music_volume")]
    pub music_volume: f32,
}

/// Frame and loader pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Interval between frames in milliseconds
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Interval between asset-load completion polls in milliseconds
    #[serde(default = "default_loader_poll_ms")]
    pub loader_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            audio: AudioConfig::default(),
            timing: TimingConfig::default(),
            scenario: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music: default_true(),
            music_volume: default_music_volume(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
            loader_poll_ms: default_loader_poll_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.capacity >= 1 && self.capacity <= MAX_CUBES,
            "capacity must be in 1..={}, got {}",
            MAX_CUBES,
            self.capacity
        );
        ensure!(
            (0.0..=1.0).contains(&self.audio.music_volume),
            "audio.music_volume must be in [0, 1], got {}",
            self.audio.music_volume
        );
        Ok(())
    }
}

// Default value functions
fn default_capacity() -> usize {
    12
}
fn default_true() -> bool {
    true
}
fn default_music_volume() -> f32 {
    0.2
}
fn default_frame_ms() -> u64 {
    50
}
fn default_loader_poll_ms() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_mapping() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.capacity, 12);
        assert!(config.audio.music);
        assert_eq!(config.timing.frame_ms, 50);
        assert!(config.scenario.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_capacity() {
        let config: AppConfig = serde_yaml::from_str("capacity: 64").unwrap();
        assert!(config.validate().is_err());

        let config: AppConfig = serde_yaml::from_str("capacity: 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "capacity: 4\naudio:\n  music: false\nscenario: demo.yaml"
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.capacity, 4);
        assert!(!config.audio.music);
        assert_eq!(config.audio.music_volume, 0.2);
        assert_eq!(config.scenario.as_deref(), Some("demo.yaml"));
    }
}
