//! Environment configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

/// Tunable knobs for [`GameEnvironment`] and [`GameTask`].
///
/// All fields have defaults, so a partial TOML file (or none at all) is
/// fine.
///
/// [`GameEnvironment`]: ../gridgym_env/struct.GameEnvironment.html
/// [`GameTask`]: ../gridgym_env/struct.GameTask.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Redraw the engine after every action.
    #[serde(default)]
    pub visualize: bool,

    /// Pause after each visualized action, in milliseconds.
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,

    /// Keep a (before, action, after) transition log.
    #[serde(default)]
    pub recording_enabled: bool,

    /// Step cap per episode.
    #[serde(default = "default_max_episode_steps")]
    pub max_episode_steps: u32,

    /// Discount factor handed to the policy solver.
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,
}

fn default_action_delay_ms() -> u64 {
    100
}

fn default_max_episode_steps() -> u32 {
    100
}

fn default_discount_factor() -> f64 {
    0.99
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            visualize: false,
            action_delay_ms: default_action_delay_ms(),
            recording_enabled: false,
            max_episode_steps: default_max_episode_steps(),
            discount_factor: default_discount_factor(),
        }
    }
}

impl EnvConfig {
    /// Load a config from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid TOML, or any
    /// [`validate`](Self::validate) failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse a config from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or any [`validate`](Self::validate) failure.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroMaxSteps`] or [`ConfigError::InvalidDiscount`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_episode_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if !(self.discount_factor > 0.0 && self.discount_factor <= 1.0) {
            return Err(ConfigError::InvalidDiscount {
                value: self.discount_factor,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // -- defaults --

    #[test]
    fn defaults_validate() {
        let config = EnvConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.visualize);
        assert_eq!(config.action_delay_ms, 100);
        assert_eq!(config.max_episode_steps, 100);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EnvConfig::from_toml_str("").unwrap();
        assert_eq!(config, EnvConfig::default());
    }

    // -- parsing --

    #[test]
    fn partial_toml_overrides() {
        let config = EnvConfig::from_toml_str(
            r#"
            visualize = true
            max_episode_steps = 500
            "#,
        )
        .unwrap();
        assert!(config.visualize);
        assert_eq!(config.max_episode_steps, 500);
        assert_eq!(config.action_delay_ms, 100);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = EnvConfig::from_toml_str("visualize = maybe").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recording_enabled = true").unwrap();
        let config = EnvConfig::from_file(file.path()).unwrap();
        assert!(config.recording_enabled);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EnvConfig::from_file("/nonexistent/gridgym.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    // -- validation --

    #[test]
    fn zero_max_steps_rejected() {
        let err = EnvConfig::from_toml_str("max_episode_steps = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroMaxSteps));
    }

    #[test]
    fn discount_out_of_range_rejected() {
        let err = EnvConfig::from_toml_str("discount_factor = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDiscount { .. }));

        let err = EnvConfig::from_toml_str("discount_factor = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDiscount { .. }));
    }
}
