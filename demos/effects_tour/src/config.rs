use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Timings and host settings for the tour. Every field has a default, so an
/// empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Period of the counters in the effect screens.
    pub tick_ms: u64,
    /// Period of the outer counter in the updated-state screen.
    pub updated_state_tick_ms: u64,
    /// How far the coroutine-scope screen counts.
    pub counter_target: u32,
    /// Delay of the follow-up toast in the derived-state screen.
    pub toast_delay_ms: u64,
    pub viewport: [u32; 2],
    /// Default `env_logger` filter; `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            updated_state_tick_ms: 2000,
            counter_target: 5,
            toast_delay_ms: 1000,
            viewport: [1280, 800],
            log_filter: "info".to_string(),
        }
    }
}

impl TourConfig {
    /// Loads `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TourConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };
        if self.tick_ms == 0 || self.updated_state_tick_ms == 0 {
            return invalid("tick periods must be greater than zero");
        }
        if self.counter_target == 0 {
            return invalid("counter_target must be greater than zero");
        }
        if self.viewport.contains(&0) {
            return invalid("viewport must not have a zero dimension");
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn updated_state_tick(&self) -> Duration {
        Duration::from_millis(self.updated_state_tick_ms)
    }

    pub fn toast_delay(&self) -> Duration {
        Duration::from_millis(self.toast_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = TourConfig::from_json("{}").unwrap();
        assert_eq!(config, TourConfig::default());
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert_eq!(config.updated_state_tick(), Duration::from_secs(2));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = TourConfig::from_json(r#"{"tick_ms": 250, "viewport": [640, 480]}"#).unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.viewport, [640, 480]);
        assert_eq!(config.counter_target, 5);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn rejects_zero_tick_and_bad_json() {
        assert!(matches!(
            TourConfig::from_json(r#"{"tick_ms": 0}"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            TourConfig::from_json("{tick_ms"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TourConfig::load(Some(Path::new("/nonexistent/tour.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tour.json"));
        assert_eq!(TourConfig::load(None).unwrap(), TourConfig::default());
    }
}
