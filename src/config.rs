use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Remote API
    pub api_base: String,
    pub token_endpoint: String,
    pub token_file: PathBuf,

    // Retry schedule: one delay per attempt, in order. The number of
    // delays is also the maximum attempt count.
    pub retry_delays_secs: Vec<u64>,

    // Logging
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            token_file: PathBuf::from("token.json"),
            retry_delays_secs: vec![5, 15, 30, 45, 60],
            log_dir: PathBuf::from("logs"),
            log_level: "debug".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file with environment variable
    /// overrides, falling back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("DRIVESORT_API_BASE") {
            self.api_base = base;
        }
        if let Ok(file) = std::env::var("DRIVESORT_TOKEN_FILE") {
            self.token_file = PathBuf::from(file);
        }
        if let Ok(dir) = std::env::var("DRIVESORT_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("DRIVESORT_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_base).map_err(|e| AppError::Config {
            message: format!("invalid API base URL '{}': {}", self.api_base, e),
        })?;

        if self.retry_delays_secs.is_empty() {
            return Err(AppError::Config {
                message: "retry schedule must contain at least one delay".to_string(),
            });
        }
        if self.retry_delays_secs.windows(2).any(|w| w[0] > w[1]) {
            return Err(AppError::Config {
                message: "retry delays must be non-decreasing".to_string(),
            });
        }

        Ok(())
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|&secs| Duration::from_secs(secs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_delays().len(), 5);
    }

    #[test]
    fn decreasing_retry_schedule_is_rejected() {
        let config = Config {
            retry_delays_secs: vec![30, 5],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn empty_retry_schedule_is_rejected() {
        let config = Config {
            retry_delays_secs: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_api_base_is_rejected() {
        let config = Config {
            api_base: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api_base, config.api_base);
        assert_eq!(parsed.retry_delays_secs, config.retry_delays_secs);
    }
}
