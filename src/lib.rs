//! NBA home-win prediction
//!
//! Loads a pre-trained tree ensemble together with its team encoding table and
//! serves predictions for historical or hypothetical matchups.

pub mod app;
pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod server;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use app::AppContext;
pub use features::FeatureVector;

/// Integer code of a franchise, fixed by the training-time encoding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamCode(pub i64);

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a historical game: the encoded team plus its name when the dataset has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub code: TeamCode,
    pub name: Option<String>,
}

impl TeamRef {
    pub fn new(code: i64, name: Option<String>) -> Self {
        TeamRef {
            code: TeamCode(code),
            name,
        }
    }
}

/// A single row of the historical feature dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub home: TeamRef,
    pub away: TeamRef,
    pub features: FeatureVector,
    /// Observed result when the dataset carries the label column
    pub home_won: Option<bool>,
}

/// Hard class predicted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    HomeWin,
    AwayWin,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::HomeWin => write!(f, "Home Team Wins"),
            Outcome::AwayWin => write!(f, "Away Team Wins"),
        }
    }
}

/// Thresholded decision of the interactive flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    HomeWin,
    NotConfident,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::HomeWin => write!(f, "✅ Home win"),
            Decision::NotConfident => write!(f, "❌ Not confident"),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("No data for {home} vs {away} on {date}")]
    NoMatchingData {
        home: String,
        away: String,
        date: NaiveDate,
    },

    #[error("Explanation unavailable: {0}")]
    ExplanationUnavailable(String),

    #[error("Feature shape mismatch: {0}")]
    FeatureShape(String),

    #[error("Threshold {0} outside [{min}, {max}]", min = MIN_THRESHOLD, max = MAX_THRESHOLD)]
    InvalidThreshold(f64),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl HoopsError {
    /// Errors caused by the request itself rather than by the process state
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            HoopsError::InvalidDate(_)
                | HoopsError::UnknownTeam(_)
                | HoopsError::NoMatchingData { .. }
                | HoopsError::InvalidThreshold(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Lowest decision threshold the interactive flow accepts
pub const MIN_THRESHOLD: f64 = 0.5;
/// Highest decision threshold the interactive flow accepts
pub const MAX_THRESHOLD: f64 = 0.9;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub predict: PredictConfig,
    pub explain: ExplainConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// SQLite feature store, tried first
    pub database_path: String,
    /// Delimited export of the same table, used when the store is missing
    pub csv_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub bundle_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// One of `auto`, `tree`, `statistical`, `none`
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/features_for_app.db".to_string(),
                csv_path: "data/features_for_app.csv".to_string(),
            },
            model: ModelConfig {
                bundle_path: "model/rf_homewin.json".to_string(),
            },
            predict: PredictConfig { threshold: 0.70 },
            explain: ExplainConfig {
                method: "auto".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 7860,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path);
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold(self.predict.threshold)
            .map_err(|_| HoopsError::Config(format!(
                "predict.threshold {} must lie in [{}, {}]",
                self.predict.threshold, MIN_THRESHOLD, MAX_THRESHOLD
            )))?;
        if !matches!(
            self.explain.method.as_str(),
            "auto" | "tree" | "statistical" | "none"
        ) {
            return Err(HoopsError::Config(format!(
                "Unknown explain.method '{}'. Use auto, tree, statistical or none.",
                self.explain.method
            )));
        }
        Ok(())
    }
}

/// Reject thresholds outside the slider range
pub fn check_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_finite() && (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(HoopsError::InvalidThreshold(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.predict.threshold, 0.70);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, 7860);
        assert_eq!(parsed.model.bundle_path, config.model.bundle_path);
    }

    #[test]
    fn test_config_rejects_bad_threshold() {
        let mut config = Config::default();
        config.predict.threshold = 0.95;
        assert!(matches!(config.validate(), Err(HoopsError::Config(_))));
    }

    #[test]
    fn test_config_rejects_unknown_method() {
        let mut config = Config::default();
        config.explain.method = "lime".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(check_threshold(0.5).is_ok());
        assert!(check_threshold(0.9).is_ok());
        assert!(check_threshold(0.49).is_err());
        assert!(check_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Outcome::HomeWin.to_string(), "Home Team Wins");
        assert_eq!(Outcome::AwayWin.to_string(), "Away Team Wins");
        assert_eq!(Decision::HomeWin.to_string(), "✅ Home win");
        assert_eq!(Decision::NotConfident.to_string(), "❌ Not confident");
    }
}
