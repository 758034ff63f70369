//! Model bundle: the serialized classifier plus everything needed to feed it
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "version": "rf-2024-12",
//!   "model": { "n_features": 3, "trees": [ { "nodes": [ ... ] } ] },
//!   "predictors": ["team_code_home", "team_code_away", "day_code"],
//!   "label_name": "home_win",
//!   "encoding": { "teams": { "ATL": 0, "BOS": 1 } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::forest::RandomForest;
use crate::features::match_repr::check_predictors;
use crate::features::TeamEncoding;
use crate::{HoopsError, Result};

/// Keys a bundle must carry
pub const REQUIRED_KEYS: [&str; 4] = ["model", "predictors", "label_name", "encoding"];

/// Trained classifier with its predictor order, label column and team encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    #[serde(default)]
    pub version: Option<String>,
    pub model: RandomForest,
    pub predictors: Vec<String>,
    pub label_name: String,
    pub encoding: TeamEncoding,
}

impl ModelBundle {
    /// Load and validate a bundle; any failure means the model is unusable
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let bundle = Self::from_json(&content)?;
        log::info!(
            "Loaded model bundle {} ({} trees, {} teams, version {})",
            path.display(),
            bundle.model.trees.len(),
            bundle.encoding.len(),
            bundle.version.as_deref().unwrap_or("unversioned")
        );
        Ok(bundle)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| HoopsError::ModelUnavailable(format!("bundle is not valid JSON: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| HoopsError::ModelUnavailable("bundle is not a JSON object".to_string()))?;

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|k| !object.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(HoopsError::ModelUnavailable(format!(
                "bundle is missing keys: {}",
                missing.join(", ")
            )));
        }

        let bundle: ModelBundle = serde_json::from_value(value)
            .map_err(|e| HoopsError::ModelUnavailable(format!("malformed bundle: {}", e)))?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.model.validate()?;
        check_predictors(&self.predictors)?;
        if self.model.n_features != self.predictors.len() {
            return Err(HoopsError::FeatureShape(format!(
                "model takes {} features but bundle lists {} predictors",
                self.model.n_features,
                self.predictors.len()
            )));
        }
        if self.label_name.trim().is_empty() {
            return Err(HoopsError::ModelUnavailable("empty label_name".to_string()));
        }
        self.encoding.validate()
    }
}
