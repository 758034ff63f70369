//! Application context and the two request flows
//!
//! Everything loaded at startup lives in [`AppContext`]: the model bundle,
//! the historical dataset and the explanation strategy. The context is
//! immutable afterwards and shared between requests.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::{load_dataset, GameDataset};
use crate::features::{parse_game_date, FeatureDeriver};
use crate::features::temporal::iso;
use crate::predict::{decide, Explanation, Explanations, Predictor};
use crate::{check_threshold, Config, Decision, FeatureVector, Outcome, Result};

pub const NO_DATA_LABEL: &str = "No data";
pub const NO_DATA_MESSAGE: &str = "I don't have this matchup/date in the demo dataset.";

/// Hard-label prediction for a fixture derived from the encoding table
#[derive(Debug, Clone, Serialize)]
pub struct FixturePrediction {
    pub home: String,
    pub away: String,
    pub date: String,
    pub features: FeatureVector,
    pub probability: f64,
    pub outcome: Outcome,
}

/// Derive features for any fixture and run the model; no dataset needed
pub fn predict_fixture(predictor: &Predictor, home: &str, away: &str, date: &str) -> Result<FixturePrediction> {
    let features = FeatureDeriver::new(predictor.encoding()).derive(home, away, date)?;
    let probability = predictor.predict_probability(&features)?;
    let outcome = predictor.predict_label(&features)?;
    let date = iso(parse_game_date(date)?);

    log::debug!("{} vs {} on {}: p={:.4}", home, away, date, probability);

    Ok(FixturePrediction {
        home: home.to_string(),
        away: away.to_string(),
        date,
        features,
        probability,
        outcome,
    })
}

/// Thresholded prediction for a historical row
#[derive(Debug, Clone)]
pub struct MatchupPrediction {
    pub date: NaiveDate,
    pub probability: f64,
    pub threshold: f64,
    pub decision: Decision,
    pub explanation: Explanation,
    /// Observed result, when the dataset has one
    pub actual: Option<bool>,
}

impl MatchupPrediction {
    pub fn markdown(&self) -> String {
        let reasons = self.explanation.lines().join("\n");
        let mut text = format!(
            "**P(Home win)**: {:.2}%  \n**Decision** (τ={:.2}): {}\n\nReasons:\n{}",
            self.probability * 100.0,
            self.threshold,
            self.decision,
            reasons
        );
        if let Some(won) = self.actual {
            text.push_str("\n\n**Actual outcome:** ");
            text.push_str(if won { "🏠 Home won" } else { "🚌 Home lost" });
        }
        text
    }
}

#[derive(Debug, Clone)]
pub enum MatchupOutcome {
    /// The triple is not in the dataset
    NoData,
    Predicted(MatchupPrediction),
}

impl MatchupOutcome {
    pub fn label(&self) -> String {
        match self {
            MatchupOutcome::NoData => NO_DATA_LABEL.to_string(),
            MatchupOutcome::Predicted(p) => p.decision.to_string(),
        }
    }

    pub fn explanation_markdown(&self) -> String {
        match self {
            MatchupOutcome::NoData => NO_DATA_MESSAGE.to_string(),
            MatchupOutcome::Predicted(p) => p.markdown(),
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            MatchupOutcome::NoData => None,
            MatchupOutcome::Predicted(p) => Some(p.probability),
        }
    }
}

/// Shared, read-only state built once at startup
pub struct AppContext {
    pub config: Config,
    pub predictor: Predictor,
    pub dataset: GameDataset,
    pub explanations: Explanations,
}

impl AppContext {
    /// Load bundle, dataset and explainer; any failure here is fatal
    pub fn load(config: Config) -> Result<Self> {
        let predictor = Predictor::load(&config.model.bundle_path)?;
        let dataset = load_dataset(&config.data, &predictor.bundle().label_name)?;
        log::info!(
            "Dataset ready: {} games, {} teams",
            dataset.len(),
            dataset.teams().len()
        );
        Ok(Self::from_parts(config, predictor, dataset))
    }

    pub fn from_parts(config: Config, predictor: Predictor, dataset: GameDataset) -> Self {
        let explanations = Explanations::select(&config.explain.method, predictor.bundle(), &dataset);
        AppContext {
            config,
            predictor,
            dataset,
            explanations,
        }
    }

    pub fn teams(&self) -> Vec<String> {
        self.dataset.teams()
    }

    pub fn available_dates(&self, home: &str, away: &str) -> Vec<String> {
        self.dataset.available_date_strings(home, away)
    }

    pub fn predict_fixture(&self, home: &str, away: &str, date: &str) -> Result<FixturePrediction> {
        predict_fixture(&self.predictor, home, away, date)
    }

    /// Look the triple up in the dataset and predict from the stored features
    ///
    /// `threshold` defaults to the configured one. An absent triple is
    /// [`MatchupOutcome::NoData`], not an error.
    pub fn predict_matchup(
        &self,
        home: &str,
        away: &str,
        date: &str,
        threshold: Option<f64>,
    ) -> Result<MatchupOutcome> {
        let threshold = check_threshold(threshold.unwrap_or(self.config.predict.threshold))?;
        let date = parse_game_date(date)?;

        let Some(row) = self.dataset.find_row(home, away, date)? else {
            log::debug!("No row for {} vs {} on {}", home, away, date);
            return Ok(MatchupOutcome::NoData);
        };

        let x = self.predictor.model_input(&row.features)?;
        let probability = self.predictor.bundle().model.predict_proba(&x)?;
        let decision = decide(probability, threshold)?;
        let explanation = self.explanations.explain(&x);

        Ok(MatchupOutcome::Predicted(MatchupPrediction {
            date,
            probability,
            threshold,
            decision,
            explanation,
            actual: row.home_won,
        }))
    }
}
