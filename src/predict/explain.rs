//! Short "why" for a single prediction
//!
//! Two strategies behind one trait: decision-path attribution over the forest,
//! and a z-score heuristic against the historical dataset. The strategy is
//! picked once at startup; a failing strategy degrades to the heuristic, then
//! to an empty explanation.

use crate::data::{FeatureStats, GameDataset};
use crate::model::{ModelBundle, RandomForest};
use crate::{HoopsError, Result};

/// Number of reasons listed
pub const TOP_N: usize = 3;

/// Added to the standard deviation so constant columns do not divide by zero
pub const STD_EPSILON: f64 = 1e-9;

/// Signed score of one predictor
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationKind {
    /// Contributions towards the home-win probability
    Attribution,
    /// Standardized deviation from the dataset mean
    Standardized,
    Empty,
}

/// Ranked reasons for a prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub kind: ExplanationKind,
    /// Highest first, at most [`TOP_N`]
    pub top: Vec<FeatureContribution>,
    /// Most negative contribution (attribution only)
    pub headwind: Option<FeatureContribution>,
}

impl Explanation {
    pub fn empty() -> Self {
        Explanation {
            kind: ExplanationKind::Empty,
            top: Vec::new(),
            headwind: None,
        }
    }

    fn ranked(kind: ExplanationKind, names: &[String], values: &[f64]) -> Self {
        let mut scored: Vec<FeatureContribution> = names
            .iter()
            .zip(values)
            .map(|(name, &value)| FeatureContribution {
                name: name.clone(),
                value,
            })
            .collect();
        scored.sort_by(|a, b| b.value.total_cmp(&a.value));

        let headwind = match kind {
            ExplanationKind::Attribution => scored
                .iter()
                .min_by(|a, b| a.value.total_cmp(&b.value))
                .cloned(),
            _ => None,
        };
        scored.truncate(TOP_N);

        Explanation {
            kind,
            top: scored,
            headwind,
        }
    }

    /// Bullet lines for display
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .top
            .iter()
            .map(|c| match self.kind {
                ExplanationKind::Standardized => {
                    format!("• {} unusually high (z≈{:.2})", c.name, c.value)
                }
                _ => format!("• {}: {:+.3}", c.name, c.value),
            })
            .collect();
        if let Some(h) = &self.headwind {
            lines.push(format!("• Headwind: {} {:+.3}", h.name, h.value));
        }
        lines
    }
}

/// Capability interface for explanation strategies
pub trait Explainer: Send + Sync {
    fn name(&self) -> &'static str;

    /// `x` is the model input, in predictor order
    fn explain(&self, x: &[f64]) -> Result<Explanation>;
}

/// Decision-path attribution over the forest
pub struct TreeAttribution {
    forest: RandomForest,
    predictors: Vec<String>,
}

impl TreeAttribution {
    /// Only available when every split node stores its probability
    pub fn new(bundle: &ModelBundle) -> Result<Self> {
        if !bundle.model.supports_path_attribution() {
            return Err(HoopsError::ExplanationUnavailable(
                "model has split nodes without stored probabilities".to_string(),
            ));
        }
        Ok(TreeAttribution {
            forest: bundle.model.clone(),
            predictors: bundle.predictors.clone(),
        })
    }
}

impl Explainer for TreeAttribution {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn explain(&self, x: &[f64]) -> Result<Explanation> {
        let pc = self.forest.path_contributions(x)?;
        Ok(Explanation::ranked(
            ExplanationKind::Attribution,
            &self.predictors,
            &pc.contributions,
        ))
    }
}

/// Z-scores against the historical dataset
pub struct StatisticalFallback {
    stats: FeatureStats,
}

impl StatisticalFallback {
    pub fn new(stats: FeatureStats) -> Self {
        StatisticalFallback { stats }
    }

    pub fn from_dataset(dataset: &GameDataset, predictors: &[String]) -> Self {
        Self::new(dataset.feature_stats(predictors))
    }
}

impl Explainer for StatisticalFallback {
    fn name(&self) -> &'static str {
        "statistical"
    }

    fn explain(&self, x: &[f64]) -> Result<Explanation> {
        if x.len() != self.stats.names.len() {
            return Err(HoopsError::ExplanationUnavailable(format!(
                "expected {} values, got {}",
                self.stats.names.len(),
                x.len()
            )));
        }
        let z: Vec<f64> = x
            .iter()
            .zip(self.stats.mean.iter().zip(&self.stats.std))
            .map(|(v, (m, s))| {
                let z = (v - m) / (s + STD_EPSILON);
                if z.is_nan() {
                    0.0
                } else {
                    z
                }
            })
            .collect();
        Ok(Explanation::ranked(
            ExplanationKind::Standardized,
            &self.stats.names,
            &z,
        ))
    }
}

/// Strategy chosen at startup plus the heuristic used when it fails
pub struct Explanations {
    strategy: Option<Box<dyn Explainer>>,
    fallback: Option<StatisticalFallback>,
}

impl Explanations {
    /// `method` is one of `auto`, `tree`, `statistical`, `none`
    pub fn select(method: &str, bundle: &ModelBundle, dataset: &GameDataset) -> Self {
        let fallback = || {
            if dataset.is_empty() {
                None
            } else {
                Some(StatisticalFallback::from_dataset(dataset, &bundle.predictors))
            }
        };

        let strategy: Option<Box<dyn Explainer>> = match method {
            "none" => None,
            "statistical" => fallback().map(|f| Box::new(f) as Box<dyn Explainer>),
            _ => match TreeAttribution::new(bundle) {
                Ok(tree) => Some(Box::new(tree)),
                Err(e) => {
                    if method == "tree" {
                        log::warn!("Tree attribution requested but unavailable: {}", e);
                    } else {
                        log::info!("Tree attribution unavailable ({}), using z-scores", e);
                    }
                    fallback().map(|f| Box::new(f) as Box<dyn Explainer>)
                }
            },
        };

        let explanations = Explanations {
            fallback: if method == "none" { None } else { fallback() },
            strategy,
        };
        log::info!("Explanation strategy: {}", explanations.strategy_name());
        explanations
    }

    pub fn with_strategy(strategy: Box<dyn Explainer>, fallback: Option<StatisticalFallback>) -> Self {
        Explanations {
            strategy: Some(strategy),
            fallback,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.as_ref().map(|s| s.name()).unwrap_or("none")
    }

    /// Never fails: errors degrade to the heuristic, then to nothing
    pub fn explain(&self, x: &[f64]) -> Explanation {
        let Some(strategy) = &self.strategy else {
            return Explanation::empty();
        };
        match strategy.explain(x) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("{} explanation failed: {}", strategy.name(), e);
                match &self.fallback {
                    Some(f) if strategy.name() != f.name() => f.explain(x).unwrap_or_else(|e| {
                        log::warn!("Fallback explanation failed: {}", e);
                        Explanation::empty()
                    }),
                    _ => Explanation::empty(),
                }
            }
        }
    }
}
