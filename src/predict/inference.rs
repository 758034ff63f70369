//! Model inference for predictions

use std::path::Path;

use crate::features::TeamEncoding;
use crate::model::ModelBundle;
use crate::{check_threshold, Decision, FeatureVector, Outcome, Result};

/// Wraps the loaded bundle and turns feature vectors into predictions
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: ModelBundle,
}

impl Predictor {
    pub fn new(bundle: ModelBundle) -> Self {
        Predictor { bundle }
    }

    /// Load predictor from a saved bundle
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ModelBundle::load(path)?))
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn predictors(&self) -> &[String] {
        &self.bundle.predictors
    }

    pub fn encoding(&self) -> &TeamEncoding {
        &self.bundle.encoding
    }

    /// Flatten features in the order the model was trained with
    pub fn model_input(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        features.ordered(&self.bundle.predictors)
    }

    /// Probability that the home team wins, in [0, 1]
    pub fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        let x = self.model_input(features)?;
        self.bundle.model.predict_proba(&x)
    }

    /// Hard label: the more probable class, ties going to the away side
    pub fn predict_label(&self, features: &FeatureVector) -> Result<Outcome> {
        let p = self.predict_probability(features)?;
        Ok(if p > 0.5 {
            Outcome::HomeWin
        } else {
            Outcome::AwayWin
        })
    }
}

/// Thresholded decision; the threshold must lie in the slider range
pub fn decide(probability: f64, threshold: f64) -> Result<Decision> {
    let threshold = check_threshold(threshold)?;
    Ok(if probability >= threshold {
        Decision::HomeWin
    } else {
        Decision::NotConfident
    })
}

/// Format a fixture prediction for terminal display
pub fn format_prediction(home: &str, away: &str, date: &str, outcome: Outcome, probability: f64) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {} ({})
├─────────────────────────────────────────────────┤
│  Prediction:       {}
│  P(home win):      {:.1}%
└─────────────────────────────────────────────────┘
"#,
        home,
        away,
        date,
        outcome,
        probability * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::HoopsError;

    #[test]
    fn test_predict_fixture_game() {
        let predictor = Predictor::new(fixtures::bundle());
        let fv = FeatureVector::new(12, 7, 2);
        let p = predictor.predict_probability(&fv).unwrap();
        assert!((p - 0.82).abs() < 1e-12);
        assert_eq!(predictor.predict_label(&fv).unwrap(), Outcome::HomeWin);

        let fv = FeatureVector::new(7, 12, 0);
        assert_eq!(predictor.predict_label(&fv).unwrap(), Outcome::AwayWin);
    }

    #[test]
    fn test_predictor_order_is_respected() {
        let mut bundle = fixtures::bundle();
        // Same tree but trained with day_code first: feature 0 is now day_code
        bundle.predictors = vec![
            "day_code".to_string(),
            "team_code_away".to_string(),
            "team_code_home".to_string(),
        ];
        let predictor = Predictor::new(bundle);
        let fv = FeatureVector::new(12, 7, 2);
        assert_eq!(predictor.model_input(&fv).unwrap(), vec![2.0, 7.0, 12.0]);
        // day_code 2 <= 10.5 goes left at the root
        let p = predictor.predict_probability(&fv).unwrap();
        assert!((p - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_decide_threshold() {
        assert_eq!(decide(0.82, 0.70).unwrap(), Decision::HomeWin);
        assert_eq!(decide(0.70, 0.70).unwrap(), Decision::HomeWin);
        assert_eq!(decide(0.69, 0.70).unwrap(), Decision::NotConfident);
        assert!(matches!(decide(0.82, 0.95), Err(HoopsError::InvalidThreshold(_))));
    }

    #[test]
    fn test_decide_is_monotonic_in_threshold() {
        let thresholds: Vec<f64> = (50..=90).map(|t| t as f64 / 100.0).collect();
        for p in [0.0, 0.3, 0.5, 0.55, 0.7, 0.82, 0.9, 1.0] {
            for (i, &t) in thresholds.iter().enumerate() {
                if decide(p, t).unwrap() == Decision::HomeWin {
                    for &lower in &thresholds[..i] {
                        assert_eq!(decide(p, lower).unwrap(), Decision::HomeWin);
                    }
                }
            }
        }
    }

    #[test]
    fn test_format_prediction() {
        let text = format_prediction("DEN", "MIA", "2024-12-25", Outcome::HomeWin, 0.82);
        assert!(text.contains("DEN vs MIA"));
        assert!(text.contains("Home Team Wins"));
        assert!(text.contains("82.0%"));
    }
}
