//! Feature vector consumed by the classifier
//!
//! Three integer features per game. The classifier's input is assembled in the
//! order of the bundle's predictor list, not in field order.

use serde::{Deserialize, Serialize};

use crate::{HoopsError, Result};

/// Model-ready features of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Encoded home franchise
    pub team_code_home: i64,
    /// Encoded away franchise
    pub team_code_away: i64,
    /// Weekday of the game, Monday = 0
    pub day_code: u8,
}

impl FeatureVector {
    /// Number of features
    pub const DIM: usize = 3;

    /// Predictor names, in field order
    pub const NAMES: [&'static str; Self::DIM] = ["team_code_home", "team_code_away", "day_code"];

    pub fn new(team_code_home: i64, team_code_away: i64, day_code: u8) -> Self {
        FeatureVector {
            team_code_home,
            team_code_away,
            day_code,
        }
    }

    /// Convert to flat vector in field order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.team_code_home as f64,
            self.team_code_away as f64,
            self.day_code as f64,
        ]
    }

    /// Value of a single predictor by name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "team_code_home" => Some(self.team_code_home as f64),
            "team_code_away" => Some(self.team_code_away as f64),
            "day_code" => Some(self.day_code as f64),
            _ => None,
        }
    }

    /// Flatten in the order the model was trained with
    pub fn ordered(&self, predictors: &[String]) -> Result<Vec<f64>> {
        check_predictors(predictors)?;
        predictors
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| HoopsError::FeatureShape(format!("unknown predictor '{}'", name)))
            })
            .collect()
    }
}

/// A predictor list must name every feature exactly once
pub fn check_predictors(predictors: &[String]) -> Result<()> {
    if predictors.len() != FeatureVector::DIM {
        return Err(HoopsError::FeatureShape(format!(
            "expected {} predictors, got {}",
            FeatureVector::DIM,
            predictors.len()
        )));
    }
    for name in FeatureVector::NAMES {
        let count = predictors.iter().filter(|p| p.as_str() == name).count();
        if count != 1 {
            return Err(HoopsError::FeatureShape(format!(
                "predictor '{}' appears {} times in {:?}",
                name, count, predictors
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_field_order() {
        let fv = FeatureVector::new(12, 7, 2);
        assert_eq!(fv.to_vec(), vec![12.0, 7.0, 2.0]);
    }

    #[test]
    fn test_ordered_follows_predictors() {
        let fv = FeatureVector::new(12, 7, 2);
        let order = names(&["day_code", "team_code_home", "team_code_away"]);
        assert_eq!(fv.ordered(&order).unwrap(), vec![2.0, 12.0, 7.0]);
    }

    #[test]
    fn test_ordered_rejects_bad_shape() {
        let fv = FeatureVector::new(12, 7, 2);

        let short = names(&["team_code_home", "team_code_away"]);
        assert!(matches!(fv.ordered(&short), Err(HoopsError::FeatureShape(_))));

        let dup = names(&["team_code_home", "team_code_home", "day_code"]);
        assert!(matches!(fv.ordered(&dup), Err(HoopsError::FeatureShape(_))));

        let unknown = names(&["team_code_home", "team_code_away", "month"]);
        assert!(matches!(fv.ordered(&unknown), Err(HoopsError::FeatureShape(_))));
    }
}
