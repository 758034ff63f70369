//! Raw inputs to model features

use chrono::NaiveDate;

use super::encoding::TeamEncoding;
use super::match_repr::FeatureVector;
use super::temporal::{day_code, parse_game_date};
use crate::Result;

/// Derives feature vectors with the training-time encoding table
pub struct FeatureDeriver<'a> {
    encoding: &'a TeamEncoding,
}

impl<'a> FeatureDeriver<'a> {
    pub fn new(encoding: &'a TeamEncoding) -> Self {
        FeatureDeriver { encoding }
    }

    /// Derive features from team identifiers and a date string
    pub fn derive(&self, home_team: &str, away_team: &str, game_date: &str) -> Result<FeatureVector> {
        let date = parse_game_date(game_date)?;
        self.derive_on(home_team, away_team, date)
    }

    /// Derive features for an already parsed date
    pub fn derive_on(&self, home_team: &str, away_team: &str, date: NaiveDate) -> Result<FeatureVector> {
        let home = self.encoding.code_of(home_team)?;
        let away = self.encoding.code_of(away_team)?;
        Ok(FeatureVector::new(home.0, away.0, day_code(date)))
    }
}
