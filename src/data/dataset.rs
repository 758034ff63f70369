//! In-memory historical dataset and matchup lookup
//!
//! Loaded once at startup and never mutated. Every query is a linear scan.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::features::temporal::iso;
use crate::{GameRecord, HoopsError, Result, TeamRef};

/// How teams are identified in requests against this dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamNaming {
    /// Dataset has team name columns; identifiers are names
    Names,
    /// Only integer codes are available; identifiers are decimal codes
    Codes,
}

/// Read-only table of historical games
#[derive(Debug, Clone)]
pub struct GameDataset {
    games: Vec<GameRecord>,
    naming: TeamNaming,
}

impl GameDataset {
    /// `naming` follows the source's columns, not individual cells
    pub fn new(games: Vec<GameRecord>, naming: TeamNaming) -> Self {
        GameDataset { games, naming }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn naming(&self) -> TeamNaming {
        self.naming
    }

    /// Identifier a team is listed and selected by
    pub fn identifier(&self, team: &TeamRef) -> String {
        match (self.naming, &team.name) {
            (TeamNaming::Names, Some(name)) => name.clone(),
            _ => team.code.to_string(),
        }
    }

    fn side_matches(&self, team: &TeamRef, identifier: &str) -> bool {
        let identifier = identifier.trim();
        match self.naming {
            TeamNaming::Names => team
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase() == identifier.to_lowercase()),
            TeamNaming::Codes => identifier.parse::<i64>().ok() == Some(team.code.0),
        }
    }

    /// Sorted union of home and away identifiers
    pub fn teams(&self) -> Vec<String> {
        match self.naming {
            TeamNaming::Names => self
                .games
                .iter()
                .flat_map(|g| [&g.home, &g.away])
                .map(|t| self.identifier(t))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            TeamNaming::Codes => self
                .games
                .iter()
                .flat_map(|g| [g.home.code, g.away.code])
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// All games with this home and away team
    pub fn matchups<'a, 'b>(
        &'a self,
        home: &'b str,
        away: &'b str,
    ) -> impl Iterator<Item = &'a GameRecord> + 'b
    where
        'a: 'b,
    {
        self.games
            .iter()
            .filter(move |g| self.side_matches(&g.home, home) && self.side_matches(&g.away, away))
    }

    /// Distinct dates of a matchup, ascending
    pub fn available_dates(&self, home: &str, away: &str) -> Vec<NaiveDate> {
        self.matchups(home, away)
            .map(|g| g.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// [`available_dates`](Self::available_dates) as ISO strings
    pub fn available_date_strings(&self, home: &str, away: &str) -> Vec<String> {
        self.available_dates(home, away)
            .into_iter()
            .map(iso)
            .collect()
    }

    /// The game for (home, away, date), if the dataset has it
    pub fn find_row(&self, home: &str, away: &str, date: NaiveDate) -> Result<Option<&GameRecord>> {
        let mut rows = self.games.iter().filter(|g| {
            g.date == date && self.side_matches(&g.home, home) && self.side_matches(&g.away, away)
        });
        let first = rows.next();
        let extra = rows.count();
        if extra > 0 {
            return Err(HoopsError::DataIntegrity(format!(
                "{} rows for {} vs {} on {}",
                extra + 1,
                home,
                away,
                iso(date)
            )));
        }
        Ok(first)
    }

    /// Per-predictor mean and sample standard deviation
    pub fn feature_stats(&self, predictors: &[String]) -> FeatureStats {
        FeatureStats::from_games(&self.games, predictors)
    }

    /// Earliest and latest game date
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.games.iter().map(|g| g.date).min()?;
        let max = self.games.iter().map(|g| g.date).max()?;
        Some((min, max))
    }

    /// Number of rows with an observed outcome
    pub fn labelled_count(&self) -> usize {
        self.games.iter().filter(|g| g.home_won.is_some()).count()
    }
}

/// Column statistics over the dataset, in predictor order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStats {
    pub names: Vec<String>,
    pub mean: Vec<f64>,
    /// NaN when fewer than two rows are available
    pub std: Vec<f64>,
}

impl FeatureStats {
    pub fn from_games(games: &[GameRecord], predictors: &[String]) -> Self {
        let n = games.len();
        let mut mean = Vec::with_capacity(predictors.len());
        let mut std = Vec::with_capacity(predictors.len());

        for name in predictors {
            let values: Vec<f64> = games
                .iter()
                .filter_map(|g| g.features.get(name))
                .collect();
            let m = if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            let s = if values.len() < 2 {
                f64::NAN
            } else {
                let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
                (ss / (values.len() - 1) as f64).sqrt()
            };
            mean.push(m);
            std.push(s);
        }

        log::debug!("Feature statistics over {} rows: mean={:?} std={:?}", n, mean, std);

        FeatureStats {
            names: predictors.to_vec(),
            mean,
            std,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, date};
    use crate::FeatureVector;

    #[test]
    fn test_teams_sorted_union() {
        let ds = fixtures::dataset();
        assert_eq!(ds.teams(), vec!["BOS", "DEN", "MIA"]);
    }

    #[test]
    fn test_available_dates_sorted_and_distinct() {
        let ds = fixtures::dataset();
        let dates = ds.available_dates("DEN", "MIA");
        assert_eq!(
            dates,
            vec![date(2023, 11, 1), date(2024, 3, 10), date(2024, 12, 25)]
        );
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            ds.available_date_strings("DEN", "MIA"),
            vec!["2023-11-01", "2024-03-10", "2024-12-25"]
        );
    }

    #[test]
    fn test_available_dates_are_directional() {
        let ds = fixtures::dataset();
        assert_eq!(ds.available_dates("MIA", "DEN"), vec![date(2024, 1, 15)]);
    }

    #[test]
    fn test_available_dates_empty_without_match() {
        let ds = fixtures::dataset();
        assert!(ds.available_dates("MIA", "BOS").is_empty());
        assert!(ds.available_dates("LAL", "DEN").is_empty());
    }

    #[test]
    fn test_find_row() {
        let ds = fixtures::dataset();
        let row = ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().unwrap();
        assert_eq!(row.features, FeatureVector::new(12, 7, 2));
        assert_eq!(row.home_won, Some(true));

        assert!(ds.find_row("DEN", "MIA", date(2024, 12, 26)).unwrap().is_none());
    }

    #[test]
    fn test_find_row_duplicate_is_integrity_error() {
        let mut games = fixtures::records();
        games.push(games[0].clone());
        let ds = GameDataset::new(games, TeamNaming::Names);
        assert!(matches!(
            ds.find_row("DEN", "MIA", date(2024, 12, 25)),
            Err(HoopsError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_code_naming() {
        let games: Vec<GameRecord> = fixtures::records()
            .into_iter()
            .map(|mut g| {
                g.home.name = None;
                g.away.name = None;
                g
            })
            .collect();
        let ds = GameDataset::new(games, TeamNaming::Codes);
        assert_eq!(ds.teams(), vec!["1", "7", "12"]);
        assert_eq!(ds.available_dates("12", "7").len(), 3);
        assert!(ds.find_row("12", "7", date(2024, 12, 25)).unwrap().is_some());
        assert!(ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().is_none());
    }

    #[test]
    fn test_find_row_outlives_query_strings() {
        let ds = fixtures::dataset();
        let row = {
            let home = String::from("DEN");
            let away = String::from("MIA");
            ds.find_row(&home, &away, date(2024, 12, 25)).unwrap()
        };
        assert_eq!(row.map(|g| g.home_won), Some(Some(true)));
    }

    #[test]
    fn test_blank_name_keeps_name_mode() {
        let mut games = fixtures::records();
        games[4].away.name = None;
        let ds = GameDataset::new(games, TeamNaming::Names);
        assert_eq!(ds.available_dates("DEN", "MIA").len(), 3);
        assert!(ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().is_some());
        assert!(ds.teams().contains(&"DEN".to_string()));
    }

    #[test]
    fn test_feature_stats() {
        let ds = fixtures::dataset();
        let predictors: Vec<String> = FeatureVector::NAMES.iter().map(|s| s.to_string()).collect();
        let stats = ds.feature_stats(&predictors);
        // Home codes: 12, 12, 7, 12, 1
        assert!((stats.mean[0] - 8.8).abs() < 1e-9);
        assert!(stats.std[0] > 0.0);

        let single = FeatureStats::from_games(&ds.games()[..1], &predictors);
        assert!(single.std[0].is_nan());
    }

    #[test]
    fn test_date_range() {
        let ds = fixtures::dataset();
        assert_eq!(ds.date_range(), Some((date(2023, 11, 1), date(2024, 12, 25))));
        assert_eq!(ds.labelled_count(), 4);
    }
}
