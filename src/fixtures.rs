//! Shared test data: a three-team league with one hand-built tree

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::data::{GameDataset, TeamNaming};
use crate::features::{FeatureVector, TeamEncoding};
use crate::model::{ModelBundle, Node, RandomForest, Tree};
use crate::{GameRecord, TeamRef};

pub fn encoding() -> TeamEncoding {
    let mut teams = BTreeMap::new();
    teams.insert("BOS".to_string(), 1);
    teams.insert("MIA".to_string(), 7);
    teams.insert("DEN".to_string(), 12);
    TeamEncoding {
        version: Some("test".to_string()),
        teams,
    }
}

/// One tree: home code > 10.5 and day code <= 3.5 gives 0.82
pub fn forest() -> RandomForest {
    RandomForest {
        n_features: 3,
        trees: vec![Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 10.5,
                    left: 1,
                    right: 2,
                    value: Some(0.5),
                },
                Node::Leaf { value: 0.3 },
                Node::Split {
                    feature: 2,
                    threshold: 3.5,
                    left: 3,
                    right: 4,
                    value: Some(0.7),
                },
                Node::Leaf { value: 0.82 },
                Node::Leaf { value: 0.4 },
            ],
        }],
    }
}

pub fn bundle() -> ModelBundle {
    ModelBundle {
        version: Some("test".to_string()),
        model: forest(),
        predictors: FeatureVector::NAMES.iter().map(|s| s.to_string()).collect(),
        label_name: "home_win".to_string(),
        encoding: encoding(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn game(home: (&str, i64), away: (&str, i64), on: NaiveDate, home_won: Option<bool>) -> GameRecord {
    GameRecord {
        date: on,
        home: TeamRef::new(home.1, Some(home.0.to_string())),
        away: TeamRef::new(away.1, Some(away.0.to_string())),
        features: FeatureVector::new(home.1, away.1, crate::features::day_code(on)),
        home_won,
    }
}

/// Historical games, deliberately out of date order
pub fn records() -> Vec<GameRecord> {
    let den = ("DEN", 12);
    let mia = ("MIA", 7);
    let bos = ("BOS", 1);
    vec![
        game(den, mia, date(2024, 12, 25), Some(true)),
        game(den, mia, date(2023, 11, 1), Some(false)),
        game(mia, den, date(2024, 1, 15), Some(false)),
        game(den, mia, date(2024, 3, 10), None),
        game(bos, den, date(2024, 2, 2), Some(true)),
    ]
}

pub fn dataset() -> GameDataset {
    GameDataset::new(records(), TeamNaming::Names)
}
