//! Historical dataset loading and lookup
//!
//! The SQLite feature store is tried first, the CSV export second.

pub mod csv_file;
pub mod database;
pub mod dataset;

pub use database::Database;
pub use dataset::{FeatureStats, GameDataset, TeamNaming};

use std::path::Path;

use crate::{DataConfig, HoopsError, Result};

/// Load the historical dataset, falling back from the store to the CSV file
pub fn load_dataset(config: &DataConfig, label_name: &str) -> Result<GameDataset> {
    let mut failures = Vec::new();

    let db_path = Path::new(&config.database_path);
    if db_path.exists() {
        match Database::open_read_only(db_path).and_then(|db| db.load_games(label_name)) {
            Ok(ds) => return Ok(ds),
            Err(e) => {
                log::warn!("Feature store {} unusable: {}", db_path.display(), e);
                failures.push(format!("{}: {}", db_path.display(), e));
            }
        }
    } else {
        log::debug!("No feature store at {}", db_path.display());
        failures.push(format!("{}: not found", db_path.display()));
    }

    let csv_path = Path::new(&config.csv_path);
    if csv_path.exists() {
        match csv_file::load_csv(csv_path, label_name) {
            Ok(ds) => return Ok(ds),
            Err(e) => failures.push(format!("{}: {}", csv_path.display(), e)),
        }
    } else {
        failures.push(format!("{}: not found", csv_path.display()));
    }

    Err(HoopsError::DatasetUnavailable(failures.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("hoops-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_nothing_available() {
        let config = DataConfig {
            database_path: temp_path("missing.db").display().to_string(),
            csv_path: temp_path("missing.csv").display().to_string(),
        };
        let err = load_dataset(&config, "home_win").unwrap_err();
        assert!(matches!(err, HoopsError::DatasetUnavailable(_)));
    }

    #[test]
    fn test_csv_fallback() {
        let csv = temp_path("fallback.csv");
        std::fs::write(
            &csv,
            "game_date,team_code_home,team_code_away,day_code\n2024-12-25,12,7,2\n",
        )
        .unwrap();
        let config = DataConfig {
            database_path: temp_path("absent.db").display().to_string(),
            csv_path: csv.display().to_string(),
        };
        let ds = load_dataset(&config, "home_win").unwrap();
        assert_eq!(ds.len(), 1);
        std::fs::remove_file(&csv).ok();
    }

    #[test]
    fn test_store_preferred() {
        let db_path = temp_path("store.db");
        std::fs::remove_file(&db_path).ok();
        {
            let mut db = Database::open(&db_path).unwrap();
            db.init_schema("home_win").unwrap();
            db.upsert_games(&fixtures::records(), "home_win").unwrap();
        }
        let config = DataConfig {
            database_path: db_path.display().to_string(),
            csv_path: temp_path("unused.csv").display().to_string(),
        };
        let ds = load_dataset(&config, "home_win").unwrap();
        assert_eq!(ds.len(), 5);
        std::fs::remove_file(&db_path).ok();
    }
}
