//! SQLite feature store
//!
//! One `games` table holding the derived features of every historical game.
//! Team name columns and the outcome label column are optional.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use super::dataset::{GameDataset, TeamNaming};
use crate::features::parse_game_date;
use crate::features::temporal::iso;
use crate::{FeatureVector, GameRecord, HoopsError, Result, TeamRef};

const NAME_HOME_PREFIX: &str = "team_name_home";
const NAME_AWAY_PREFIX: &str = "team_name_away";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Database { conn })
    }

    /// Open an existing store without write access
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Database { conn })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database { conn })
    }

    /// Create the games table with names and the given label column
    pub fn init_schema(&self, label_name: &str) -> Result<()> {
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_date TEXT NOT NULL,
                team_name_home TEXT,
                team_name_away TEXT,
                team_code_home INTEGER NOT NULL,
                team_code_away INTEGER NOT NULL,
                day_code INTEGER NOT NULL,
                {label} INTEGER,
                UNIQUE(game_date, team_code_home, team_code_away)
            );

            CREATE INDEX IF NOT EXISTS idx_games_teams ON games(team_code_home, team_code_away);
            "#,
            label = quote_ident(label_name)
        ))?;
        Ok(())
    }

    /// Column names of the games table
    pub fn columns(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(games)")?;
        let cols = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if cols.is_empty() {
            return Err(HoopsError::DatasetUnavailable(
                "feature store has no games table".to_string(),
            ));
        }
        Ok(cols)
    }

    // ==================== Game Operations ====================

    /// Insert or update a game
    pub fn upsert_game(&self, record: &GameRecord, label_name: &str) -> Result<()> {
        upsert_on(&self.conn, record, label_name)
    }

    /// Insert multiple games in one transaction
    pub fn upsert_games(&mut self, records: &[GameRecord], label_name: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for record in records {
            upsert_on(&tx, record, label_name)?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Read the whole table into memory
    pub fn load_games(&self, label_name: &str) -> Result<GameDataset> {
        let columns = self.columns()?;
        for required in FeatureVector::NAMES.into_iter().chain(["game_date"]) {
            if !columns.iter().any(|c| c.as_str() == required) {
                return Err(HoopsError::DatasetUnavailable(format!(
                    "feature store lacks column {}",
                    required
                )));
            }
        }

        let name_home = columns.iter().find(|c| c.starts_with(NAME_HOME_PREFIX));
        let name_away = columns.iter().find(|c| c.starts_with(NAME_AWAY_PREFIX));
        let names = match (name_home, name_away) {
            (Some(h), Some(a)) => Some((h.clone(), a.clone())),
            _ => None,
        };
        let has_label = columns.iter().any(|c| c.as_str() == label_name);

        let mut select = vec![
            "game_date".to_string(),
            "team_code_home".to_string(),
            "team_code_away".to_string(),
            "day_code".to_string(),
        ];
        if let Some((h, a)) = &names {
            select.push(quote_ident(h));
            select.push(quote_ident(a));
        }
        if has_label {
            select.push(quote_ident(label_name));
        }
        let query = format!("SELECT {} FROM games ORDER BY game_date", select.join(", "));

        let mut stmt = self.conn.prepare(&query)?;
        let raw = stmt
            .query_map([], |row| {
                let mut idx = 4;
                let (home_name, away_name) = if names.is_some() {
                    idx += 2;
                    (row.get::<_, Option<String>>(4)?, row.get::<_, Option<String>>(5)?)
                } else {
                    (None, None)
                };
                let label = if has_label { Some(row.get::<_, Value>(idx)?) } else { None };
                Ok(RawGame {
                    date: row.get(0)?,
                    code_home: row.get(1)?,
                    code_away: row.get(2)?,
                    day_code: row.get(3)?,
                    home_name,
                    away_name,
                    label,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let games = raw
            .into_iter()
            .map(RawGame::into_record)
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Loaded {} games from feature store (names: {}, label '{}': {})",
            games.len(),
            names.is_some(),
            label_name,
            has_label
        );

        let naming = if names.is_some() {
            TeamNaming::Names
        } else {
            TeamNaming::Codes
        };
        Ok(GameDataset::new(games, naming))
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let team_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM (SELECT team_code_home AS t FROM games
                                   UNION SELECT team_code_away FROM games)",
            [],
            |row| row.get(0),
        )?;

        let min_date: Option<String> = self
            .conn
            .query_row("SELECT MIN(game_date) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        let max_date: Option<String> = self
            .conn
            .query_row("SELECT MAX(game_date) FROM games", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            team_count: team_count as usize,
            game_count: game_count as usize,
            earliest_game: min_date.and_then(|s| parse_game_date(&s).ok()),
            latest_game: max_date.and_then(|s| parse_game_date(&s).ok()),
        })
    }
}

fn upsert_on(conn: &Connection, record: &GameRecord, label_name: &str) -> Result<()> {
    conn.execute(
        &format!(
            r#"
            INSERT INTO games (game_date, team_name_home, team_name_away,
                               team_code_home, team_code_away, day_code, {label})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(game_date, team_code_home, team_code_away) DO UPDATE SET
                team_name_home = COALESCE(excluded.team_name_home, team_name_home),
                team_name_away = COALESCE(excluded.team_name_away, team_name_away),
                day_code = excluded.day_code,
                {label} = COALESCE(excluded.{label}, {label})
            "#,
            label = quote_ident(label_name)
        ),
        params![
            iso(record.date),
            record.home.name,
            record.away.name,
            record.features.team_code_home,
            record.features.team_code_away,
            record.features.day_code,
            record.home_won.map(|w| w as i64),
        ],
    )?;
    Ok(())
}

/// Row as stored, before validation
struct RawGame {
    date: String,
    code_home: i64,
    code_away: i64,
    day_code: i64,
    home_name: Option<String>,
    away_name: Option<String>,
    label: Option<Value>,
}

impl RawGame {
    fn into_record(self) -> Result<GameRecord> {
        let date: NaiveDate = parse_game_date(&self.date)
            .map_err(|_| HoopsError::Parse(format!("bad game_date '{}' in feature store", self.date)))?;
        let day_code = u8::try_from(self.day_code)
            .ok()
            .filter(|d| *d <= 6)
            .ok_or_else(|| HoopsError::DataIntegrity(format!("day_code {} on {}", self.day_code, self.date)))?;
        let home_won = match self.label {
            Some(v) => label_from_value(&v)?,
            None => None,
        };
        Ok(GameRecord {
            date,
            home: TeamRef::new(self.code_home, self.home_name),
            away: TeamRef::new(self.code_away, self.away_name),
            features: FeatureVector::new(self.code_home, self.code_away, day_code),
            home_won,
        })
    }
}

fn label_from_value(value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(*i != 0)),
        Value::Real(r) => Ok(Some(*r >= 0.5)),
        Value::Text(t) => super::csv_file::parse_label(t),
        Value::Blob(_) => Err(HoopsError::Parse("binary label value".to_string())),
    }
}

/// Double-quote an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub team_count: usize,
    pub game_count: usize,
    pub earliest_game: Option<NaiveDate>,
    pub latest_game: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, date};

    fn seeded() -> Database {
        let mut db = Database::in_memory().unwrap();
        db.init_schema("home_win").unwrap();
        db.upsert_games(&fixtures::records(), "home_win").unwrap();
        db
    }

    #[test]
    fn test_empty_store() {
        let db = Database::in_memory().unwrap();
        db.init_schema("home_win").unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 0);
        assert_eq!(stats.team_count, 0);
        assert!(stats.earliest_game.is_none());
    }

    #[test]
    fn test_missing_table() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.load_games("home_win"),
            Err(HoopsError::DatasetUnavailable(_))
        ));
    }

    #[test]
    fn test_roundtrip_games() {
        let db = seeded();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.game_count, 5);
        assert_eq!(stats.team_count, 3);
        assert_eq!(stats.earliest_game, Some(date(2023, 11, 1)));
        assert_eq!(stats.latest_game, Some(date(2024, 12, 25)));

        let ds = db.load_games("home_win").unwrap();
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.naming(), TeamNaming::Names);
        let row = ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().unwrap();
        assert_eq!(row.features, FeatureVector::new(12, 7, 2));
        assert_eq!(row.home_won, Some(true));
        let unlabelled = ds.find_row("DEN", "MIA", date(2024, 3, 10)).unwrap().unwrap();
        assert_eq!(unlabelled.home_won, None);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut db = seeded();
        db.upsert_games(&fixtures::records(), "home_win").unwrap();
        assert_eq!(db.get_stats().unwrap().game_count, 5);
    }

    #[test]
    fn test_label_column_absent() {
        let db = seeded();
        let ds = db.load_games("won").unwrap();
        assert_eq!(ds.labelled_count(), 0);
    }

    #[test]
    fn test_codes_only_store() {
        let db = Database::in_memory().unwrap();
        db.conn
            .execute_batch(
                "CREATE TABLE games (game_date TEXT, team_code_home INTEGER,
                                     team_code_away INTEGER, day_code INTEGER);
                 INSERT INTO games VALUES ('2024-12-25', 12, 7, 2);",
            )
            .unwrap();
        let ds = db.load_games("home_win").unwrap();
        assert_eq!(ds.naming(), TeamNaming::Codes);
        assert_eq!(ds.teams(), vec!["7", "12"]);
    }

    #[test]
    fn test_blank_name_cell_keeps_names() {
        let db = seeded();
        db.conn
            .execute_batch("UPDATE games SET team_name_away = NULL WHERE game_date = '2024-02-02'")
            .unwrap();
        let ds = db.load_games("home_win").unwrap();
        assert_eq!(ds.naming(), TeamNaming::Names);
        assert_eq!(ds.available_dates("DEN", "MIA").len(), 3);
    }

    #[test]
    fn test_bad_day_code() {
        let db = Database::in_memory().unwrap();
        db.conn
            .execute_batch(
                "CREATE TABLE games (game_date TEXT, team_code_home INTEGER,
                                     team_code_away INTEGER, day_code INTEGER);
                 INSERT INTO games VALUES ('2024-12-25', 12, 7, 9);",
            )
            .unwrap();
        assert!(matches!(
            db.load_games("home_win"),
            Err(HoopsError::DataIntegrity(_))
        ));
    }
}
