//! Delimited export of the feature table
//!
//! Fallback source when the SQLite store is absent. First line is a header;
//! fields may be double-quoted.

use std::collections::HashMap;
use std::path::Path;

use super::dataset::{GameDataset, TeamNaming};
use crate::features::parse_game_date;
use crate::{FeatureVector, GameRecord, HoopsError, Result, TeamRef};

/// Load a CSV feature table
pub fn load_csv<P: AsRef<Path>>(path: P, label_name: &str) -> Result<GameDataset> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let ds = parse_csv(&content, label_name)?;
    log::info!("Loaded {} games from {}", ds.len(), path.display());
    Ok(ds)
}

/// Parse CSV text into a dataset
pub fn parse_csv(content: &str, label_name: &str) -> Result<GameDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(HoopsError::DatasetUnavailable("CSV file is empty".to_string()));
    }
    let index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let column = |name: &str| {
        index.get(name).copied().ok_or_else(|| {
            HoopsError::DatasetUnavailable(format!("CSV lacks column {}", name))
        })
    };
    let date_col = column("game_date")?;
    let home_col = column("team_code_home")?;
    let away_col = column("team_code_away")?;
    let day_col = column("day_code")?;

    let prefixed = |prefix: &str| header.iter().position(|h| h.starts_with(prefix));
    let name_cols = match (prefixed("team_name_home"), prefixed("team_name_away")) {
        (Some(h), Some(a)) => Some((h, a)),
        _ => None,
    };
    let label_col = index.get(label_name).copied();

    let mut games = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line_no = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| -> Result<&str> {
            record.get(i).ok_or_else(|| {
                HoopsError::Parse(format!("line {}: expected {} fields", line_no, header.len()))
            })
        };

        let date = parse_game_date(field(date_col)?)
            .map_err(|e| HoopsError::Parse(format!("line {}: {}", line_no, e)))?;
        let code_home = parse_int(field(home_col)?, line_no)?;
        let code_away = parse_int(field(away_col)?, line_no)?;
        let day_code = u8::try_from(parse_int(field(day_col)?, line_no)?)
            .ok()
            .filter(|d| *d <= 6)
            .ok_or_else(|| {
                HoopsError::DataIntegrity(format!("line {}: day_code out of range", line_no))
            })?;

        let (home_name, away_name) = match name_cols {
            Some((h, a)) => (non_empty(field(h)?), non_empty(field(a)?)),
            None => (None, None),
        };
        let home_won = match label_col {
            Some(i) => parse_label(field(i)?)?,
            None => None,
        };

        games.push(GameRecord {
            date,
            home: TeamRef::new(code_home, home_name),
            away: TeamRef::new(code_away, away_name),
            features: FeatureVector::new(code_home, code_away, day_code),
            home_won,
        });
    }

    let naming = if name_cols.is_some() {
        TeamNaming::Names
    } else {
        TeamNaming::Codes
    };
    Ok(GameDataset::new(games, naming))
}

fn csv_error(e: csv::Error) -> HoopsError {
    HoopsError::Parse(format!("malformed CSV: {}", e))
}

/// Outcome label: 1/0, 1.0/0.0, true/false; empty means unknown
pub fn parse_label(raw: &str) -> Result<Option<bool>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match raw.to_lowercase().as_str() {
        "true" => return Ok(Some(true)),
        "false" => return Ok(Some(false)),
        _ => {}
    }
    raw.parse::<f64>()
        .map(|v| Some(v >= 0.5))
        .map_err(|_| HoopsError::Parse(format!("bad label value '{}'", raw)))
}

fn parse_int(raw: &str, line_no: u64) -> Result<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .or_else(|_| {
            // Pandas exports integer columns with NaNs as floats
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0)
                .map(|v| v as i64)
                .ok_or(())
        })
        .map_err(|_| HoopsError::Parse(format!("line {}: '{}' is not an integer", line_no, raw)))
}

fn non_empty(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::date;

    const SAMPLE: &str = "\
game_date,team_name_home,team_name_away,team_code_home,team_code_away,day_code,home_win
2024-12-25 00:00:00,DEN,MIA,12,7,2,1
2023-11-01,DEN,MIA,12,7,2,0
2024-01-15,MIA,DEN,7,12,0,0.0
2024-03-10,\"DEN\",MIA,12,7,6,
";

    #[test]
    fn test_parse_sample() {
        let ds = parse_csv(SAMPLE, "home_win").unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.naming(), TeamNaming::Names);
        let row = ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().unwrap();
        assert_eq!(row.features, FeatureVector::new(12, 7, 2));
        assert_eq!(row.home_won, Some(true));
        let row = ds.find_row("DEN", "MIA", date(2024, 3, 10)).unwrap().unwrap();
        assert_eq!(row.home_won, None);
        assert_eq!(ds.labelled_count(), 3);
    }

    #[test]
    fn test_codes_only() {
        let csv = "game_date,team_code_home,team_code_away,day_code\n2024-12-25,12,7,2\n";
        let ds = parse_csv(csv, "home_win").unwrap();
        assert_eq!(ds.naming(), TeamNaming::Codes);
        assert_eq!(ds.available_date_strings("12", "7"), vec!["2024-12-25"]);
    }

    #[test]
    fn test_missing_column() {
        let csv = "game_date,team_code_home,day_code\n2024-12-25,12,2\n";
        assert!(matches!(
            parse_csv(csv, "home_win"),
            Err(HoopsError::DatasetUnavailable(_))
        ));
        assert!(parse_csv("", "home_win").is_err());
    }

    #[test]
    fn test_bad_rows() {
        let short = "game_date,team_code_home,team_code_away,day_code\n2024-12-25,12\n";
        assert!(matches!(parse_csv(short, "x"), Err(HoopsError::Parse(_))));

        let bad_date = "game_date,team_code_home,team_code_away,day_code\nyesterday,12,7,2\n";
        assert!(matches!(parse_csv(bad_date, "x"), Err(HoopsError::Parse(_))));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "game_date,team_name_home,team_name_away,team_code_home,team_code_away,day_code\r\n\
                   2024-12-25,\"Denver, CO\",\"Miami \"\"Heat\"\"\",12,7,2\r\n";
        let ds = parse_csv(csv, "home_win").unwrap();
        assert_eq!(ds.teams(), vec!["Denver, CO", "Miami \"Heat\""]);
    }

    #[test]
    fn test_blank_name_cell_keeps_names() {
        let csv = "\
game_date,team_name_home,team_name_away,team_code_home,team_code_away,day_code
2024-12-25,DEN,MIA,12,7,2
2024-01-15,MIA,,7,12,0
";
        let ds = parse_csv(csv, "home_win").unwrap();
        assert_eq!(ds.naming(), TeamNaming::Names);
        assert_eq!(ds.available_date_strings("DEN", "MIA"), vec!["2024-12-25"]);
        assert!(ds.find_row("DEN", "MIA", date(2024, 12, 25)).unwrap().is_some());
        assert!(ds.teams().contains(&"DEN".to_string()));
    }

    #[test]
    fn test_parse_label_values() {
        assert_eq!(parse_label("1").unwrap(), Some(true));
        assert_eq!(parse_label("0.0").unwrap(), Some(false));
        assert_eq!(parse_label("True").unwrap(), Some(true));
        assert_eq!(parse_label("").unwrap(), None);
        assert!(parse_label("maybe").is_err());
    }
}
