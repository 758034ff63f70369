//! One-shot prediction example
//!
//! Loads the model bundle named in config.toml (or the default path) and
//! predicts a fixed fixture. Any failure ends the process with an error.

use hoops::app::predict_fixture;
use hoops::predict::Predictor;
use hoops::{Config, Result};

const HOME: &str = "DEN";
const AWAY: &str = "MIA";
const DATE: &str = "2024-12-25";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let config = Config::load_or_default("config.toml")?;
    let predictor = Predictor::load(&config.model.bundle_path)?;
    let prediction = predict_fixture(&predictor, HOME, AWAY, DATE)?;

    println!("{}", prediction.outcome);
    Ok(())
}
