//! NBA Home-Win Prediction CLI
//!
//! Predicts whether the home team wins from a pre-trained tree ensemble, and
//! serves an interactive form over the historical demo dataset.

use clap::{Parser, Subcommand};
use hoops::{Config, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NBA home-win prediction from a pre-trained tree ensemble", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// List teams in the historical dataset
    Teams,
    /// List dates on which a matchup was played
    Dates {
        /// Home team
        home: String,
        /// Away team
        away: String,
    },
    /// Predict any fixture from the team encoding table
    Predict {
        /// Home team abbreviation
        home: String,
        /// Away team abbreviation
        away: String,
        /// Game date (YYYY-MM-DD)
        date: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Predict a historical matchup with a decision threshold and explanation
    Matchup {
        /// Home team
        home: String,
        /// Away team
        away: String,
        /// Game date (YYYY-MM-DD)
        date: String,
        /// Decision threshold in [0.5, 0.9]; defaults to the configured one
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Serve the interactive web form
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Show feature store status
    Status,
    /// Import a CSV feature table into the store
    Import {
        /// CSV file path
        csv: String,
        /// Name of the outcome column
        #[arg(long, default_value = "home_win")]
        label: String,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Data { action } => match action {
            DataCommands::Status => commands::data_status(&config),
            DataCommands::Import { csv, label } => commands::data_import(&config, &csv, &label),
        },
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Teams => commands::teams(config),
        Commands::Dates { home, away } => commands::dates(config, &home, &away),
        Commands::Predict {
            home,
            away,
            date,
            format,
        } => commands::predict(&config, &home, &away, &date, format),
        Commands::Matchup {
            home,
            away,
            date,
            threshold,
        } => commands::matchup(config, &home, &away, &date, threshold),
        Commands::Serve { host, port } => commands::serve(config, host, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use hoops::data::{csv_file, Database};
    use hoops::model::ModelBundle;
    use hoops::predict::inference::format_prediction;
    use hoops::predict::Predictor;
    use hoops::{AppContext, HoopsError};
    use std::net::SocketAddr;
    use std::sync::Arc;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Put the model bundle at {}", config.model.bundle_path);
        println!("  2. Run 'hoops data import <features.csv>' to build the feature store");
        println!("  3. Run 'hoops predict DEN MIA 2024-12-25' to make a prediction");
        println!("  4. Run 'hoops serve' for the interactive form");

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let path = &config.data.database_path;
        if !std::path::Path::new(path).exists() {
            println!("No feature store at {}", path);
            println!("  CSV fallback: {}", config.data.csv_path);
            return Ok(());
        }

        let db = Database::open_read_only(path)?;
        let stats = db.get_stats()?;

        println!("Feature Store Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", path);
        println!("  Teams:    {}", stats.team_count);
        println!("  Games:    {}", stats.game_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_game, stats.latest_game) {
            println!("  Range:    {} to {}", earliest, latest);
        }

        Ok(())
    }

    pub fn data_import(config: &Config, csv: &str, label: &str) -> Result<()> {
        let dataset = csv_file::load_csv(csv, label)?;
        println!("Read {} games ({} with outcomes)", dataset.len(), dataset.labelled_count());

        let mut db = Database::open(&config.data.database_path)?;
        db.init_schema(label)?;
        let count = db.upsert_games(dataset.games(), label)?;
        println!("Stored {} games in {}", count, config.data.database_path);

        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let bundle = ModelBundle::load(&config.model.bundle_path)?;

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:        {}", config.model.bundle_path);
        println!("  Version:     {}", bundle.version.as_deref().unwrap_or("unversioned"));
        println!("  Trees:       {}", bundle.model.trees.len());
        println!("  Predictors:  {}", bundle.predictors.join(", "));
        println!("  Label:       {}", bundle.label_name);
        println!("  Teams:       {}", bundle.encoding.len());
        println!(
            "  Attribution: {}",
            if bundle.model.supports_path_attribution() {
                "decision path"
            } else {
                "statistical only"
            }
        );

        Ok(())
    }

    pub fn teams(config: Config) -> Result<()> {
        let ctx = AppContext::load(config)?;
        for team in ctx.teams() {
            println!("{}", team);
        }
        Ok(())
    }

    pub fn dates(config: Config, home: &str, away: &str) -> Result<()> {
        let ctx = AppContext::load(config)?;
        let dates = ctx.available_dates(home, away);
        if dates.is_empty() {
            println!("No games for {} vs {} in the dataset", home, away);
        }
        for date in dates {
            println!("{}", date);
        }
        Ok(())
    }

    pub fn predict(config: &Config, home: &str, away: &str, date: &str, format: OutputFormat) -> Result<()> {
        let predictor = Predictor::load(&config.model.bundle_path)?;
        let prediction = hoops::app::predict_fixture(&predictor, home, away, date)?;

        match format {
            OutputFormat::Table => {
                print!(
                    "{}",
                    format_prediction(
                        &prediction.home,
                        &prediction.away,
                        &prediction.date,
                        prediction.outcome,
                        prediction.probability
                    )
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "home": prediction.home,
                    "away": prediction.away,
                    "date": prediction.date,
                    "features": prediction.features,
                    "home_win_prob": prediction.probability,
                    "prediction": prediction.outcome.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }

        Ok(())
    }

    pub fn matchup(config: Config, home: &str, away: &str, date: &str, threshold: Option<f64>) -> Result<()> {
        let ctx = AppContext::load(config)?;
        log::debug!("Explanation strategy: {}", ctx.explanations.strategy_name());
        let outcome = ctx.predict_matchup(home, away, date, threshold)?;

        println!("{}", outcome.label());
        println!();
        println!("{}", outcome.explanation_markdown());

        Ok(())
    }

    pub fn serve(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
        let host = host.unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| HoopsError::Config(format!("Invalid address {}:{}: {}", host, port, e)))?;

        let ctx = Arc::new(AppContext::load(config)?);

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(hoops::server::serve(ctx, addr))
    }
}
