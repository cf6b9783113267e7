use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lottoscope::application::PredictionService;
use lottoscope::application::ml::{BoostedEnsembleTrainer, ModelStore};
use lottoscope::application::strategies::{
    DiversifiedSet, EnsembleResult, StrategyRegistry, TrainingMode,
};
use lottoscope::config::Config;
use lottoscope::domain::lottery::{Draw, LotteryConfig};
use lottoscope::domain::repositories::{DrawRepository, StrategyWeightRepository};
use lottoscope::infrastructure::csv_import::{
    parse_date, parse_numbers, read_draws_csv, retain_valid,
};
use lottoscope::infrastructure::observability::Metrics;
use lottoscope::infrastructure::persistence::{
    Database, SqliteDrawRepository, SqliteStrategyWeightRepository,
};
use lottoscope::infrastructure::simulation::SyntheticDrawGenerator;
use lottoscope::infrastructure::{InMemoryDrawRepository, InMemoryStrategyWeightRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weighted ensemble predictions for lottery draws", long_about = None)]
struct Cli {
    /// Read history from a CSV file into memory instead of the database
    #[arg(long, global = true, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use N generated draws instead of stored history
    #[arg(long, global = true)]
    synthetic: Option<usize>,

    /// Database URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    database: Option<String>,

    /// When the boosted model is trained (inline|background), overrides GBM_TRAINING_MODE
    #[arg(long, global = true)]
    training_mode: Option<TrainingMode>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Single weighted-vote prediction
    Predict,
    /// Prediction with agreement and contributor details
    Consensus,
    /// Several distinct games led by the consensus pick
    Diversify {
        /// Number of games, overrides ENSEMBLE_GAME_COUNT
        #[arg(long)]
        games: Option<usize>,
    },
    /// Import draws from CSV into the database
    Import {
        /// CSV with a `concurso,date,numbers` header
        path: PathBuf,
    },
    /// Score strategies against an actual draw and store it
    Record {
        #[arg(long)]
        concurso: u32,
        /// YYYY-MM-DD or DD/MM/YYYY
        #[arg(long)]
        date: String,
        /// Drawn numbers, e.g. 04-17-23-35-41-58
        #[arg(long)]
        numbers: String,
    },
}

struct Storage {
    draws: Arc<dyn DrawRepository>,
    weights: Arc<dyn StrategyWeightRepository>,
}

async fn open_storage(cli: &Cli, config: &Config, lottery: &LotteryConfig) -> Result<Storage> {
    let seeded = match (&cli.csv, cli.synthetic) {
        (Some(path), _) => Some(retain_valid(read_draws_csv(path)?, lottery)),
        (None, Some(count)) => {
            let mut generator = SyntheticDrawGenerator::new(
                lottery.numbers_to_draw,
                lottery.min_number,
                lottery.max_number,
            );
            if let Some(seed) = config.ensemble.seed {
                generator = generator.with_seed(seed);
            }
            info!("Generated {} synthetic draws", count);
            Some(generator.generate(count))
        }
        (None, None) => None,
    };

    if let Some(history) = seeded {
        let draws = Arc::new(InMemoryDrawRepository::new());
        for draw in &history {
            draws.save(&lottery.lottery_context, draw).await?;
        }
        return Ok(Storage {
            draws,
            weights: Arc::new(InMemoryStrategyWeightRepository::new()),
        });
    }

    let url = cli
        .database
        .clone()
        .unwrap_or_else(|| config.ensemble.database_url.clone());
    let database = Database::new(&url)
        .await
        .with_context(|| format!("Failed to open database {}", url))?;
    Ok(Storage {
        draws: Arc::new(SqliteDrawRepository::new(database.clone())),
        weights: Arc::new(SqliteStrategyWeightRepository::new(database)),
    })
}

/// Trains the boosted model on a worker thread and waits for it, so a one-shot
/// run in background mode still scores with the model.
async fn warm_model(store: &Arc<ModelStore>, lottery: &LotteryConfig, history: Vec<Draw>) -> Result<()> {
    if let Some(handle) = store.request_background_training(lottery, history) {
        tokio::task::spawn_blocking(move || handle.join())
            .await
            .context("Training wait failed")?
            .map_err(|_| anyhow::anyhow!("Training thread panicked"))?;
    }
    Ok(())
}

fn print_numbers(label: &str, numbers: &[u32]) {
    let formatted: Vec<String> = numbers.iter().map(|n| format!("{:02}", n)).collect();
    println!("{:<10} {}", label, formatted.join(" "));
}

/// Set only when every strategy failed and the numbers are a random sample.
fn degraded_note(result: &EnsembleResult) -> Option<String> {
    result.degraded.then(|| {
        format!(
            "Degraded   no strategy succeeded, numbers are a random sample (failed: {})",
            result.failed_strategies.join(", ")
        )
    })
}

fn print_consensus(result: &EnsembleResult) {
    print_numbers("Numbers", &result.numbers);
    println!(
        "Consensus  {:.1}% ({} strategies)",
        result.consensus_pct, result.participants
    );
    if let Some(note) = degraded_note(result) {
        println!("{}", note);
    }
    println!("\n{:<20} {:>8} {:>8}", "Strategy", "Matched", "Weight");
    for c in &result.top_contributors {
        println!("{:<20} {:>8} {:>8.3}", c.strategy, c.matched, c.weight);
    }
    println!("\n{:<8} {:>10}", "Number", "Agreement");
    for (number, pct) in &result.agreement {
        println!("{:<8} {:>9.1}%", number, pct);
    }
}

fn print_diversified(set: &DiversifiedSet) {
    for (i, game) in set.games.iter().enumerate() {
        print_numbers(&format!("Game {}", i + 1), game);
    }
    if set.games.len() < set.requested {
        println!(
            "Only {} of {} distinct games could be built",
            set.games.len(),
            set.requested
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .pretty();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let lottery = config.lottery_config();
    info!(
        "Lottery {}: {} of [{}, {}]",
        lottery.lottery_context, lottery.numbers_to_draw, lottery.min_number, lottery.max_number
    );

    let metrics = Metrics::new()?;
    let storage = open_storage(&cli, &config, &lottery).await?;

    if let Command::Import { path } = &cli.command {
        let draws = retain_valid(read_draws_csv(path)?, &lottery);
        for draw in &draws {
            storage.draws.save(&lottery.lottery_context, draw).await?;
        }
        let total = storage.draws.count(&lottery.lottery_context).await?;
        println!(
            "Imported {} draws, {} stored for {}",
            draws.len(),
            total,
            lottery.lottery_context
        );
        return Ok(());
    }

    let mode = cli.training_mode.unwrap_or(config.training_mode());
    let store = Arc::new(
        ModelStore::new(BoostedEnsembleTrainer::new(config.boosting_config()))
            .with_metrics(metrics.clone()),
    );
    let service = PredictionService::new(
        storage.draws.clone(),
        storage.weights.clone(),
        StrategyRegistry::standard(store.clone(), mode),
    )
    .with_default_weight(config.ensemble.default_strategy_weight)
    .with_seed(config.ensemble.seed)
    .with_metrics(metrics.clone());

    if mode == TrainingMode::Background && !matches!(cli.command, Command::Record { .. }) {
        let history = service.load_history(&lottery).await?;
        warm_model(&store, &lottery, history).await?;
    }

    match &cli.command {
        Command::Predict => {
            let numbers = service.predict(&lottery).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&numbers)?);
            } else {
                print_numbers("Numbers", &numbers);
            }
        }
        Command::Consensus => {
            let result = service.predict_with_consensus(&lottery).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_consensus(&result);
            }
        }
        Command::Diversify { games } => {
            let count = games.unwrap_or(config.ensemble.game_count);
            let set = service.predict_diversified(&lottery, count).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&set)?);
            } else {
                print_diversified(&set);
            }
        }
        Command::Record {
            concurso,
            date,
            numbers,
        } => {
            let draw = Draw::new(*concurso, parse_date(date)?, parse_numbers(numbers)?);
            if !lottery.fits(&draw) {
                anyhow::bail!("Draw {} does not fit {}", draw, lottery.lottery_context);
            }
            let updated = service.record_draw(&lottery, draw).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                println!("{:<20} {:>8} {:>10} {:>8}", "Strategy", "Weight", "Confidence", "AvgHits");
                for w in &updated {
                    println!(
                        "{:<20} {:>8.3} {:>10.2} {:>8.2}",
                        w.strategy, w.weight, w.confidence, w.avg_hits
                    );
                }
            }
        }
        Command::Import { .. } => {}
    }

    if let Some(model) = store.get(&lottery.lottery_context) {
        info!(
            "Model for {}: {} numbers, {} trees, trained on {} draws at {}",
            model.lottery_context(),
            model.len(),
            model.total_trees(),
            model.draws_used(),
            model.trained_at().format("%Y-%m-%d %H:%M:%S")
        );
    }

    if cli.metrics {
        println!("\n{}", metrics.render());
    }
    Ok(())
}
