use anyhow::Result;
use clap::{Parser, Subcommand};
use nudge_bandit::probabilities;
use nudge_core::{Genre, NudgeConfig, StoreBackend};
use nudge_store::{open_store, GenreSelectionService, MemoryScoreStore, ScoreStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(short, long, global = true, default_value = "nudge.toml")]
    config: PathBuf,

    /// Path to the score database, overrides the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Keep scores in memory for this run only
    #[arg(long, global = true, conflicts_with = "db")]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick the genre for the user's next suggestion
    Select {
        #[arg(short, long)]
        user: String,
    },
    /// Record that the user acted on a suggestion of this genre
    Reinforce {
        #[arg(short, long)]
        user: String,
        /// RELAX, MOVE, CREATIVE or MUSIC (case-insensitive)
        #[arg(short, long)]
        genre: String,
    },
    /// Print the user's raw scores and sampling probabilities
    Show {
        #[arg(short, long)]
        user: String,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Forget the user's scores
    Reset {
        #[arg(short, long)]
        user: String,
    },
    /// Select repeatedly, reinforcing whenever the favorite genre comes up
    Simulate {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        favorite: Genre,
        #[arg(short, long, default_value_t = 100)]
        rounds: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = NudgeConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    if args.memory {
        config.store.backend = StoreBackend::Memory;
    }
    config.validate()?;

    let store = connect(&config).await;
    let service = GenreSelectionService::from_config(store, &config)?;

    match args.command {
        Command::Select { user } => {
            let genre = service.select_genre(&user).await;
            println!("{}", genre);
        }
        Command::Reinforce { user, genre } => {
            let updated = service.reinforce_named(&user, &genre).await?;
            println!("{}", updated);
        }
        Command::Show { user, json } => {
            let scores = service.preferences(&user).await;
            let probs = probabilities(&scores);
            if json {
                let doc = serde_json::json!({
                    "user": user,
                    "scores": scores,
                    "probabilities": probs,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{:<10} {:>12} {:>8}", "GENRE", "SCORE", "P");
                for entry in scores.iter() {
                    println!(
                        "{:<10} {:>12.6} {:>8.4}",
                        entry.genre,
                        entry.score,
                        probs.probability(entry.genre)
                    );
                }
            }
        }
        Command::Reset { user } => {
            service.reset(&user).await?;
            println!("Reset genre scores for {}", user);
        }
        Command::Simulate {
            user,
            favorite,
            rounds,
        } => {
            let mut hits = 0usize;
            for _ in 0..rounds {
                if service.select_genre(&user).await == favorite {
                    service.reinforce_genre(&user, favorite).await?;
                    hits += 1;
                }
            }
            info!(rounds, hits, %favorite, "Simulation finished");
            println!("{} of {} selections were {}", hits, rounds, favorite);
            println!("{}", service.probabilities(&user).await);
        }
    }

    Ok(())
}

/// Open the configured backend. A database that cannot be opened degrades
/// to an in-memory store rather than aborting.
async fn connect(config: &NudgeConfig) -> Arc<dyn ScoreStore> {
    match open_store(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            warn!(
                "Failed to open score store at {}: {:#}. Falling back to memory.",
                config.store.db_path.display(),
                e
            );
            Arc::new(MemoryScoreStore::new())
        }
    }
}
