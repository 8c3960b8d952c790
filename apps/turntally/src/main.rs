//! turntally CLI: browse stored sessions, seed random games, manage the schema.

use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use migration::MigrationCommand;
use serde::Serialize;
use tracing::{error, info};
use turntally::domain::aggregate::aggregate_players;
use turntally::domain::players::{GameSetup, PlayerColor, PlayerSetup};
use turntally::domain::snapshot::SessionId;
use turntally::services::simulate::{simulate_game, SimulationConfig};
use turntally::telemetry::init_tracing;
use turntally::{
    bootstrap_db, connect_db, AppError, DbKind, SeaSessionStore, SessionConfig, SessionStore,
    SetupStore,
};

#[derive(Parser)]
#[command(name = "turntally")]
#[command(about = "Turn timer and victory point tracker for tabletop sessions")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate statistics over every completed session
    Stats,
    /// Per-player totals and turn statistics for one session
    Show { id: SessionId },
    /// Play a random game and store it
    Simulate {
        /// Number of seated players
        #[arg(short, long, default_value = "3")]
        players: usize,

        /// Upper bound on turns; the game stops at the victory threshold
        #[arg(short, long, default_value = "60")]
        turns: usize,

        /// Longest simulated turn, in seconds
        #[arg(long, default_value = "90")]
        max_turn_secs: u32,

        /// Seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Save or print a player list used to start sessions
    Setup {
        #[command(subcommand)]
        action: SetupAction,
    },
    /// Apply or inspect schema migrations
    Migrate {
        #[arg(value_enum)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand)]
enum SetupAction {
    /// Store players as NAME or NAME:COLOR, in seat order
    Save {
        key: String,
        #[arg(required = true)]
        players: Vec<String>,
    },
    Show {
        key: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MigrateDirection {
    Up,
    Down,
    Fresh,
    Status,
}

impl From<MigrateDirection> for MigrationCommand {
    fn from(d: MigrateDirection) -> Self {
        match d {
            MigrateDirection::Up => MigrationCommand::Up,
            MigrateDirection::Down => MigrationCommand::Down,
            MigrateDirection::Fresh => MigrationCommand::Fresh,
            MigrateDirection::Status => MigrationCommand::Status,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("failed to encode output: {e}")))?;
    println!("{out}");
    Ok(())
}

fn parse_player(arg: &str) -> Result<PlayerSetup, AppError> {
    let (name, color) = match arg.split_once(':') {
        Some((name, color)) => (name, Some(PlayerColor::from_str(color)?)),
        None => (arg, None),
    };
    let setup = PlayerSetup::named(name.trim());
    Ok(match color {
        Some(c) => setup.with_color(c),
        None => setup,
    })
}

fn setup_store() -> SetupStore {
    let dir = std::env::var("TURNTALLY_SETUP_DIR").unwrap_or_else(|_| ".turntally".to_string());
    SetupStore::new(dir)
}

async fn open_store() -> Result<SeaSessionStore, AppError> {
    let db = bootstrap_db(DbKind::from_env()).await?;
    Ok(SeaSessionStore::new(db))
}

async fn run(args: Args) -> Result<(), AppError> {
    match args.command {
        Command::Stats => {
            let store = open_store().await?;
            let mut completed = Vec::new();
            for summary in store.list_sessions().await? {
                if summary.completed {
                    completed.push(store.load_session(summary.id).await?);
                }
            }
            info!(sessions = completed.len(), "aggregating completed sessions");
            print_json(&aggregate_players(&completed))
        }
        Command::Show { id } => {
            #[derive(Serialize)]
            struct PlayerLine {
                name: String,
                total_vp: u32,
                turns: u32,
                average_turn_ms: u64,
                share_percent: u32,
            }

            let store = open_store().await?;
            let loaded = store.load_session(id).await?;
            let stats = loaded.stats();
            let lines: Vec<PlayerLine> = loaded
                .players
                .iter()
                .zip(stats)
                .map(|(p, s)| PlayerLine {
                    name: p.name.clone(),
                    total_vp: p.total_vp,
                    turns: s.turn_count,
                    average_turn_ms: s.average_turn_duration_ms,
                    share_percent: s.share_percent,
                })
                .collect();
            print_json(&serde_json::json!({
                "id": loaded.id,
                "completed": loaded.snapshot.completed,
                "elapsed": loaded.snapshot.elapsed,
                "players": lines,
            }))
        }
        Command::Simulate {
            players,
            turns,
            max_turn_secs,
            seed,
        } => {
            let store = open_store().await?;
            let sim = SimulationConfig {
                players,
                max_turns: turns,
                max_turn_secs,
                seed,
            };
            let report = simulate_game(&store, SessionConfig::from_env()?, &sim).await?;
            print_json(&report)
        }
        Command::Setup { action } => match action {
            SetupAction::Save { key, players } => {
                let setup = GameSetup::new(
                    players
                        .iter()
                        .map(|p| parse_player(p))
                        .collect::<Result<Vec<_>, _>>()?,
                );
                setup.validate()?;
                setup_store().save(&key, &setup).await?;
                print_json(&setup)
            }
            SetupAction::Show { key } => print_json(&setup_store().require(&key).await?),
        },
        Command::Migrate { direction } => {
            let db = connect_db(DbKind::from_env()).await?;
            migration::migrate(&db, direction.into()).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
