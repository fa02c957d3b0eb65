use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use team_terminal::config::StoreConfig;
use team_terminal::fetch::{build_fetch_pool, load_team_bundle};
use team_terminal::persist;
use team_terminal::record_store::RecordStoreClient;
use team_terminal::state::{NewEvent, NewEventKind, NewPlayer, match_title, normalize_form_date};

#[derive(Parser)]
#[command(name = "team_sync")]
#[command(about = "Fetch team data from the record store, or add records to it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download all tables and print the normalized players and events
    Fetch {
        /// Write the bundle to this file instead of printing it
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Create a player in the record store
    AddPlayer {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Shirt number
        #[arg(long, default_value_t = 0)]
        number: u32,

        #[arg(long, default_value = "")]
        position: String,
    },

    /// Create a match in the record store
    AddMatch {
        /// Date as YYYY-MM-DD or DD/MM/YYYY
        #[arg(long)]
        date: String,

        #[arg(long)]
        opponent: String,

        #[arg(long, default_value = "")]
        time: String,

        #[arg(long, default_value = "")]
        location: String,
    },

    /// Create a training session in the record store
    AddTraining {
        /// Date as YYYY-MM-DD or DD/MM/YYYY
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "Allenamento")]
        title: String,

        #[arg(long, default_value = "")]
        time: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = StoreConfig::from_env();
    let client = RecordStoreClient::new(config.clone()).context("record store unavailable")?;

    match cli.command {
        Commands::Fetch { out } => {
            let pool = build_fetch_pool();
            let bundle = load_team_bundle(&client, &config.team_name, pool.as_ref())
                .context("fetch failed")?;
            match out {
                Some(path) => {
                    persist::save_snapshot(&path, &bundle)?;
                    log::info!("snapshot written to {}", path.display());
                }
                None => {
                    let json = serde_json::to_string_pretty(&bundle)?;
                    println!("{json}");
                }
            }
        }
        Commands::AddPlayer {
            first_name,
            last_name,
            number,
            position,
        } => {
            let created = client.create_player(&NewPlayer {
                first_name,
                last_name,
                number,
                position,
            })?;
            println!("created player {}", created.id);
        }
        Commands::AddMatch {
            date,
            opponent,
            time,
            location,
        } => {
            let event = NewEvent {
                title: match_title(&config.team_name, &opponent),
                date: parse_date(&date)?,
                time,
                location,
                kind: NewEventKind::Match { opponent },
            };
            let created = client.create_event(&event)?;
            println!("created match {}", created.id);
        }
        Commands::AddTraining {
            date,
            title,
            time,
            location,
            notes,
        } => {
            let event = NewEvent {
                title,
                date: parse_date(&date)?,
                time,
                location,
                kind: NewEventKind::Training { notes },
            };
            let created = client.create_event(&event)?;
            println!("created training {}", created.id);
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<String> {
    normalize_form_date(raw).with_context(|| format!("invalid date: {raw}"))
}
