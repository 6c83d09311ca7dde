//! gmkit - game master's command line toolkit

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gmkit::combat::{DiceRoll, InitiativeTracker};
use gmkit::encounter::Roster;
use gmkit::staff::Staff;
use gmkit::{stats, Settings};

/// Tabletop game master's toolkit
#[derive(Parser, Debug)]
#[command(name = "gmkit", version, about = "Dice, stats, initiative and staff pricing")]
struct Args {
    /// Settings file (defaults to ./gmkit.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll dice, e.g. "2d6+3"
    Roll {
        notation: DiceRoll,

        /// Number of times to roll
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },

    /// Roll a set of ability scores
    Stats {
        /// Reroll until the set is worth at least this many point-buy points
        #[arg(short, long, default_value_t = 0)]
        minimum: u32,
    },

    /// Roll hit points
    Hp {
        /// Hit die size (8 for d8)
        #[arg(short, long)]
        die: u32,

        /// Constitution score
        #[arg(short, long)]
        con: i32,

        /// Character level
        #[arg(short, long, default_value_t = 1)]
        level: u32,
    },

    /// Price a staff from a TOML definition
    Staff { file: PathBuf },

    /// Run initiative for a TOML roster
    Encounter {
        file: PathBuf,

        /// Turns to advance
        #[arg(short, long, default_value_t = 1)]
        turns: u32,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;

    // Initialize tracing
    let log_json = settings.log.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log.filter.as_str().into()),
        )
        .with((!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(log_json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .init();

    let mut rng = rand::rng();

    match args.command {
        Command::Roll { notation, times } => {
            for _ in 0..times {
                let (dice, total) = notation.roll_detailed_with(&mut rng);
                println!("{}: {:?} = {}", notation, dice, total);
            }
        }
        Command::Stats { minimum } => {
            let rolled = stats::roll_cool_stats(&mut rng, minimum)?;
            println!("{}", stats::stat_block(&rolled)?);
        }
        Command::Hp { die, con, level } => {
            if die == 0 || level == 0 {
                bail!("hit die and level must be at least 1");
            }
            println!("{}", stats::random_hit_points(&mut rng, die, con, level));
        }
        Command::Staff { file } => {
            let staff = Staff::load(&file)
                .with_context(|| format!("failed to load staff {}", file.display()))?;
            println!("{}", staff);
        }
        Command::Encounter { file, turns, json } => {
            let mut tracker: InitiativeTracker = settings.tracker();
            Roster::load(&file)
                .with_context(|| format!("failed to load roster {}", file.display()))?
                .seat(&mut tracker)?;

            for _ in 0..turns {
                tracker.advance()?;
                if !json {
                    println!("{}\n", tracker.describe());
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&tracker.snapshot())?);
            } else if turns == 0 {
                println!("{}", tracker.describe());
            }
        }
    }

    Ok(())
}
