//! Plays seeded bot games through the room engine, entirely in memory.
//!
//! Each game runs with invariant checks after every intent, so a frozen room
//! here points at a rules bug. The per-game seed is printed with every
//! report; rerun with `--seed` and `--games 1` to reproduce one.

mod bot;
mod runner;
mod summary;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use monopoly_backend::domain::{Edition, RoomSettings};
use rand::Rng;
use runner::GameSpec;
use summary::Summary;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "simulator")]
#[command(about = "Plays bot games through the room engine")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Seats per game
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u8).range(2..=8))]
    players: u8,

    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "heritage")]
    edition: EditionArg,

    /// Intents per game before it counts as stalled
    #[arg(long, default_value = "5000")]
    max_steps: u32,

    /// Write one JSON report per game to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EditionArg {
    Classic,
    Heritage,
}

impl From<EditionArg> for Edition {
    fn from(arg: EditionArg) -> Self {
        match arg {
            EditionArg::Classic => Edition::Classic,
            EditionArg::Heritage => Edition::Heritage,
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut settings = RoomSettings::for_edition(args.edition.into());
    settings.max_players = args.players;
    settings.validate()?;

    let mut output = match &args.output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    info!(games = args.games, players = args.players, base_seed, "starting simulation");
    let mut summary = Summary::default();
    for game in 0..args.games {
        let seed = base_seed.wrapping_add(u64::from(game));
        let report = runner::play(GameSpec {
            game,
            seed,
            players: args.players,
            settings: settings.clone(),
            max_steps: args.max_steps,
        })?;
        if let Some(reason) = &report.frozen_reason {
            error!(game, seed, reason = %reason, "room froze");
        }
        if let Some(out) = output.as_mut() {
            serde_json::to_writer(&mut *out, &report)?;
            out.write_all(b"\n")?;
        }
        summary.record(&report);
    }
    if let Some(mut out) = output {
        out.flush()?;
    }

    println!("base seed:      {base_seed}");
    summary.print();
    Ok(if summary.frozen() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
