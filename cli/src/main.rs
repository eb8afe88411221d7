use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use minesweeper_core::{Game, GameParams, GameStatus};
use rand::{SeedableRng, rngs::SmallRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod play;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, help = "Field width; asked for when omitted")]
    width: Option<usize>,
    #[arg(long, help = "Field height; asked for when omitted")]
    height: Option<usize>,
    #[arg(long, allow_negative_numbers = true, help = "Number of mines; asked for when omitted")]
    mines: Option<isize>,
    #[arg(long, help = "Fix RNG seed for reproducible boards (e.g., --seed 12345)")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let width = match cli.width {
        Some(width) => width,
        None => play::prompt(&mut input, &mut output, "width")?,
    };
    let height = match cli.height {
        Some(height) => height,
        None => play::prompt(&mut input, &mut output, "height")?,
    };
    let mines = match cli.mines {
        Some(mines) => mines,
        None => play::prompt(&mut input, &mut output, "number of mines")?,
    };

    let params = GameParams {
        width,
        height,
        mines,
    };
    let mut game = match cli.seed {
        Some(seed) => {
            info!("Using fixed seed: {}", seed);
            Game::with_rng(params, &mut SmallRng::seed_from_u64(seed))
        }
        None => Game::new(params),
    }
    .context("creating field")?;

    let status = play::run(&mut game, &mut input, &mut output)?;
    info!("Game finished: {:?}", status);

    if status == GameStatus::Playing {
        writeln!(output, "Bye!")?;
    }
    output.flush()?;
    Ok(())
}
