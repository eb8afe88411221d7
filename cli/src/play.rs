use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use anyhow::{Context, bail};
use minesweeper_core::{Game, GameStatus, Pos};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reveal(Pos),
    Flag(Pos),
    Unflag(Pos),
    Quit,
}

fn parse_pos<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Pos, String> {
    let mut coordinate = |name: &str| {
        parts
            .next()
            .ok_or_else(|| format!("missing {name}"))?
            .parse::<isize>()
            .map_err(|e| format!("{name}: {e}"))
    };
    let x = coordinate("x")?;
    let y = coordinate("y")?;
    if parts.next().is_some() {
        return Err("too many values".to_string());
    }
    Ok(Pos { x, y })
}

/// Parses `x y`, `r x y`, `f x y`, `u x y` or `q`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace().peekable();
    match parts.peek().copied() {
        None => Err("empty input".to_string()),
        Some("q" | "quit") => Ok(Command::Quit),
        Some("r" | "reveal") => {
            parts.next();
            parse_pos(parts).map(Command::Reveal)
        }
        Some("f" | "flag") => {
            parts.next();
            parse_pos(parts).map(Command::Flag)
        }
        Some("u" | "unflag") => {
            parts.next();
            parse_pos(parts).map(Command::Unflag)
        }
        Some(_) => parse_pos(parts).map(Command::Reveal),
    }
}

/// Asks for a value until one parses. Fails once input runs out.
pub fn prompt<T, R, W>(input: &mut R, output: &mut W, label: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(output, "Enter {label}:")?;
        let mut line = String::new();
        if input.read_line(&mut line).context("reading input")? == 0 {
            bail!("input closed while waiting for {label}");
        }
        match line.trim().parse() {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(output, "Invalid {label}: {e}")?,
        }
    }
}

/// Plays until the game is decided, the player quits or input runs out.
pub fn run<R: BufRead, W: Write>(
    game: &mut Game,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<GameStatus> {
    loop {
        match game.status() {
            GameStatus::Won => {
                writeln!(output, "You Won!")?;
                return Ok(GameStatus::Won);
            }
            GameStatus::Lost => {
                writeln!(output, "You Lost!")?;
                write!(output, "{}", game.field())?;
                return Ok(GameStatus::Lost);
            }
            GameStatus::Playing => {}
        }

        writeln!(output, "---")?;
        write!(output, "{}", game.field())?;
        writeln!(output, "Enter move (x y | f x y | u x y | q):")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("reading move")? == 0 {
            return Ok(game.status());
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "Invalid move: {e}")?;
                continue;
            }
        };
        debug!("Command: {:?}", command);

        let result = match command {
            Command::Quit => return Ok(game.status()),
            Command::Reveal(pos) => game.reveal(pos),
            Command::Flag(pos) => game.flag(pos),
            Command::Unflag(pos) => game.unflag(pos),
        };
        if let Err(e) = result {
            writeln!(output, "{e}")?;
        }
    }
}
