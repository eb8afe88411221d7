use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{GameError, Result},
    field::Field,
    models::{GameParams, GameSnapshot, Move, Pos},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Playing)
    }
}

/// A field together with the outcome of play so far.
///
/// Hitting a mine reveals the whole board and ends the game; flagging every
/// mine wins it. No further moves are accepted once the game is over.
#[derive(Debug, Clone)]
pub struct Game {
    field: Field,
    status: GameStatus,
}

impl Game {
    pub fn new(params: GameParams) -> Result<Self> {
        Field::new(params.width, params.height, params.mines).map(Self::from_field)
    }

    pub fn with_rng<R: Rng>(params: GameParams, rng: &mut R) -> Result<Self> {
        Field::with_rng(params.width, params.height, params.mines, rng).map(Self::from_field)
    }

    pub fn from_field(field: Field) -> Self {
        // Without any mines there is nothing left to flag.
        let status = if field.is_won() {
            GameStatus::Won
        } else {
            GameStatus::Playing
        };
        Self { field, status }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    fn ensure_playing(&self) -> Result<()> {
        if self.status.is_over() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    pub fn reveal(&mut self, pos: Pos) -> Result<GameStatus> {
        self.ensure_playing()?;

        match self.field.reveal(pos.x, pos.y) {
            Ok(()) => {}
            Err(GameError::MineHit) => {
                debug!("Mine hit at ({}, {}), revealing the board", pos.x, pos.y);
                self.field.reveal_all();
                self.status = GameStatus::Lost;
            }
            Err(e) => return Err(e),
        }

        Ok(self.status)
    }

    pub fn flag(&mut self, pos: Pos) -> Result<GameStatus> {
        self.ensure_playing()?;
        self.field.flag(pos.x, pos.y)?;
        self.check_won();
        Ok(self.status)
    }

    pub fn unflag(&mut self, pos: Pos) -> Result<GameStatus> {
        self.ensure_playing()?;
        self.field.unflag(pos.x, pos.y)?;
        Ok(self.status)
    }

    pub fn play(&mut self, mv: Move) -> Result<GameStatus> {
        match mv {
            Move::Reveal { pos } => self.reveal(pos),
            Move::Flag { pos } => self.flag(pos),
            Move::Unflag { pos } => self.unflag(pos),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.field.width(),
            height: self.field.height(),
            mines: self.field.num_mines(),
            status: self.status,
            field: self
                .field
                .rows()
                .map(|row| row.iter().map(|cell| cell.state()).collect())
                .collect(),
        }
    }

    fn check_won(&mut self) {
        if self.field.is_won() {
            debug!("All {} mines flagged", self.field.num_mines());
            self.status = GameStatus::Won;
        }
    }
}
