use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// What a player is allowed to see of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum CellState {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

/// A single square of the minefield.
///
/// `is_mine` and `adjacent_mines` are set while the owning field is built and
/// stay fixed afterwards. Only the reveal and flag markers change during play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub(crate) is_mine: bool,
    pub(crate) is_revealed: bool,
    pub(crate) is_flagged: bool,
    pub(crate) adjacent_mines: u8,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    /// Reveals the cell. Flagged cells stay hidden.
    pub fn reveal(&mut self) {
        if self.is_flagged {
            return;
        }

        self.is_revealed = true;
    }

    /// Reveals the cell and reports a [`GameError::MineHit`] if a mine was
    /// uncovered. A flagged mine is not uncovered, so it is not a hit.
    pub fn reveal_and_check(&mut self) -> Result<()> {
        self.reveal();
        if self.is_mine && self.is_revealed {
            return Err(GameError::MineHit);
        }

        Ok(())
    }

    // Flags are allowed on revealed cells too.
    pub fn flag(&mut self) {
        self.is_flagged = true;
    }

    pub fn unflag(&mut self) {
        self.is_flagged = false;
    }

    pub fn state(&self) -> CellState {
        if self.is_flagged {
            CellState::Flagged
        } else if !self.is_revealed {
            CellState::Hidden
        } else if self.is_mine {
            CellState::Mine
        } else {
            CellState::Revealed {
                adjacent: self.adjacent_mines,
            }
        }
    }

    pub fn glyph(&self) -> char {
        match self.state() {
            CellState::Flagged => 'F',
            CellState::Hidden => '.',
            CellState::Mine => 'M',
            CellState::Revealed { adjacent } => char::from(b'0' + adjacent),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
