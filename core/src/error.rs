use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("number of mines cannot be negative ({num_mines})")]
    NegativeMines { num_mines: isize },
    #[error("too many mines ({num_mines}) for grid size ({grid_size})")]
    TooManyMines { num_mines: isize, grid_size: usize },
    #[error("grid of {width}x{height} cells is too large")]
    GridTooLarge { width: usize, height: usize },
    #[error("position ({x}, {y}) is out of bounds (max: {width}, {height})")]
    OutOfBounds {
        x: isize,
        y: isize,
        width: usize,
        height: usize,
    },
    #[error("mine hit")]
    MineHit,
    #[error("game already ended, no new moves are accepted")]
    GameOver,
}

impl GameError {
    /// A mine hit ends the game; every other variant rejects the input.
    pub fn is_mine_hit(&self) -> bool {
        matches!(self, GameError::MineHit)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
