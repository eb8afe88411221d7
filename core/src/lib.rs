//! Minesweeper game engine.
//!
//! A [`Field`] owns a grid of [`Cell`]s and implements the rules: revealing a
//! single cell, flagging and unflagging, and the win check. [`Game`] wraps a
//! field with the end-of-game handling shared by every front end.
//!
//! ```
//! use minesweeper_core::{Field, GameError};
//!
//! let mut field = Field::with_mines(3, 3, &[(1, 1)])?;
//! field.reveal(0, 0)?;
//! assert_eq!(field.cell(0, 0).unwrap().adjacent_mines(), 1);
//! assert_eq!(field.reveal(1, 1), Err(GameError::MineHit));
//! # Ok::<(), GameError>(())
//! ```

pub mod cell;
pub mod error;
pub mod field;
pub mod game;
pub mod models;

pub use cell::{Cell, CellState};
pub use error::{GameError, Result};
pub use field::Field;
pub use game::{Game, GameStatus};
pub use models::{GameParams, GameSnapshot, Move, Pos};
