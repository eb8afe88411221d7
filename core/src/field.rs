use std::{fmt, mem};

use rand::Rng;
use tracing::debug;

use crate::{
    cell::Cell,
    error::{GameError, Result},
};

/// A rectangular minefield.
///
/// Cells are stored row-major, the cell at `(x, y)` lives at `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    num_mines: usize,
    // Mines currently carrying a flag, not the total number of flags.
    num_flagged_mines: usize,
}

/// Number of cells in a `width` x `height` grid, provided the cells fit in a
/// single allocation.
fn grid_size(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .filter(|&size| {
            size.checked_mul(mem::size_of::<Cell>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(GameError::GridTooLarge { width, height })
}

fn validate(width: usize, height: usize, num_mines: isize) -> Result<(usize, usize)> {
    let num_mines =
        usize::try_from(num_mines).map_err(|_| GameError::NegativeMines { num_mines })?;

    let grid_size = grid_size(width, height)?;

    if num_mines > grid_size {
        return Err(GameError::TooManyMines {
            num_mines: num_mines as isize,
            grid_size,
        });
    }

    Ok((num_mines, grid_size))
}

/// Picks exactly `num_mines` distinct cells: every cell becomes a mine with
/// probability `mines_left / cells_left`.
fn generate_mines<R: Rng>(grid_size: usize, num_mines: usize, rng: &mut R) -> Vec<bool> {
    let mut mines = Vec::with_capacity(grid_size);

    let mut mines_left = num_mines;
    for cells_left in (1..=grid_size).rev() {
        let value = mines_left > 0 && rng.random_range(0..cells_left) < mines_left;
        mines.push(value);
        if value {
            mines_left -= 1;
        }
    }

    mines
}

fn count_adjacent_mines(mines: &[bool], index: usize, width: usize, height: usize) -> u8 {
    let x = index % width;
    let y = index / width;
    let mut count = 0;

    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }

            let new_x = x as isize + dx;
            let new_y = y as isize + dy;

            if new_x >= 0 && new_x < width as isize && new_y >= 0 && new_y < height as isize {
                let adj_index = (new_x as usize) + (new_y as usize) * width;
                if mines[adj_index] {
                    count += 1;
                }
            }
        }
    }

    count
}

impl Field {
    /// Creates a field with `num_mines` mines placed by the thread-local RNG.
    pub fn new(width: usize, height: usize, num_mines: isize) -> Result<Self> {
        Self::with_rng(width, height, num_mines, &mut rand::rng())
    }

    /// Creates a field with mines placed by `rng`. The same seed gives the
    /// same board.
    pub fn with_rng<R: Rng>(
        width: usize,
        height: usize,
        num_mines: isize,
        rng: &mut R,
    ) -> Result<Self> {
        let (num_mines, grid_size) = validate(width, height, num_mines)?;
        let mines = generate_mines(grid_size, num_mines, rng);

        debug!("Generated {}x{} field with {} mines", width, height, num_mines);
        Ok(Self::from_layout(width, height, mines))
    }

    /// Creates a field with mines at the given `(x, y)` positions.
    /// Repeated positions hold a single mine.
    pub fn with_mines(width: usize, height: usize, positions: &[(usize, usize)]) -> Result<Self> {
        let grid_size = grid_size(width, height)?;

        let mut mines = vec![false; grid_size];
        for &(x, y) in positions {
            if x >= width || y >= height {
                return Err(GameError::OutOfBounds {
                    x: isize::try_from(x).unwrap_or(isize::MAX),
                    y: isize::try_from(y).unwrap_or(isize::MAX),
                    width,
                    height,
                });
            }
            mines[x + y * width] = true;
        }

        Ok(Self::from_layout(width, height, mines))
    }

    fn from_layout(width: usize, height: usize, mines: Vec<bool>) -> Self {
        let cells = mines
            .iter()
            .enumerate()
            .map(|(i, &is_mine)| Cell {
                is_mine,
                adjacent_mines: if is_mine {
                    0
                } else {
                    count_adjacent_mines(&mines, i, width, height)
                },
                ..Cell::default()
            })
            .collect();

        Self {
            cells,
            width,
            height,
            num_mines: mines.iter().filter(|&&mine| mine).count(),
            num_flagged_mines: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_mines(&self) -> usize {
        self.num_mines
    }

    pub fn num_flagged_mines(&self) -> usize {
        self.num_flagged_mines
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(x + y * self.width)
        } else {
            None
        }
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (0..self.height).map(move |y| &self.cells[y * self.width..(y + 1) * self.width])
    }

    /// Iterates over every cell as `(x, y, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i % self.width, i / self.width, cell))
    }

    fn index(&self, x: isize, y: isize) -> Result<usize> {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(ux), Ok(uy)) if ux < self.width && uy < self.height => Ok(ux + uy * self.width),
            _ => Err(GameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }),
        }
    }

    /// Reveals the cell at `(x, y)`. Only that cell is uncovered, even when
    /// it has no adjacent mines.
    pub fn reveal(&mut self, x: isize, y: isize) -> Result<()> {
        let index = self.index(x, y)?;
        self.cells[index].reveal_and_check()
    }

    pub fn flag(&mut self, x: isize, y: isize) -> Result<()> {
        let index = self.index(x, y)?;
        let cell = &mut self.cells[index];
        if cell.is_mine && !cell.is_flagged {
            self.num_flagged_mines += 1;
        }
        cell.flag();
        Ok(())
    }

    pub fn unflag(&mut self, x: isize, y: isize) -> Result<()> {
        let index = self.index(x, y)?;
        let cell = &mut self.cells[index];
        if cell.is_mine && cell.is_flagged {
            self.num_flagged_mines -= 1;
        }
        cell.unflag();
        Ok(())
    }

    /// The game is won once every mine carries a flag. Misplaced flags and
    /// hidden safe cells do not matter.
    pub fn is_won(&self) -> bool {
        self.num_flagged_mines == self.num_mines
    }

    /// Reveals every cell that is not flagged.
    pub fn reveal_all(&mut self) {
        for cell in &mut self.cells {
            cell.reveal();
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn rejects_negative_mines() {
        assert_eq!(
            Field::new(3, 3, -1),
            Err(GameError::NegativeMines { num_mines: -1 })
        );
    }

    #[test]
    fn full_board_is_allowed() {
        let field = Field::new(2, 2, 4).unwrap();
        assert_eq!(field.num_mines(), 4);
        assert!(field.cells().all(|(_, _, cell)| cell.is_mine()));
    }

    #[test]
    fn rejects_more_mines_than_cells() {
        assert_eq!(
            Field::new(2, 2, 5),
            Err(GameError::TooManyMines {
                num_mines: 5,
                grid_size: 4
            })
        );
    }

    #[test]
    fn rejects_overflowing_grid() {
        assert_eq!(
            Field::new(usize::MAX, 2, 0),
            Err(GameError::GridTooLarge {
                width: usize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn rejects_grid_too_large_to_allocate() {
        let width = 1usize << 62;
        assert_eq!(
            Field::new(width, 2, 0),
            Err(GameError::GridTooLarge { width, height: 2 })
        );
        assert_eq!(
            Field::with_mines(width, 2, &[]),
            Err(GameError::GridTooLarge { width, height: 2 })
        );
        assert!(matches!(
            Field::new(isize::MAX as usize, 1, 1),
            Err(GameError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn places_exact_mine_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let field = Field::with_rng(16, 16, 40, &mut rng).unwrap();
        let placed = field.cells().filter(|(_, _, cell)| cell.is_mine()).count();
        assert_eq!(placed, 40);
        assert_eq!(field.num_mines(), 40);
    }

    #[test]
    fn same_seed_same_board() {
        let a = Field::with_rng(10, 8, 12, &mut SmallRng::seed_from_u64(99)).unwrap();
        let b = Field::with_rng(10, 8, 12, &mut SmallRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacency_is_clipped_at_edges() {
        let field = Field::with_mines(3, 3, &[(0, 0), (2, 2)]).unwrap();
        assert_eq!(field.cell(1, 1).unwrap().adjacent_mines(), 2);
        assert_eq!(field.cell(1, 0).unwrap().adjacent_mines(), 1);
        assert_eq!(field.cell(2, 0).unwrap().adjacent_mines(), 0);
        assert_eq!(field.cell(0, 2).unwrap().adjacent_mines(), 0);
        assert_eq!(field.cell(0, 0).unwrap().adjacent_mines(), 0);
    }

    #[test]
    fn reveal_uncovers_only_one_cell() {
        let mut field = Field::with_mines(4, 4, &[(3, 3)]).unwrap();
        field.reveal(0, 0).unwrap();
        let revealed = field.cells().filter(|(_, _, cell)| cell.is_revealed()).count();
        assert_eq!(revealed, 1);
    }

    #[test]
    fn out_of_bounds_reveal_leaves_grid_alone() {
        let mut field = Field::with_mines(3, 2, &[(1, 1)]).unwrap();
        let before = field.clone();

        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 2), (isize::MAX, isize::MIN)] {
            assert_eq!(
                field.reveal(x, y),
                Err(GameError::OutOfBounds {
                    x,
                    y,
                    width: 3,
                    height: 2
                })
            );
        }
        assert_eq!(field, before);
    }

    #[test]
    fn flag_and_unflag_are_bounds_checked() {
        let mut field = Field::with_mines(2, 2, &[(0, 0)]).unwrap();
        assert!(matches!(field.flag(2, 0), Err(GameError::OutOfBounds { .. })));
        assert!(matches!(field.unflag(0, -1), Err(GameError::OutOfBounds { .. })));
        assert_eq!(field.num_flagged_mines(), 0);
    }

    #[test]
    fn flag_counts_only_mines() {
        let mut field = Field::with_mines(2, 2, &[(0, 0)]).unwrap();
        field.flag(1, 1).unwrap();
        assert_eq!(field.num_flagged_mines(), 0);
        assert!(!field.is_won());

        field.flag(0, 0).unwrap();
        assert_eq!(field.num_flagged_mines(), 1);
        assert!(field.is_won());
    }

    #[test]
    fn double_flag_counts_once() {
        let mut field = Field::with_mines(3, 1, &[(0, 0), (2, 0)]).unwrap();
        field.flag(0, 0).unwrap();
        field.flag(0, 0).unwrap();
        assert_eq!(field.num_flagged_mines(), 1);
        assert!(!field.is_won());

        field.unflag(0, 0).unwrap();
        field.unflag(0, 0).unwrap();
        assert_eq!(field.num_flagged_mines(), 0);
    }

    #[test]
    fn zero_mines_is_won_immediately() {
        let field = Field::new(3, 3, 0).unwrap();
        assert!(field.is_won());
    }

    #[test]
    fn reveal_all_skips_flagged_cells() {
        let mut field = Field::with_mines(2, 2, &[(0, 0)]).unwrap();
        field.flag(0, 0).unwrap();
        field.flag(1, 0).unwrap();
        field.reveal_all();

        for (x, y, cell) in field.cells() {
            assert_eq!(cell.is_revealed(), !cell.is_flagged(), "cell ({x}, {y})");
        }
        assert_eq!(field.to_string(), "FF\n11\n");
    }

    #[test]
    fn display_prints_rows() {
        let mut field = Field::with_mines(3, 2, &[(2, 1)]).unwrap();
        assert_eq!(field.to_string(), "...\n...\n");

        field.reveal(0, 0).unwrap();
        field.reveal(1, 1).unwrap();
        field.flag(2, 1).unwrap();
        assert_eq!(field.to_string(), "0..\n.1F\n");
    }

    #[test]
    fn with_mines_rejects_outside_positions() {
        assert!(matches!(
            Field::with_mines(2, 2, &[(2, 0)]),
            Err(GameError::OutOfBounds { x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn with_mines_reports_huge_positions() {
        assert_eq!(
            Field::with_mines(2, 2, &[(usize::MAX, 1)]),
            Err(GameError::OutOfBounds {
                x: isize::MAX,
                y: 1,
                width: 2,
                height: 2
            })
        );
    }

    #[test]
    fn empty_field_renders_height_lines() {
        let field = Field::new(0, 2, 0).unwrap();
        assert_eq!(field.to_string(), "\n\n");
        assert_eq!(field.rows().count(), 2);
    }
}
