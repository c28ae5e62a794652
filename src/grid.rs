//! Static obstacle grids.
//!
//! `y` grows upwards, so the first row of a text layout is the top row
//! (`y = height - 1`).

use derive_more::Display;
use thiserror::Error;

use crate::node::Action;

const MAX_ELEMENTS_DISPLAYED: usize = 80;

pub type Coord = u32;
pub type Cost = u32;

#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({x},{y})")]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    #[inline(always)]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// The position one step away, if it doesn't underflow.
    ///
    /// Bounds on the other side are checked by [`Grid::step`].
    #[inline(always)]
    pub fn moved(&self, action: Action) -> Option<Position> {
        #[rustfmt::skip]
        let (x, y) = match action {
            Action::North => (Some(self.x),        self.y.checked_add(1)),
            Action::East  => (self.x.checked_add(1), Some(self.y)       ),
            Action::South => (Some(self.x),        self.y.checked_sub(1)),
            Action::West  => (self.x.checked_sub(1), Some(self.y)       ),
        };

        Some(Position { x: x?, y: y? })
    }

    /// Whether `other` is exactly one cardinal step away.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

/// The distance of following straight lines.
///
/// Admissible and consistent for unit-cost 4-connected moves.
#[inline(always)]
#[must_use]
pub fn manhattan(a: &Position, b: &Position) -> Cost {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Cell {
    #[display(" ")]
    Empty,
    #[display("#")]
    Wall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for Cell {
    type Error = CellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' => Ok(Cell::Empty),
            '#' | '█' => Ok(Cell::Wall),
            ch => Err(CellParseError::InvalidCharacter(ch)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: Coord,
    height: Coord,
    /// Row-major cells, row `0` is `y = 0`.
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new_empty(width: Coord, height: Coord) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        }
    }

    /// Walls off the outermost ring of cells.
    #[must_use]
    pub fn with_border(mut self) -> Self {
        for x in 0..self.width {
            self.set_wall(Position::new(x, 0));
            self.set_wall(Position::new(x, self.height.saturating_sub(1)));
        }
        for y in 0..self.height {
            self.set_wall(Position::new(0, y));
            self.set_wall(Position::new(self.width.saturating_sub(1), y));
        }
        self
    }

    #[inline(always)]
    pub fn dimensions(&self) -> (Coord, Coord) {
        (self.width, self.height)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn contains(&self, p: &Position) -> bool {
        p.x < self.width && p.y < self.height
    }

    #[inline(always)]
    fn index(&self, p: &Position) -> usize {
        p.y as usize * self.width as usize + p.x as usize
    }

    /// Whether the cell is a wall.
    ///
    /// The grid says nothing about cells outside of it, callers must check
    /// [`Grid::contains`] first.
    #[inline(always)]
    pub fn is_blocked(&self, p: &Position) -> bool {
        debug_assert!(self.contains(p), "Queried {p} outside of {self:?}");
        self.cells[self.index(p)] == Cell::Wall
    }

    #[inline(always)]
    pub fn at(&self, p: &Position) -> Option<Cell> {
        self.contains(p).then(|| self.cells[self.index(p)])
    }

    /// Sets a cell. Positions outside the grid are ignored.
    pub fn set(&mut self, p: Position, cell: Cell) {
        if self.contains(&p) {
            let i = self.index(&p);
            self.cells[i] = cell;
        }
    }

    pub fn set_wall(&mut self, p: Position) {
        self.set(p, Cell::Wall);
    }

    /// The neighbouring position, if it lies within the grid.
    #[inline(always)]
    pub fn step(&self, p: &Position, action: Action) -> Option<Position> {
        p.moved(action).filter(|n| self.contains(n))
    }

    /// Whether every cell on the outer ring is a wall.
    pub fn is_enclosed(&self) -> bool {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return false;
        }
        let walled = |x, y| self.is_blocked(&Position::new(x, y));
        (0..w).all(|x| walled(x, 0) && walled(x, h - 1))
            && (0..h).all(|y| walled(0, y) && walled(w - 1, y))
    }

    pub fn free_cells(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Empty).count()
    }

    /// Rows from top (`y = height - 1`) to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize).rev()
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        writeln!(f, "Grid({w}x{h}):")?;
        for row in self.rows().take(MAX_ELEMENTS_DISPLAYED) {
            for cell in row.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Grid{:?}", self.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        let a = Position::new(5, 6);
        let b = Position::new(45, 25);
        assert_eq!(manhattan(&a, &b), 59);
        assert_eq!(manhattan(&b, &a), 59);
        assert_eq!(manhattan(&a, &a), 0);
    }

    #[test]
    fn steps_stay_inside() {
        let grid = Grid::new_empty(3, 2);
        let origin = Position::new(0, 0);

        assert_eq!(grid.step(&origin, Action::North), Some(Position::new(0, 1)));
        assert_eq!(grid.step(&origin, Action::East), Some(Position::new(1, 0)));
        assert_eq!(grid.step(&origin, Action::South), None);
        assert_eq!(grid.step(&origin, Action::West), None);

        let corner = Position::new(2, 1);
        assert_eq!(grid.step(&corner, Action::North), None);
        assert_eq!(grid.step(&corner, Action::East), None);
    }

    #[test]
    fn border_encloses() {
        let grid = Grid::new_empty(4, 3);
        assert!(!grid.is_enclosed());

        let grid = grid.with_border();
        assert!(grid.is_enclosed());
        assert!(grid.is_blocked(&Position::new(0, 1)));
        assert!(grid.is_blocked(&Position::new(3, 2)));
        assert!(!grid.is_blocked(&Position::new(1, 1)));
        assert_eq!(grid.free_cells(), 2);
    }

    #[test]
    fn set_outside_is_ignored() {
        let mut grid = Grid::new_empty(2, 2);
        grid.set_wall(Position::new(7, 7));
        assert_eq!(grid.free_cells(), 4);
        assert_eq!(grid.at(&Position::new(7, 7)), None);
    }

    #[test]
    fn cells_parse() {
        assert_eq!(Cell::try_from('#'), Ok(Cell::Wall));
        assert_eq!(Cell::try_from('.'), Ok(Cell::Empty));
        assert_eq!(
            Cell::try_from('x'),
            Err(CellParseError::InvalidCharacter('x'))
        );
    }

    #[test]
    fn rows_go_top_down() {
        let mut grid = Grid::new_empty(2, 2);
        grid.set_wall(Position::new(1, 1));
        let rows: Vec<_> = grid.rows().collect();
        assert_eq!(rows[0], &[Cell::Empty, Cell::Wall]);
        assert_eq!(rows[1], &[Cell::Empty, Cell::Empty]);
    }
}
