//! Where obstacle maps come from.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use thiserror::Error;

use crate::grid::Cell;
use crate::grid::CellParseError;
use crate::grid::Coord;
use crate::grid::Grid;
use crate::grid::Position;

/// A grid together with the endpoints of the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    grid: Grid,
    start: Position,
    target: Position,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("The grid has no cells")]
    EmptyGrid,
    #[error("Start {0} is outside of the grid")]
    StartOutOfBounds(Position),
    #[error("Target {0} is outside of the grid")]
    TargetOutOfBounds(Position),
    #[error("Start {0} is a wall")]
    StartBlocked(Position),
    #[error("Target {0} is a wall")]
    TargetBlocked(Position),
    #[error("An arena of {width}x{height} has no room inside its border")]
    TooSmall { width: Coord, height: Coord },
    #[error("Wall density {0} is not within [0, 1]")]
    InvalidDensity(f64),
    #[error("Invalid map: {0}")]
    Parse(#[from] MapParseError),
}

impl MapLayout {
    pub fn new(grid: Grid, start: Position, target: Position) -> Result<Self, MapError> {
        if grid.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        if !grid.contains(&start) {
            return Err(MapError::StartOutOfBounds(start));
        }
        if !grid.contains(&target) {
            return Err(MapError::TargetOutOfBounds(target));
        }
        if grid.is_blocked(&start) {
            return Err(MapError::StartBlocked(start));
        }
        if grid.is_blocked(&target) {
            return Err(MapError::TargetBlocked(target));
        }

        Ok(Self {
            grid,
            start,
            target,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn start(&self) -> Position {
        self.start
    }
    pub fn target(&self) -> Position {
        self.target
    }
}

impl std::fmt::Display for MapLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (w, h) = self.grid.dimensions();
        writeln!(f, "Map({w}x{h}) (s:{}, g:{}):", self.start, self.target)?;
        for (row, cells) in self.grid.rows().enumerate() {
            let y = h - 1 - row as Coord;
            for (x, cell) in cells.iter().enumerate() {
                let p = Position::new(x as Coord, y);
                match (p == self.start, p == self.target) {
                    (true, true) => write!(f, "!")?,
                    (true, false) => write!(f, "S")?,
                    (false, true) => write!(f, "G")?,
                    (false, false) => write!(f, "{cell}")?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Produces the fixed layout a search runs over.
pub trait MapSource: std::fmt::Debug {
    fn load(&self) -> Result<MapLayout, MapError>;
}

/// The 51x31 arena with three wall segments the animated binary shows by
/// default.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultArena;

impl DefaultArena {
    pub const WIDTH: Coord = 51;
    pub const HEIGHT: Coord = 31;
    pub const START: Position = Position::new(5, 6);
    pub const TARGET: Position = Position::new(45, 25);
}

impl MapSource for DefaultArena {
    fn load(&self) -> Result<MapLayout, MapError> {
        let mut grid = Grid::new_empty(Self::WIDTH, Self::HEIGHT).with_border();

        for y in 1..16 {
            grid.set_wall(Position::new(20, y));
            grid.set_wall(Position::new(40, y));
        }
        for x in 10..20 {
            grid.set_wall(Position::new(x, 15));
        }
        for y in 15..Self::HEIGHT {
            grid.set_wall(Position::new(30, y));
        }

        MapLayout::new(grid, Self::START, Self::TARGET)
    }
}

#[derive(Debug, Error)]
pub enum MapParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("A {width}x{height} layout doesn't fit in grid coordinates")]
    TooLarge { width: usize, height: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid cell {e} found at ({x},{y})")]
    InvalidCell { e: CellParseError, x: usize, y: usize },
    #[error("No start ('S') found")]
    MissingStart,
    #[error("No target ('G') found")]
    MissingTarget,
    #[error("Second start found at {0}")]
    DuplicateStart(Position),
    #[error("Second target found at {0}")]
    DuplicateTarget(Position),
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

/// Grid dimensions for a text layout of `width` columns and `height` rows.
fn text_dimensions(width: usize, height: usize) -> Result<(Coord, Coord), MapParseError> {
    match (Coord::try_from(width), Coord::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(MapParseError::TooLarge { width, height }),
    }
}

impl std::convert::TryFrom<&str> for MapLayout {
    type Error = MapError;

    /// Parses one line per row, the first line being the top one.
    ///
    /// `#` is a wall, `.` or a space is free, `S` and `G` mark the start and
    /// the target.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let lines: Vec<&str> = s.lines().collect();
        if lines.is_empty() || lines[0].is_empty() {
            return Err(MapParseError::EmptyInput.into());
        }

        let width = lines[0].chars().count();
        let (w, h) = text_dimensions(width, lines.len())?;
        let mut grid = Grid::new_empty(w, h);
        let mut start = None;
        let mut target = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapParseError::RaggedRow {
                    row,
                    expected: width,
                    found,
                }
                .into());
            }

            // Both fit, they're below `h` and `w`.
            let y = h - 1 - row as Coord;
            for (x, ch) in line.chars().enumerate() {
                let p = Position::new(x as Coord, y);
                match ch {
                    'S' => {
                        if start.replace(p).is_some() {
                            return Err(MapParseError::DuplicateStart(p).into());
                        }
                    }
                    'G' => {
                        if target.replace(p).is_some() {
                            return Err(MapParseError::DuplicateTarget(p).into());
                        }
                    }
                    ch => {
                        let cell = Cell::try_from(ch).map_err(|e| MapParseError::InvalidCell {
                            e,
                            x,
                            y: y as usize,
                        })?;
                        grid.set(p, cell);
                    }
                }
            }
        }

        let start = start.ok_or(MapParseError::MissingStart)?;
        let target = target.ok_or(MapParseError::MissingTarget)?;
        MapLayout::new(grid, start, target)
    }
}

impl std::convert::TryFrom<&std::path::Path> for MapLayout {
    type Error = MapError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        let text = std::fs::read_to_string(p).map_err(|e| MapParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        MapLayout::try_from(text.as_str())
    }
}

/// A layout written in the text format of `MapLayout::try_from(&str)`.
#[derive(Clone, Debug)]
pub struct TextMap {
    text: String,
}

impl TextMap {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

impl MapSource for TextMap {
    fn load(&self) -> Result<MapLayout, MapError> {
        MapLayout::try_from(self.text.as_str())
    }
}

/// A text layout read from disk.
#[derive(Clone, Debug)]
pub struct FileMap {
    path: std::path::PathBuf,
}

impl FileMap {
    pub fn new<P: Into<std::path::PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl MapSource for FileMap {
    fn load(&self) -> Result<MapLayout, MapError> {
        MapLayout::try_from(self.path.as_path())
    }
}

/// A walled arena with randomly scattered interior walls.
///
/// The same seed always yields the same layout.
#[derive(Copy, Clone, Debug)]
pub struct RandomArena {
    pub width: Coord,
    pub height: Coord,
    /// Probability of an interior cell being a wall.
    pub density: f64,
    pub seed: u64,
}

impl RandomArena {
    pub fn new(width: Coord, height: Coord, density: f64, seed: u64) -> Self {
        Self {
            width,
            height,
            density,
            seed,
        }
    }
}

impl MapSource for RandomArena {
    fn load(&self) -> Result<MapLayout, MapError> {
        let (width, height) = (self.width, self.height);
        if width < 3 || height < 3 {
            return Err(MapError::TooSmall { width, height });
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(MapError::InvalidDensity(self.density));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut grid = Grid::new_empty(width, height).with_border();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                if rng.random_bool(self.density) {
                    grid.set_wall(Position::new(x, y));
                }
            }
        }

        let random_inside = |rng: &mut ChaCha8Rng| {
            Position::new(rng.random_range(1..width - 1), rng.random_range(1..height - 1))
        };
        let start = random_inside(&mut rng);
        let target = random_inside(&mut rng);
        grid.set(start, Cell::Empty);
        grid.set(target, Cell::Empty);

        MapLayout::new(grid, start, target)
    }
}
