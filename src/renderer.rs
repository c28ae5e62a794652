//! Drawing the search as it happens.
//!
//! The search only ever emits `(position, marker)` draw requests, what they
//! look like is up to the `Renderer`.

use std::io::Write;
use std::time::Duration;

use derive_more::Display;
use owo_colors::OwoColorize;

use crate::grid::Cell;
use crate::grid::Coord;
use crate::grid::Position;
use crate::map::MapLayout;
use crate::search::SearchState;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Marker {
    #[display("&")]
    Start,
    #[display("$")]
    Target,
    /// Discovered, waiting in Open.
    #[display("^")]
    Frontier,
    /// Expanded, moved to Closed.
    #[display("*")]
    Explored,
    #[display("@")]
    Path,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DrawRequest {
    pub position: Position,
    pub marker: Marker,
}

/// Points where a renderer may slow down the animation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pace {
    /// After a node got expanded.
    Step,
    /// After a path position got drawn.
    PathPoint,
}

pub trait Renderer {
    /// Called once before the search begins.
    fn setup(&mut self, layout: &MapLayout) -> std::io::Result<()>;

    fn draw(&mut self, position: Position, marker: Marker) -> std::io::Result<()>;

    fn pause(&mut self, _pace: Pace) {}

    /// Called once the search reached a terminal state.
    fn finish(&mut self, _state: &SearchState) -> std::io::Result<()> {
        Ok(())
    }
}

/// Draws nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn setup(&mut self, _layout: &MapLayout) -> std::io::Result<()> {
        Ok(())
    }
    fn draw(&mut self, _position: Position, _marker: Marker) -> std::io::Result<()> {
        Ok(())
    }
}

/// Keeps every draw request, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<DrawRequest>,
    pub setups: usize,
    pub finished: Option<SearchState>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(&self, marker: Marker) -> impl Iterator<Item = Position> + '_ {
        self.requests
            .iter()
            .filter(move |r| r.marker == marker)
            .map(|r| r.position)
    }
}

impl Renderer for RecordingRenderer {
    fn setup(&mut self, _layout: &MapLayout) -> std::io::Result<()> {
        self.setups += 1;
        Ok(())
    }
    fn draw(&mut self, position: Position, marker: Marker) -> std::io::Result<()> {
        self.requests.push(DrawRequest { position, marker });
        Ok(())
    }
    fn finish(&mut self, state: &SearchState) -> std::io::Result<()> {
        self.finished = Some(*state);
        Ok(())
    }
}

/// Animates on an ANSI terminal.
///
/// Every cell takes two columns, `y` grows upwards. Drawing before
/// [`Renderer::setup`] is an error, the map height is only known then.
pub struct TerminalRenderer<W: Write> {
    out: W,
    height: Option<Coord>,
    colored: bool,
    step_delay: Duration,
    path_delay: Duration,
}

impl<W: Write> TerminalRenderer<W> {
    pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(20);
    pub const DEFAULT_PATH_DELAY: Duration = Duration::from_millis(10);

    pub fn new(out: W) -> Self {
        Self {
            out,
            height: None,
            colored: false,
            step_delay: Self::DEFAULT_STEP_DELAY,
            path_delay: Self::DEFAULT_PATH_DELAY,
        }
    }

    #[must_use]
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    #[must_use]
    pub fn delays(mut self, step: Duration, path: Duration) -> Self {
        self.step_delay = step;
        self.path_delay = path;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Moves the cursor to a terminal row/column (0-based).
    fn move_cursor(&mut self, column: u32, row: u32) -> std::io::Result<()> {
        write!(self.out, "\x1b[{};{}H", row + 1, column + 1)
    }

    fn height(&self) -> std::io::Result<Coord> {
        self.height
            .ok_or_else(|| std::io::Error::other("renderer not set up"))
    }

    fn move_to(&mut self, p: &Position) -> std::io::Result<()> {
        let height = self.height()?;
        if p.y >= height {
            return Err(std::io::Error::other(format!(
                "{p} is above a map of height {height}"
            )));
        }
        self.move_cursor(p.x * 2, height - 1 - p.y)
    }

    fn write_marker(&mut self, marker: Marker) -> std::io::Result<()> {
        if !self.colored {
            return write!(self.out, "{marker}");
        }
        match marker {
            Marker::Start => write!(self.out, "{}", marker.bold().blue()),
            Marker::Target => write!(self.out, "{}", marker.bold().green()),
            Marker::Frontier => write!(self.out, "{}", marker.yellow()),
            Marker::Explored => write!(self.out, "{}", marker.dimmed()),
            Marker::Path => write!(self.out, "{}", marker.bold().red()),
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn setup(&mut self, layout: &MapLayout) -> std::io::Result<()> {
        let grid = layout.grid();
        self.height = Some(grid.dimensions().1);

        // Clear and home.
        write!(self.out, "\x1b[2J\x1b[H")?;
        for row in grid.rows() {
            for cell in row {
                match cell {
                    Cell::Wall => write!(self.out, "# ")?,
                    Cell::Empty => write!(self.out, "  ")?,
                }
            }
            writeln!(self.out)?;
        }
        self.draw(layout.start(), Marker::Start)?;
        self.draw(layout.target(), Marker::Target)
    }

    fn draw(&mut self, position: Position, marker: Marker) -> std::io::Result<()> {
        self.move_to(&position)?;
        self.write_marker(marker)?;
        self.out.flush()
    }

    fn pause(&mut self, pace: Pace) {
        let delay = match pace {
            Pace::Step => self.step_delay,
            Pace::PathPoint => self.path_delay,
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    fn finish(&mut self, state: &SearchState) -> std::io::Result<()> {
        let height = self.height()?;
        self.move_cursor(0, height)?;
        match state {
            SearchState::Succeeded => writeln!(self.out, "search success")?,
            SearchState::Failed => writeln!(self.out, "search failed")?,
            SearchState::Running => {}
        }
        self.out.flush()
    }
}

impl<W: Write> std::fmt::Debug for TerminalRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("height", &self.height)
            .field("colored", &self.colored)
            .field("step_delay", &self.step_delay)
            .field("path_delay", &self.path_delay)
            .finish()
    }
}
