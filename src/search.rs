use thiserror::Error;

use crate::expander::Decision;
use crate::expander::Expander;
use crate::expander::SkipReason;
use crate::frontier::Frontier;
use crate::frontier::FrontierEntry;
use crate::frontier::Set;
use crate::grid::Grid;
use crate::grid::Position;
use crate::map::MapLayout;
use crate::node::NodeId;
use crate::node::SearchNode;
use crate::node::SearchTree;
use crate::path::GridPath;
use crate::path::reconstruct;
use crate::renderer::Marker;
use crate::renderer::NullRenderer;
use crate::renderer::Pace;
use crate::renderer::Renderer;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Succeeded,
    /// Open ran out before reaching the target.
    Failed,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Running)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(GridPath),
    Exhausted,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&GridPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::Exhausted => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Renderer failed: {0}")]
    Render(#[from] std::io::Error),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes taken out of Open.
    pub extracted: usize,
    /// Nodes pushed into Open, the start included.
    pub generated: usize,
    /// Open entries replaced by a cheaper path.
    pub relaxed: usize,
    /// Closed entries replaced by a cheaper path.
    pub reopened: usize,
    pub skipped_blocked: usize,
    pub skipped_covered: usize,
    pub max_open: usize,
}

impl SearchStats {
    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "Search Stats:")?;
        let s = size_of::<SearchNode>();
        let l = self.generated;
        writeln!(
            out,
            "  - |Nodes|:     {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let s = size_of::<FrontierEntry>();
        let l = self.max_open;
        writeln!(
            out,
            "  - max |Open|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - Expanded:    {}",
            self.extracted.separate_with_commas()
        )?;
        writeln!(
            out,
            "  - Relaxed:     {} (reopened {})",
            self.relaxed.separate_with_commas(),
            self.reopened.separate_with_commas()
        )?;
        writeln!(
            out,
            "  - Skipped:     {} walls, {} covered",
            self.skipped_blocked.separate_with_commas(),
            self.skipped_covered.separate_with_commas()
        )?;

        Ok(())
    }
}

/// One A* run over a fixed grid.
///
/// Owns the Open/Closed sets and every node created, so runs never share
/// state.
#[derive(Debug)]
pub struct SearchSession<'g> {
    grid: &'g Grid,
    start: Position,
    target: Position,
    expander: Expander<'g>,
    tree: SearchTree,
    frontier: Frontier,
    state: SearchState,
    goal: Option<NodeId>,
    stats: SearchStats,
}

impl<'g> SearchSession<'g> {
    #[must_use]
    pub fn new(grid: &'g Grid, start: Position, target: Position) -> Self {
        debug_assert!(grid.contains(&start) && grid.contains(&target));

        let mut tree = SearchTree::new();
        let mut frontier = Frontier::new();
        let id = tree.push(SearchNode::start(start, &target));
        frontier.open.insert(FrontierEntry::new(id, &tree[id]));

        Self {
            grid,
            start,
            target,
            expander: Expander::new(grid, target),
            tree,
            frontier,
            state: SearchState::Running,
            goal: None,
            stats: SearchStats {
                generated: 1,
                max_open: 1,
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn from_layout(layout: &'g MapLayout) -> Self {
        Self::new(layout.grid(), layout.start(), layout.target())
    }

    pub fn state(&self) -> SearchState {
        self.state
    }
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }
    pub fn grid(&self) -> &Grid {
        self.grid
    }
    /// The goal node, once found.
    pub fn goal(&self) -> Option<NodeId> {
        self.goal
    }

    /// The path to the target, once found.
    pub fn path(&self) -> Option<GridPath> {
        self.goal.map(|goal| reconstruct(&self.tree, goal))
    }

    /// Extracts and handles a single node.
    pub fn step<R: Renderer>(&mut self, renderer: &mut R) -> Result<SearchState, SearchError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let Some(entry) = self.frontier.open.extract_best() else {
            log::info!(
                "Search from {} to {} failed after expanding {} nodes",
                self.start,
                self.target,
                self.stats.extracted
            );
            self.state = SearchState::Failed;
            return Ok(self.state);
        };
        self.stats.extracted += 1;
        log::trace!("Extracted {} at {} (f={})", entry.node, entry.position, entry.f);

        self.frontier.closed.insert(entry);
        self.frontier.verify();

        if self.tree[entry.node].heuristic() == 0 {
            self.goal = Some(entry.node);
            self.state = SearchState::Succeeded;
            self.draw_path(renderer, entry.node)?;
            log::info!(
                "Found a path from {} to {} of cost {} after expanding {} nodes",
                self.start,
                self.target,
                entry.g,
                self.stats.extracted
            );
            return Ok(self.state);
        }

        let expansion = self
            .expander
            .expand(&mut self.tree, &mut self.frontier, entry.node);
        for successor in &expansion {
            match successor.decision {
                Decision::Skip(SkipReason::OutOfBounds) => {}
                Decision::Skip(SkipReason::Blocked) => self.stats.skipped_blocked += 1,
                Decision::Skip(SkipReason::AlreadyCovered) => self.stats.skipped_covered += 1,
                Decision::Insert => {}
                Decision::Relax { set, evicted } => match set {
                    Set::Open => self.stats.relaxed += 1,
                    Set::Closed => {
                        log::debug!("Reopened {}", evicted.position);
                        self.stats.reopened += 1
                    }
                },
            }
            if let (Some(_), Some(p)) = (successor.node, successor.position) {
                self.stats.generated += 1;
                renderer.draw(p, Marker::Frontier)?;
            }
        }
        self.stats.max_open = self.stats.max_open.max(self.frontier.open.len());

        renderer.draw(entry.position, Marker::Explored)?;
        self.draw_endpoints(renderer)?;
        renderer.pause(Pace::Step);

        Ok(self.state)
    }

    /// Steps until the search succeeds or fails.
    pub fn run<R: Renderer>(&mut self, renderer: &mut R) -> Result<SearchOutcome, SearchError> {
        while !self.step(renderer)?.is_terminal() {}
        renderer.finish(&self.state)?;

        Ok(match self.path() {
            Some(path) => SearchOutcome::Found(path),
            None => SearchOutcome::Exhausted,
        })
    }

    fn draw_endpoints<R: Renderer>(&self, renderer: &mut R) -> std::io::Result<()> {
        renderer.draw(self.start, Marker::Start)?;
        renderer.draw(self.target, Marker::Target)
    }

    /// Draws the path from the goal back to the start.
    fn draw_path<R: Renderer>(&self, renderer: &mut R, goal: NodeId) -> std::io::Result<()> {
        for (_, node) in self.tree.ancestors(goal).skip(1) {
            if node.path_cost() == 0 {
                break;
            }
            renderer.draw(*node.position(), Marker::Path)?;
            renderer.pause(Pace::PathPoint);
        }
        self.draw_endpoints(renderer)
    }
}

/// Runs a search to completion without drawing anything.
pub fn solve(grid: &Grid, start: Position, target: Position) -> SearchOutcome {
    let mut session = SearchSession::new(grid, start, target);
    match session.run(&mut NullRenderer) {
        Ok(outcome) => outcome,
        Err(SearchError::Render(_)) => unreachable!("NullRenderer never fails"),
    }
}
