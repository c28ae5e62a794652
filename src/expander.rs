use smallvec::SmallVec;

use crate::frontier::Frontier;
use crate::frontier::FrontierEntry;
use crate::frontier::Relaxation;
use crate::frontier::Set;
use crate::grid::Grid;
use crate::grid::Position;
use crate::node::Action;
use crate::node::NodeId;
use crate::node::SearchNode;
use crate::node::SearchTree;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    OutOfBounds,
    Blocked,
    /// Open or Closed already hold a path at least as cheap.
    AlreadyCovered,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    /// First time the position is reached.
    Insert,
    /// Found a strictly cheaper path, `evicted` was dropped from `set`.
    Relax { set: Set, evicted: FrontierEntry },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Successor {
    pub action: Action,
    /// `None` when the move leaves the grid.
    pub position: Option<Position>,
    pub decision: Decision,
    /// The node pushed into Open, if any.
    pub node: Option<NodeId>,
}

impl Successor {
    pub fn is_added(&self) -> bool {
        self.node.is_some()
    }
}

pub type Expansion = SmallVec<[Successor; 4]>;

/// Generates successors of a node over a fixed grid.
#[derive(Debug)]
pub struct Expander<'g> {
    grid: &'g Grid,
    target: Position,
}

impl<'g> Expander<'g> {
    pub fn new(grid: &'g Grid, target: Position) -> Self {
        Self { grid, target }
    }

    pub fn target(&self) -> &Position {
        &self.target
    }

    /// Tries the four cardinal moves from `parent`, in `Action::ALL` order.
    ///
    /// New and relaxed successors get a node in `tree` and an entry in Open.
    pub fn expand(&self, tree: &mut SearchTree, frontier: &mut Frontier, parent: NodeId) -> Expansion {
        let mut expansion = Expansion::new();
        let g = tree[parent].path_cost() + 1;

        for action in Action::ALL {
            let from = *tree[parent].position();
            let Some(position) = self.grid.step(&from, action) else {
                expansion.push(Successor {
                    action,
                    position: None,
                    decision: Decision::Skip(SkipReason::OutOfBounds),
                    node: None,
                });
                continue;
            };

            let decision = if self.grid.is_blocked(&position) {
                Decision::Skip(SkipReason::Blocked)
            } else {
                match frontier.relax(&position, g) {
                    Relaxation::Absent => Decision::Insert,
                    Relaxation::Covered { .. } => Decision::Skip(SkipReason::AlreadyCovered),
                    Relaxation::Evicted { set, entry } => {
                        log::debug!(
                            "Relaxed {position} from {:?}: g {} -> {g}",
                            set,
                            entry.g
                        );
                        debug_assert!(g < entry.g);
                        Decision::Relax { set, evicted: entry }
                    }
                }
            };

            let node = match decision {
                Decision::Skip(_) => None,
                Decision::Insert | Decision::Relax { .. } => {
                    let child = SearchNode::child(parent, &tree[parent], action, position, &self.target);
                    let id = tree.push(child);
                    frontier.open.insert(FrontierEntry::new(id, &tree[id]));
                    Some(id)
                }
            };

            expansion.push(Successor {
                action,
                position: Some(position),
                decision,
                node,
            });
        }

        frontier.verify();
        expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tree holding only a closed start node.
    fn setup(start: Position, target: Position) -> (SearchTree, Frontier, NodeId) {
        let mut tree = SearchTree::new();
        let mut frontier = Frontier::new();
        let id = tree.push(SearchNode::start(start, &target));
        frontier.closed.insert(FrontierEntry::new(id, &tree[id]));
        (tree, frontier, id)
    }

    #[test]
    fn expands_in_fixed_order() {
        let grid = Grid::new_empty(3, 3);
        let target = Position::new(2, 2);
        let (mut tree, mut frontier, start) = setup(Position::new(1, 1), target);

        let expansion = Expander::new(&grid, target).expand(&mut tree, &mut frontier, start);
        let actions: Vec<Action> = expansion.iter().map(|s| s.action).collect();
        assert_eq!(actions, Action::ALL.to_vec());
        assert!(expansion.iter().all(|s| s.decision == Decision::Insert));
        assert_eq!(frontier.open().len(), 4);
        assert_eq!(tree.len(), 5);

        // North and East are 1 step closer to the target, f = 1 + 1.
        // East was inserted later, so it comes out first.
        let best = frontier.open.extract_best().unwrap();
        assert_eq!(best.position, Position::new(2, 1));
        assert_eq!(best.f, 2);
    }

    #[test]
    fn skips_walls_and_edges() {
        let mut grid = Grid::new_empty(2, 2);
        grid.set_wall(Position::new(1, 0));
        let target = Position::new(0, 1);
        let (mut tree, mut frontier, start) = setup(Position::new(0, 0), target);

        let expansion = Expander::new(&grid, target).expand(&mut tree, &mut frontier, start);
        let decisions: Vec<Decision> = expansion.iter().map(|s| s.decision).collect();
        assert_eq!(
            decisions,
            vec![
                Decision::Insert,
                Decision::Skip(SkipReason::Blocked),
                Decision::Skip(SkipReason::OutOfBounds),
                Decision::Skip(SkipReason::OutOfBounds),
            ]
        );
        assert_eq!(frontier.open().len(), 1);
    }

    #[test]
    fn closed_parent_is_covered() {
        let grid = Grid::new_empty(3, 1);
        let target = Position::new(2, 0);
        let (mut tree, mut frontier, start) = setup(Position::new(0, 0), target);
        let expander = Expander::new(&grid, target);

        let expansion = expander.expand(&mut tree, &mut frontier, start);
        let east = expansion[1].node.unwrap();
        let best = frontier.open.extract_best().unwrap();
        assert_eq!(best.node, east);
        frontier.closed.insert(best);

        let expansion = expander.expand(&mut tree, &mut frontier, east);
        // Going back West reaches the start, which is closed with g=0.
        assert_eq!(expansion[3].decision, Decision::Skip(SkipReason::AlreadyCovered));
        assert_eq!(expansion[1].decision, Decision::Insert);
    }

    #[test]
    fn relaxes_costlier_entries() {
        let grid = Grid::new_empty(3, 3);
        let target = Position::new(2, 2);
        let (mut tree, mut frontier, start) = setup(Position::new(1, 1), target);

        // Plant a stale, expensive path to (1,2) in Open.
        let mut stale = SearchNode::start(Position::new(1, 2), &target);
        stale.path_cost = 9;
        stale.evaluation = 9 + stale.heuristic;
        let stale_id = tree.push(stale);
        frontier.open.insert(FrontierEntry::new(stale_id, &tree[stale_id]));

        let expansion = Expander::new(&grid, target).expand(&mut tree, &mut frontier, start);
        match expansion[0].decision {
            Decision::Relax { set, evicted } => {
                assert_eq!(set, Set::Open);
                assert_eq!(evicted.node, stale_id);
                assert!(tree[expansion[0].node.unwrap()].path_cost() < evicted.g);
            }
            d => panic!("Unexpected {d:?}"),
        }
        let slot = frontier.open.find_by_position(&Position::new(1, 2)).unwrap();
        assert_eq!(frontier.open.get(slot).g, 1);
        assert!(matches!(
            frontier.relax(&Position::new(1, 2), 1),
            Relaxation::Covered { set: Set::Open, g: 1 }
        ));
    }

    #[test]
    fn reopens_costlier_closed_entries() {
        let grid = Grid::new_empty(3, 3);
        let target = Position::new(2, 2);
        let (mut tree, mut frontier, start) = setup(Position::new(1, 1), target);

        // An expensive path to (1,2) that already got expanded.
        let mut stale = SearchNode::start(Position::new(1, 2), &target);
        stale.path_cost = 9;
        stale.evaluation = 9 + stale.heuristic;
        let stale_id = tree.push(stale);
        frontier.closed.insert(FrontierEntry::new(stale_id, &tree[stale_id]));

        let expansion = Expander::new(&grid, target).expand(&mut tree, &mut frontier, start);
        let north = expansion[0];
        match north.decision {
            Decision::Relax { set, evicted } => {
                assert_eq!(set, Set::Closed);
                assert_eq!(evicted.node, stale_id);
                assert_eq!(evicted.g, 9);
            }
            d => panic!("Unexpected {d:?}"),
        }

        let p = Position::new(1, 2);
        assert!(frontier.closed().find_by_position(&p).is_none());
        let slot = frontier.open.find_by_position(&p).unwrap();
        assert_eq!(frontier.open.get(slot).node, north.node.unwrap());
        assert_eq!(frontier.open.get(slot).g, 1);
        assert!(!frontier.contains_in_both(&p));
    }
}
