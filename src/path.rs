use crate::grid::Cost;
use crate::grid::Grid;
use crate::grid::Position;
use crate::node::Action;
use crate::node::NodeId;
use crate::node::SearchTree;

const MAX_ELEMENTS_DISPLAYED: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridPath {
    pub start: Position,
    pub end: Position,
    pub cost: Cost,
    pub actions: Vec<Action>,
    /// Every visited position, `start` and `end` included.
    pub positions: Vec<Position>,
}

impl GridPath {
    #[inline(always)]
    pub fn new_from_start(start: Position) -> Self {
        Self {
            start,
            end: start,
            cost: 0,
            actions: vec![],
            positions: vec![start],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Positions strictly between `start` and `end`.
    pub fn intermediate(&self) -> &[Position] {
        match self.positions.len() {
            0..=2 => &[],
            n => &self.positions[1..n - 1],
        }
    }

    /// Runs sanity checks
    pub fn seems_valid(&self) -> bool {
        self.cost as usize == self.actions.len()
            && self.positions.len() == self.actions.len() + 1
            && self.positions.first() == Some(&self.start)
            && self.positions.last() == Some(&self.end)
    }

    /// Whether replaying the actions from `start` walks over free cells
    /// only and ends at `end`.
    pub fn is_valid_on(&self, grid: &Grid) -> bool {
        if !self.seems_valid() || !grid.contains(&self.start) || grid.is_blocked(&self.start) {
            return false;
        }

        let mut p = self.start;
        for (a, expected) in self.actions.iter().zip(self.positions.iter().skip(1)) {
            match grid.step(&p, *a) {
                Some(next) if !grid.is_blocked(&next) && next == *expected => p = next,
                _ => return false,
            }
        }
        p == self.end
    }
}

impl std::fmt::Display for GridPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Path({}, {}:", self.cost, self.start)?;
        for a in self.actions.iter().take(MAX_ELEMENTS_DISPLAYED) {
            write!(f, "{a}")?;
        }
        if self.actions.len() > MAX_ELEMENTS_DISPLAYED {
            write!(f, "…")?;
        }
        write!(f, ":{})", self.end)
    }
}

/// Follows parent links from `goal` back to the start node.
///
/// The walk stops at the first node with no path cost, which is the start.
#[must_use]
pub fn reconstruct(tree: &SearchTree, goal: NodeId) -> GridPath {
    let mut positions = Vec::with_capacity(tree[goal].path_cost() as usize + 1);
    let mut actions = Vec::with_capacity(tree[goal].path_cost() as usize);

    for (_, node) in tree.ancestors(goal) {
        positions.push(*node.position());
        if node.path_cost() == 0 {
            break;
        }
        if let Some(a) = node.action() {
            actions.push(a);
        }
    }
    positions.reverse();
    actions.reverse();

    let path = GridPath {
        start: positions[0],
        end: *tree[goal].position(),
        cost: tree[goal].path_cost(),
        actions,
        positions,
    };
    debug_assert!(path.seems_valid(), "Broken path {path}");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SearchNode;

    fn walk(tree: &mut SearchTree, from: NodeId, actions: &[Action], target: &Position) -> NodeId {
        let mut id = from;
        for a in actions {
            let p = tree[id].position().moved(*a).unwrap();
            let child = SearchNode::child(id, &tree[id], *a, p, target);
            id = tree.push(child);
        }
        id
    }

    #[test]
    fn reconstructs_start_to_goal() {
        let target = Position::new(2, 1);
        let mut tree = SearchTree::new();
        let start = tree.push(SearchNode::start(Position::new(0, 0), &target));
        let goal = walk(
            &mut tree,
            start,
            &[Action::East, Action::North, Action::East],
            &target,
        );

        let path = reconstruct(&tree, goal);
        assert_eq!(path.cost, 3);
        assert_eq!(path.len(), 3);
        assert_eq!(path.start, Position::new(0, 0));
        assert_eq!(path.end, target);
        assert_eq!(
            path.positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(2, 1),
            ]
        );
        assert_eq!(path.intermediate(), &[Position::new(1, 0), Position::new(1, 1)]);
        assert!(path.is_valid_on(&Grid::new_empty(3, 2)));
        assert_eq!(format!("{path}"), "Path(3, (0,0):→↑→:(2,1))");
    }

    #[test]
    fn start_is_goal() {
        let p = Position::new(1, 1);
        let mut tree = SearchTree::new();
        let start = tree.push(SearchNode::start(p, &p));

        let path = reconstruct(&tree, start);
        assert_eq!(path, GridPath::new_from_start(p));
        assert!(path.is_empty());
        assert!(path.intermediate().is_empty());
    }

    #[test]
    fn walls_invalidate_paths() {
        let target = Position::new(1, 0);
        let mut tree = SearchTree::new();
        let start = tree.push(SearchNode::start(Position::new(0, 0), &target));
        let goal = walk(&mut tree, start, &[Action::East], &target);
        let path = reconstruct(&tree, goal);

        let mut grid = Grid::new_empty(2, 1);
        assert!(path.is_valid_on(&grid));
        grid.set_wall(target);
        assert!(!path.is_valid_on(&grid));
    }
}
