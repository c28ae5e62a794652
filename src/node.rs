use derive_more::Display;
use nonmax::NonMaxUsize;

use crate::grid::Cost;
use crate::grid::Position;
use crate::grid::manhattan;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Action {
    #[display("↑")]
    North, // y++
    #[display("→")]
    East, // x++
    #[display("↓")]
    South, // y--
    #[display("←")]
    West, // x--
}

impl Action {
    /// Expansion order. It decides the animation order, not the path cost.
    pub const ALL: [Action; 4] = [Action::North, Action::East, Action::South, Action::West];
}

/// A reference to a `SearchNode` within a `SearchTree`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(NonMaxUsize);

impl NodeId {
    #[inline(always)]
    pub(crate) fn new(index: usize) -> Option<Self> {
        NonMaxUsize::new(index).map(Self)
    }
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0.get()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0.get())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchNode {
    pub(crate) position: Position,
    pub(crate) parent: Option<(NodeId, Action)>,
    /// Steps taken from the start (g).
    pub(crate) path_cost: Cost,
    /// Manhattan distance to the target (h).
    pub(crate) heuristic: Cost,
    /// `g + h` (f).
    pub(crate) evaluation: Cost,
}

impl SearchNode {
    pub fn start(position: Position, target: &Position) -> Self {
        let heuristic = manhattan(&position, target);
        Self {
            position,
            parent: None,
            path_cost: 0,
            heuristic,
            evaluation: heuristic,
        }
    }

    /// A node reached from `parent` by taking `action`.
    pub fn child(
        parent_id: NodeId,
        parent: &SearchNode,
        action: Action,
        position: Position,
        target: &Position,
    ) -> Self {
        debug_assert!(parent.position.is_adjacent(&position));
        let path_cost = parent.path_cost + 1;
        let heuristic = manhattan(&position, target);
        Self {
            position,
            parent: Some((parent_id, action)),
            path_cost,
            heuristic,
            evaluation: path_cost.saturating_add(heuristic),
        }
    }

    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.position
    }
    #[inline(always)]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent.map(|(p, _)| p)
    }
    #[inline(always)]
    pub fn action(&self) -> Option<Action> {
        self.parent.map(|(_, a)| a)
    }
    #[inline(always)]
    pub fn path_cost(&self) -> Cost {
        self.path_cost
    }
    #[inline(always)]
    pub fn heuristic(&self) -> Cost {
        self.heuristic
    }
    #[inline(always)]
    pub fn evaluation(&self) -> Cost {
        self.evaluation
    }
    #[inline(always)]
    pub fn is_start(&self) -> bool {
        self.parent.is_none()
    }
}

/// All the Search Nodes, forming a tree rooted at the start.
///
/// Append-only: nodes evicted from the frontier stay here, so the ancestor
/// chain of every live node remains valid.
#[derive(Default)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
        }
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchNode) -> NodeId {
        debug_assert!(
            node.parent().is_none_or(|p| p.index() < self.nodes.len()),
            "Parent must already be in the tree"
        );
        let id = NodeId::new(self.nodes.len()).expect("A Vec can't hold usize::MAX nodes");
        self.nodes.push(node);
        id
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks from `id` up to the root, `id` included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }
}

impl std::ops::Index<NodeId> for SearchTree {
    type Output = SearchNode;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl std::fmt::Debug for SearchTree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

pub struct Ancestors<'t> {
    tree: &'t SearchTree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = (NodeId, &'t SearchNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.tree[id];
        self.next = node.parent();
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_add_up() {
        let target = Position::new(4, 4);
        let mut tree = SearchTree::new();

        let start = SearchNode::start(Position::new(0, 0), &target);
        assert_eq!(start.path_cost(), 0);
        assert_eq!(start.heuristic(), 8);
        assert_eq!(start.evaluation(), 8);
        assert!(start.is_start());
        let start_id = tree.push(start);

        let child = SearchNode::child(
            start_id,
            &tree[start_id],
            Action::North,
            Position::new(0, 1),
            &target,
        );
        assert_eq!(child.path_cost(), 1);
        assert_eq!(child.heuristic(), 7);
        assert_eq!(child.evaluation(), 8);
        assert_eq!(child.parent(), Some(start_id));
        assert_eq!(child.action(), Some(Action::North));

        let child_id = tree.push(child);
        let chain: Vec<NodeId> = tree.ancestors(child_id).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![child_id, start_id]);
    }

    #[test]
    fn expansion_order() {
        let origin = Position::new(1, 1);
        let moved: Vec<Position> = Action::ALL
            .iter()
            .filter_map(|a| origin.moved(*a))
            .collect();
        assert_eq!(
            moved,
            vec![
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(0, 1),
            ]
        );
    }
}
