//! The Open and Closed sets.
//!
//! Both are plain `Vec`s scanned linearly. Open is kept sorted by descending
//! evaluation so the best entry sits at the tail and pops in O(1).

use crate::grid::Cost;
use crate::grid::Position;
use crate::node::NodeId;
use crate::node::SearchNode;

/// What the frontier keeps about a node.
///
/// Carries copies of the keys so lookups don't need the `SearchTree`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontierEntry {
    pub node: NodeId,
    pub position: Position,
    /// Path cost (g).
    pub g: Cost,
    /// Evaluation (f).
    pub f: Cost,
}

impl FrontierEntry {
    pub fn new(node: NodeId, n: &SearchNode) -> Self {
        Self {
            node,
            position: *n.position(),
            g: n.path_cost(),
            f: n.evaluation(),
        }
    }
}

/// Location of an entry found by `find_by_position`.
///
/// Only valid until the list it came from is modified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Slot(usize);

#[derive(Clone, Debug, Default)]
pub struct OpenList {
    /// Descending by `f`.
    entries: Vec<FrontierEntry>,
}

impl OpenList {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(256),
        }
    }

    /// Inserts before the first entry with a strictly lower `f`.
    ///
    /// Ties end up closer to the tail than the entries already there, so
    /// among equal evaluations the newest one is extracted first.
    pub fn insert(&mut self, entry: FrontierEntry) {
        let i = self
            .entries
            .iter()
            .position(|e| e.f < entry.f)
            .unwrap_or(self.entries.len());
        self.entries.insert(i, entry);
    }

    /// Removes the entry with the lowest `f`.
    #[must_use]
    pub fn extract_best(&mut self) -> Option<FrontierEntry> {
        self.entries.pop()
    }

    pub fn peek_best(&self) -> Option<&FrontierEntry> {
        self.entries.last()
    }

    pub fn find_by_position(&self, p: &Position) -> Option<Slot> {
        self.entries.iter().position(|e| e.position == *p).map(Slot)
    }

    pub fn remove(&mut self, slot: Slot) -> FrontierEntry {
        self.entries.remove(slot.0)
    }

    pub fn get(&self, slot: Slot) -> &FrontierEntry {
        &self.entries[slot.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// From the worst (front) to the best (tail).
    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.entries.iter()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].f >= w[1].f)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClosedList {
    entries: Vec<FrontierEntry>,
}

impl ClosedList {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(256),
        }
    }

    pub fn insert(&mut self, entry: FrontierEntry) {
        self.entries.push(entry);
    }

    pub fn find_by_position(&self, p: &Position) -> Option<Slot> {
        self.entries.iter().position(|e| e.position == *p).map(Slot)
    }

    pub fn remove(&mut self, slot: Slot) -> FrontierEntry {
        self.entries.swap_remove(slot.0)
    }

    pub fn get(&self, slot: Slot) -> &FrontierEntry {
        &self.entries[slot.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.entries.iter()
    }
}

/// Which set held the position that got relaxed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Set {
    Open,
    Closed,
}

/// Outcome of offering a path of cost `g` to a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Relaxation {
    /// Neither set knows the position.
    Absent,
    /// An entry at least as cheap already exists.
    Covered { set: Set, g: Cost },
    /// A strictly costlier entry was removed and must be replaced.
    Evicted { set: Set, entry: FrontierEntry },
}

#[derive(Clone, Debug, Default)]
pub struct Frontier {
    pub(crate) open: OpenList,
    pub(crate) closed: ClosedList,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            open: OpenList::new(),
            closed: ClosedList::new(),
        }
    }

    pub fn open(&self) -> &OpenList {
        &self.open
    }

    pub fn closed(&self) -> &ClosedList {
        &self.closed
    }

    /// Offers a path of cost `g` to `p`, evicting a costlier entry if any.
    ///
    /// Open is searched before Closed. A position lives in at most one of
    /// them, so at most one entry is evicted.
    pub fn relax(&mut self, p: &Position, g: Cost) -> Relaxation {
        debug_assert!(!self.contains_in_both(p), "{p} is both open and closed");

        if let Some(slot) = self.open.find_by_position(p) {
            let existing = self.open.get(slot).g;
            if existing > g {
                let entry = self.open.remove(slot);
                return Relaxation::Evicted {
                    set: Set::Open,
                    entry,
                };
            }
            return Relaxation::Covered {
                set: Set::Open,
                g: existing,
            };
        }

        if let Some(slot) = self.closed.find_by_position(p) {
            let existing = self.closed.get(slot).g;
            if existing > g {
                let entry = self.closed.remove(slot);
                return Relaxation::Evicted {
                    set: Set::Closed,
                    entry,
                };
            }
            return Relaxation::Covered {
                set: Set::Closed,
                g: existing,
            };
        }

        Relaxation::Absent
    }

    pub fn contains_in_both(&self, p: &Position) -> bool {
        self.open.find_by_position(p).is_some() && self.closed.find_by_position(p).is_some()
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify(&self) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify(&self) {
        use rustc_hash::FxHashSet;

        assert!(self.open.is_sorted(), "Open is out of order: {:?}", self.open);

        let mut seen = FxHashSet::<Position>::default();
        for e in self.open.iter().chain(self.closed.iter()) {
            assert!(seen.insert(e.position), "{} is held twice", e.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize, x: u32, g: Cost, f: Cost) -> FrontierEntry {
        FrontierEntry {
            node: test_id(i),
            position: Position::new(x, 0),
            g,
            f,
        }
    }

    fn test_id(i: usize) -> NodeId {
        NodeId::new(i).unwrap()
    }

    #[test]
    fn open_extracts_lowest_newest_first() {
        let mut open = OpenList::new();
        open.insert(entry(0, 0, 0, 5));
        open.insert(entry(1, 1, 0, 3));
        open.insert(entry(2, 2, 0, 5));
        open.insert(entry(3, 3, 0, 4));
        assert!(open.is_sorted());

        let order: Vec<u32> = std::iter::from_fn(|| open.extract_best())
            .map(|e| e.position.x)
            .collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
        assert!(open.extract_best().is_none());
    }

    #[test]
    fn open_find_and_remove() {
        let mut open = OpenList::new();
        open.insert(entry(0, 0, 1, 5));
        open.insert(entry(1, 1, 1, 3));

        let slot = open.find_by_position(&Position::new(0, 0)).unwrap();
        assert_eq!(open.remove(slot).position.x, 0);
        assert_eq!(open.len(), 1);
        assert!(open.find_by_position(&Position::new(0, 0)).is_none());
    }

    #[test]
    fn relax_absent() {
        let mut frontier = Frontier::new();
        assert_eq!(frontier.relax(&Position::new(3, 0), 2), Relaxation::Absent);
    }

    #[test]
    fn relax_covered_by_equal_cost() {
        let mut frontier = Frontier::new();
        frontier.open.insert(entry(0, 3, 2, 6));

        assert_eq!(
            frontier.relax(&Position::new(3, 0), 2),
            Relaxation::Covered {
                set: Set::Open,
                g: 2
            }
        );
        assert_eq!(frontier.open.len(), 1);
    }

    #[test]
    fn relax_evicts_costlier_open() {
        let mut frontier = Frontier::new();
        let stale = entry(0, 3, 5, 9);
        frontier.open.insert(stale);

        match frontier.relax(&Position::new(3, 0), 2) {
            Relaxation::Evicted { set, entry } => {
                assert_eq!(set, Set::Open);
                assert_eq!(entry, stale);
                assert!(entry.g > 2);
            }
            r => panic!("Unexpected {r:?}"),
        }
        assert!(frontier.open.is_empty());
    }

    #[test]
    fn relax_reopens_closed() {
        let mut frontier = Frontier::new();
        frontier.closed.insert(entry(0, 1, 1, 4));
        frontier.closed.insert(entry(1, 3, 7, 9));

        match frontier.relax(&Position::new(3, 0), 4) {
            Relaxation::Evicted { set, entry } => {
                assert_eq!(set, Set::Closed);
                assert_eq!(entry.g, 7);
            }
            r => panic!("Unexpected {r:?}"),
        }
        assert_eq!(frontier.closed.len(), 1);
        assert_eq!(
            frontier.relax(&Position::new(1, 0), 4),
            Relaxation::Covered {
                set: Set::Closed,
                g: 1
            }
        );
    }
}
