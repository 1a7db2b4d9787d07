use arrayvec::ArrayVec;

use crate::grid::MAX_NEIGHBORS;
use crate::Cell;

/// Upper bound on policy-supplied long-range edges per expansion.
pub const MAX_EXTRA_CHILDREN: usize = 8;

/// Upper bound on recorded children per node: every adjacent or extra cell, each possibly paired
/// with its partial-move twin.
pub const MAX_CHILDREN: usize = 2 * (MAX_NEIGHBORS + MAX_EXTRA_CHILDREN);

/// Stable index of a node inside a path finder's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Which list a node is threaded on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ListKind {
    #[default]
    Unlisted,
    Open,
    Closed,
}

/// Which node set a node belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The cell reached with movement still available (or with no turn semantics at all).
    #[default]
    Primary,
    /// The cell reached with movement deliberately exhausted. Only the two-layer finder uses it.
    Overlay,
}

/// Opaque per-node movement bookkeeping. The engine copies it around; its meaning belongs to the
/// policy. By convention `moves` is the movement left this turn and `turn` the turn number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TurnData {
    pub moves: i32,
    pub turn: i32,
}

impl TurnData {
    pub const fn new(moves: i32, turn: i32) -> Self {
        Self { moves, turn }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) prev: Option<NodeIndex>,
    pub(crate) next: Option<NodeIndex>,
}

/// One search node. Nodes live in the arena for the lifetime of the grid; searches only rewrite
/// their costs and links.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) cell: Cell,
    pub(crate) layer: Layer,
    pub(crate) known_cost: i32,
    pub(crate) heuristic_cost: i32,
    pub(crate) total_cost: i32,
    pub(crate) list: ListKind,
    pub(crate) link: Link,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: ArrayVec<NodeIndex, MAX_CHILDREN>,
    pub(crate) turn: TurnData,
    pub(crate) on_stack: bool,
}

impl Node {
    pub(crate) fn new(cell: Cell, layer: Layer) -> Self {
        Self {
            cell,
            layer,
            known_cost: 0,
            heuristic_cost: 0,
            total_cost: 0,
            list: ListKind::Unlisted,
            link: Link::default(),
            parent: None,
            children: ArrayVec::new(),
            turn: TurnData::default(),
            on_stack: false,
        }
    }

    /// Return to the untouched state, keeping identity.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.cell, self.layer);
    }

    #[inline]
    pub(crate) fn set_costs(&mut self, known: i32, heuristic: i32) {
        self.known_cost = known;
        self.heuristic_cost = heuristic;
        self.total_cost = known.saturating_add(heuristic);
    }

    pub(crate) fn record_child(&mut self, child: NodeIndex) {
        if self.children.contains(&child) {
            return;
        }
        let pushed = self.children.try_push(child);
        debug_assert!(pushed.is_ok(), "child list bound exceeded");
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        self.cell
    }

    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    #[inline]
    pub fn known_cost(&self) -> i32 {
        self.known_cost
    }

    #[inline]
    pub fn heuristic_cost(&self) -> i32 {
        self.heuristic_cost
    }

    #[inline]
    pub fn total_cost(&self) -> i32 {
        self.total_cost
    }

    #[inline]
    pub fn list(&self) -> ListKind {
        self.list
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    pub fn turn(&self) -> TurnData {
        self.turn
    }

    pub fn view(&self) -> NodeView {
        NodeView {
            cell: self.cell,
            layer: self.layer,
            known_cost: self.known_cost,
            heuristic_cost: self.heuristic_cost,
            total_cost: self.total_cost,
            turn: self.turn,
        }
    }
}

/// Copyable snapshot of a node, handed to policy callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub cell: Cell,
    pub layer: Layer,
    pub known_cost: i32,
    pub heuristic_cost: i32,
    pub total_cost: i32,
    pub turn: TurnData,
}
