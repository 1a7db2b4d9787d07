use crate::{Cell, GridConfig, NodeView, TurnData};

/// Caller-defined search flags. The engine never interprets them; it only compares them when
/// deciding whether a previous search can be reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SearchFlags(pub u32);

impl SearchFlags {
    pub const NONE: SearchFlags = SearchFlags(0);

    pub const fn contains(self, other: SearchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: SearchFlags) -> SearchFlags {
        SearchFlags(self.0 | other.0)
    }
}

/// The query a search is answering, as seen by policy callbacks.
#[derive(Debug)]
pub struct Query<'a, C> {
    pub start: Cell,
    pub destination: Cell,
    pub flags: SearchFlags,
    pub grid: GridConfig,
    pub context: &'a C,
}

/// One candidate edge from an expanded node to a cell.
#[derive(Debug)]
pub struct Step<'a, C, F> {
    pub query: &'a Query<'a, C>,
    pub parent: NodeView,
    pub parent_facts: &'a F,
    pub to: Cell,
    pub to_facts: &'a F,
    /// True when the edge came from [`PathPolicy::extra_children`] rather than grid adjacency.
    pub long_range: bool,
}

/// How a child node's cost changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    /// First time the node was reached in this session.
    Added,
    /// A cheaper parent was found while relaxing an edge.
    Updated,
    /// A cheaper cost flowed down from an improved ancestor.
    Propagated,
}

/// List transitions reported through [`PathPolicy::list_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// The start node seeded an empty open list.
    Seeded,
    AddedToOpen,
    EnteredClosed,
}

/// Cost/validity model driving a path finder.
///
/// One implementation exists per kind of search (unit movement, trade routes, flood fills, ...).
/// The engine computes [`PathPolicy::facts`] at most once per cell per search and hands the same
/// facts to every callback touching that cell, so callbacks must be pure with respect to them.
pub trait PathPolicy {
    /// Typed per-search context (player, unit, ...). Changing it through
    /// [`crate::PathFinder::set_context`] invalidates reuse.
    type Context: Clone + PartialEq + Default;

    /// Memoized world facts about one cell.
    type Facts: Default;

    fn facts(&self, query: &Query<'_, Self::Context>, cell: Cell) -> Self::Facts;

    /// Whether an edge may be expanded at all.
    fn valid(&self, step: &Step<'_, Self::Context, Self::Facts>) -> bool;

    /// Edge cost. Must be strictly positive for any edge `valid` accepts.
    fn cost(&self, step: &Step<'_, Self::Context, Self::Facts>) -> i32;

    fn is_start_valid(&self, _query: &Query<'_, Self::Context>) -> bool {
        true
    }

    /// Reject a query up front, before any expansion.
    fn is_destination_valid(&self, _query: &Query<'_, Self::Context>) -> bool {
        true
    }

    fn is_destination(&self, query: &Query<'_, Self::Context>, node: &NodeView) -> bool {
        node.cell == query.destination
    }

    /// Estimated remaining cost. Defaulting to zero turns the search into uniform-cost search.
    fn heuristic(&self, _query: &Query<'_, Self::Context>, _from: Cell) -> i32 {
        0
    }

    /// Turn data of the start node.
    fn initial_turn(&self, _query: &Query<'_, Self::Context>) -> TurnData {
        TurnData::default()
    }

    /// Turn data a child receives when reached through `step`.
    fn turn_data(&self, step: &Step<'_, Self::Context, Self::Facts>) -> TurnData {
        step.parent.turn
    }

    fn child_added(
        &mut self,
        _query: &Query<'_, Self::Context>,
        _parent: &NodeView,
        _child: &NodeView,
        _event: ChildEvent,
    ) {
    }

    fn list_changed(
        &mut self,
        _query: &Query<'_, Self::Context>,
        _node: &NodeView,
        _event: ListEvent,
    ) {
    }

    /// Non-adjacent cells to treat as neighbours of `node` (sea lanes, portals, ...).
    ///
    /// At most [`crate::MAX_EXTRA_CHILDREN`] entries are honoured.
    fn extra_children(
        &self,
        _query: &Query<'_, Self::Context>,
        _node: &NodeView,
        _out: &mut Vec<Cell>,
    ) {
    }

    fn begin_search(&mut self, _query: &Query<'_, Self::Context>) {}

    fn end_search(&mut self, _query: &Query<'_, Self::Context>, _found: bool) {}

    /// Explicit invalidation input for state the policy owns (map version, occupancy version, ...).
    /// A previous search is only reused while this value is unchanged.
    fn signature(&self) -> u64 {
        0
    }
}

/// Extra hooks for the two-layer finder.
pub trait PartialMovePolicy: PathPolicy {
    /// Cost of one unit of movement left unused when a unit stops early.
    fn movement_weight(&self) -> i32;

    /// Whether stopping on `cell` with `turn.moves` left is a distinct, allowed state worth
    /// searching.
    fn stop_matters(
        &self,
        _query: &Query<'_, Self::Context>,
        _cell: Cell,
        _turn: TurnData,
        _facts: &Self::Facts,
    ) -> bool {
        true
    }
}
