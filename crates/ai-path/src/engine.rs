use arrayvec::ArrayVec;
use tracing::{debug, trace, warn};

use crate::cache::FactCache;
use crate::grid::MAX_NEIGHBORS;
use crate::list::NodeList;
use crate::node::{Layer, ListKind, Node, NodeIndex, TurnData, MAX_EXTRA_CHILDREN};
use crate::path::{PathStep, PathSteps};
use crate::session::{CacheEpoch, SearchOptions, SearchSession, SearchState, SearchStats};
use crate::{
    Cell, ChildEvent, ConfigError, GridConfig, InvariantViolation, ListEvent, PathPolicy, Query,
    SearchFailure, SearchFlags, Step,
};

/// Node-set strategy of a [`PathFinder`], fixed at construction.
///
/// [`SingleLayer`] runs plain A*; [`crate::TwoLayer`] adds the partial-move overlay.
pub trait Layering<P: PathPolicy>: Default + Sized {
    /// A primary node entered the open list or got cheaper.
    fn primary_improved(finder: &mut PathFinder<P, Self>, node: NodeIndex);

    /// Cost and turn data of the overlay twin of a primary candidate at `cell`, if one should
    /// exist.
    fn stop_candidate(
        finder: &PathFinder<P, Self>,
        grid: GridConfig,
        cell: Cell,
        known: i32,
        turn: TurnData,
    ) -> Option<(i32, TurnData)>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLayer;

impl<P: PathPolicy> Layering<P> for SingleLayer {
    #[inline]
    fn primary_improved(_finder: &mut PathFinder<P, Self>, _node: NodeIndex) {}

    #[inline]
    fn stop_candidate(
        _finder: &PathFinder<P, Self>,
        _grid: GridConfig,
        _cell: Cell,
        _known: i32,
        _turn: TurnData,
    ) -> Option<(i32, TurnData)> {
        None
    }
}

/// A* over a persistent node grid, driven by a [`PathPolicy`].
///
/// The finder owns every node for the lifetime of the grid. Between queries it keeps the open
/// and closed lists so a follow-up query from the same start can continue where the previous one
/// stopped; see [`PathFinder::generate_path`] for when that happens.
///
/// One finder serves one caller at a time. Concurrent searches need separate finders.
pub struct PathFinder<P: PathPolicy, L: Layering<P> = SingleLayer> {
    policy: P,
    options: SearchOptions,
    grid: Option<GridConfig>,
    neighbor_table: Vec<ArrayVec<u32, MAX_NEIGHBORS>>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) facts: FactCache<P::Facts>,
    open: NodeList,
    closed: NodeList,
    stack: Vec<NodeIndex>,
    propagating: bool,
    pub(crate) session: SearchSession<P::Context>,
    best: Option<NodeIndex>,
    state: SearchState,
    epoch: CacheEpoch,
    cache_safe: bool,
    pub(crate) stats: SearchStats,
    extras: Vec<Cell>,
    _layer: L,
}

impl<P: PathPolicy> PathFinder<P, SingleLayer> {
    pub fn new(policy: P) -> Self {
        Self::build(policy)
    }
}

impl<P: PathPolicy, L: Layering<P>> PathFinder<P, L> {
    pub(crate) fn build(policy: P) -> Self {
        Self {
            policy,
            options: SearchOptions::default(),
            grid: None,
            neighbor_table: Vec::new(),
            nodes: Vec::new(),
            facts: FactCache::new(),
            open: NodeList::new(ListKind::Open),
            closed: NodeList::new(ListKind::Closed),
            stack: Vec::new(),
            propagating: false,
            session: SearchSession::default(),
            best: None,
            state: SearchState::Idle,
            epoch: CacheEpoch::default(),
            cache_safe: true,
            stats: SearchStats::default(),
            extras: Vec::new(),
            _layer: L::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
        self.neighbor_table.clear();
        if let Some(grid) = self.grid {
            if options.precompute_neighbors {
                self.build_neighbor_table(grid);
            }
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the policy.
    ///
    /// Changes that affect costs or validity must show up in [`PathPolicy::signature`], or the
    /// caller must [`PathFinder::bump_epoch`], before the next reusing query.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn grid(&self) -> Option<GridConfig> {
        self.grid
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    /// Bind the finder to a grid, allocating one node per cell.
    ///
    /// Re-initializing with an identical configuration is a no-op that keeps all search state;
    /// call [`PathFinder::deinit`] first to force a rebuild.
    pub fn initialize(&mut self, config: GridConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.grid == Some(config) {
            debug!(?config, "path finder already bound to this grid");
            return Ok(());
        }

        let cells = config.cell_count();
        self.nodes.clear();
        self.nodes
            .extend((0..cells).map(|i| Node::new(config.cell_at(i), Layer::Primary)));
        self.facts.resize(cells);
        self.neighbor_table.clear();
        if self.options.precompute_neighbors {
            self.build_neighbor_table(config);
        }
        self.grid = Some(config);
        self.clear_search_state();

        debug!(
            width = config.width,
            height = config.height,
            wrap_x = config.wrap_x,
            wrap_y = config.wrap_y,
            topology = ?config.topology,
            "path finder initialized"
        );
        Ok(())
    }

    pub fn deinit(&mut self) {
        self.grid = None;
        self.nodes = Vec::new();
        self.neighbor_table = Vec::new();
        self.facts.resize(0);
        self.clear_search_state();
    }

    fn build_neighbor_table(&mut self, grid: GridConfig) {
        self.neighbor_table = (0..grid.cell_count())
            .map(|i| {
                grid.neighbors(grid.cell_at(i))
                    .into_iter()
                    .filter_map(|n| grid.index_of(n))
                    .map(|n| n as u32)
                    .collect()
            })
            .collect();
    }

    fn clear_search_state(&mut self) {
        self.open.clear();
        self.closed.clear();
        self.stack.clear();
        self.propagating = false;
        self.best = None;
        self.state = SearchState::Idle;
        self.session.forget();
    }

    // Context & invalidation

    pub fn context(&self) -> &P::Context {
        &self.session.context
    }

    /// Replace the per-search context. A different value discards reusable state.
    pub fn set_context(&mut self, context: P::Context) {
        if context != self.session.context {
            self.session.context = context;
            self.epoch = self.epoch.next();
            trace!(epoch = self.epoch.0, "context changed");
        }
    }

    /// Make the next query start from scratch.
    pub fn force_reset(&mut self) {
        self.epoch = self.epoch.next();
    }

    /// Record that the outside world changed. Returns the new epoch.
    pub fn bump_epoch(&mut self) -> CacheEpoch {
        self.epoch = self.epoch.next();
        self.epoch
    }

    /// Adopt a caller-owned epoch counter. Any change invalidates reusable state.
    pub fn set_epoch(&mut self, epoch: CacheEpoch) {
        self.epoch = epoch;
    }

    pub fn epoch(&self) -> CacheEpoch {
        self.epoch
    }

    /// Declare whether world state may change between queries without the finder noticing
    /// (networked games). While unsafe, every query starts from scratch.
    pub fn set_cache_safe(&mut self, safe: bool) {
        self.cache_safe = safe;
        if !safe {
            self.epoch = self.epoch.next();
        }
    }

    pub fn is_cache_safe(&self) -> bool {
        self.cache_safe
    }

    fn can_reuse(&self, start: Cell, flags: SearchFlags) -> bool {
        self.cache_safe
            && self.session.reusable
            && self.session.built_under == Some(self.epoch)
            && self.session.start == start
            && self.session.flags == flags
            && self.session.signature == self.policy.signature()
    }

    // Queries

    /// Search for a path from `start` to `destination`.
    ///
    /// With `reuse` set, the previous query's lists are kept when it started from the same cell
    /// with the same flags, context, epoch and policy signature, and the context is cache-safe.
    /// Otherwise all touched nodes are reset first.
    ///
    /// Returns false when the query is malformed, rejected by the policy, or no path exists. On
    /// success the terminal node is available through [`PathFinder::last_node`] and
    /// [`PathFinder::path_steps`].
    pub fn generate_path(
        &mut self,
        start: Cell,
        destination: Cell,
        flags: SearchFlags,
        reuse: bool,
    ) -> bool {
        self.try_generate_path(start, destination, flags, reuse)
            .is_ok()
    }

    /// Like [`PathFinder::generate_path`], reporting why a query failed.
    pub fn try_generate_path(
        &mut self,
        start: Cell,
        destination: Cell,
        flags: SearchFlags,
        reuse: bool,
    ) -> Result<NodeIndex, SearchFailure> {
        let grid = self.grid.ok_or(SearchFailure::NotInitialized)?;
        if !grid.contains(start) {
            return Err(SearchFailure::StartOutOfBounds(start));
        }
        if !grid.contains(destination) {
            return Err(SearchFailure::DestinationOutOfBounds(destination));
        }
        {
            let query = Query {
                start,
                destination,
                flags,
                grid,
                context: &self.session.context,
            };
            if !self.policy.is_start_valid(&query) {
                return Err(SearchFailure::InvalidStart(start));
            }
            if !self.policy.is_destination_valid(&query) {
                return Err(SearchFailure::DestinationRejected(destination));
            }
        }

        if !self.cache_safe {
            self.epoch = self.epoch.next();
        }
        let reused = reuse && self.can_reuse(start, flags);
        if !reused {
            self.reset_lists();
        }
        let destination_changed = self.session.destination != destination;

        self.session.start = start;
        self.session.destination = destination;
        self.session.flags = flags;
        self.session.built_under = Some(self.epoch);
        self.session.signature = self.policy.signature();
        self.best = None;
        self.stats.searches += 1;
        if reused {
            self.stats.reused += 1;
            debug!(?start, ?destination, "reusing previous search state");
        }

        {
            let query = self.session.query(grid);
            self.policy.begin_search(&query);
        }
        let result = self.search(grid, reused, destination_changed);
        {
            let query = self.session.query(grid);
            self.policy.end_search(&query, result.is_ok());
        }

        match result {
            Ok(best) => {
                self.best = Some(best);
                self.session.answered = Some((destination, best));
                trace!(
                    ?start,
                    ?destination,
                    cost = self.nodes[best.get()].known_cost,
                    "path found"
                );
            }
            Err(failure) => {
                self.session.answered = None;
                trace!(?start, ?destination, %failure, "path search failed");
            }
        }

        debug_assert!(
            self.check_invariants().is_ok(),
            "path finder invariant violated: {:?}",
            self.check_invariants()
        );
        result
    }

    fn search(
        &mut self,
        grid: GridConfig,
        reused: bool,
        destination_changed: bool,
    ) -> Result<NodeIndex, SearchFailure> {
        if reused {
            if destination_changed {
                self.refresh_heuristics(grid);
            }
            if let Some(hit) = self.cached_answer(grid) {
                self.stats.cache_hits += 1;
                self.state = SearchState::Succeeded;
                debug!(destination = ?self.session.destination, "destination already closed");
                return Ok(hit);
            }
        } else {
            self.seed(grid);
        }

        self.state = SearchState::Expanding;
        let mut expanded = 0usize;
        loop {
            let Some(best) = self.get_best(grid) else {
                self.state = SearchState::Exhausted;
                self.session.reusable = true;
                return Err(SearchFailure::Exhausted);
            };

            if let Some(max_turns) = self.options.max_turns {
                if self.nodes[best.get()].turn.turn > max_turns {
                    self.state = SearchState::Exhausted;
                    self.session.reusable = false;
                    return Err(SearchFailure::TurnLimit(max_turns));
                }
            }
            expanded += 1;
            if let Some(budget) = self.options.max_expansions {
                if expanded > budget {
                    self.state = SearchState::Exhausted;
                    self.session.reusable = false;
                    return Err(SearchFailure::ExpansionLimit(budget));
                }
            }
            self.stats.expanded += 1;

            self.create_children(grid, best);

            let view = self.nodes[best.get()].view();
            let query = self.session.query(grid);
            if self.policy.is_destination(&query, &view) {
                self.state = SearchState::Succeeded;
                self.session.reusable = true;
                return Ok(best);
            }
        }
    }

    fn seed(&mut self, grid: GridConfig) {
        let start = self.session.start;
        let Some(slot) = grid.index_of(start) else {
            return;
        };
        let idx = NodeIndex::new(slot);
        let (heuristic, turn) = {
            let query = self.session.query(grid);
            (
                self.policy.heuristic(&query, start),
                self.policy.initial_turn(&query),
            )
        };

        let node = &mut self.nodes[slot];
        node.parent = None;
        node.turn = turn;
        node.set_costs(0, heuristic);
        self.open.insert_sorted(&mut self.nodes, idx);
        self.state = SearchState::Seeded;

        let view = self.nodes[slot].view();
        let query = self.session.query(grid);
        self.policy.list_changed(&query, &view, ListEvent::Seeded);
    }

    /// Return every touched node to the unlisted state and drop cached facts.
    fn reset_lists(&mut self) {
        let touched = self.open.len() + self.closed.len();
        for list in [self.open, self.closed] {
            let mut cursor = list.head();
            for _ in 0..list.len() {
                let Some(idx) = cursor else {
                    break;
                };
                cursor = self.nodes[idx.get()].link.next;
                self.nodes[idx.get()].reset();
            }
        }
        self.open.clear();
        self.closed.clear();
        self.stack.clear();
        self.facts.invalidate();
        self.session.forget();
        self.best = None;
        self.state = SearchState::Idle;
        self.stats.resets += 1;
        if touched > 0 {
            debug!(touched, "path finder lists reset");
        }
    }

    fn refresh_heuristics(&mut self, grid: GridConfig) {
        let query = self.session.query(grid);
        for list in [self.open, self.closed] {
            let mut cursor = list.head();
            for _ in 0..list.len() {
                let Some(idx) = cursor else {
                    break;
                };
                let node = &mut self.nodes[idx.get()];
                cursor = node.link.next;
                let heuristic = self.policy.heuristic(&query, node.cell);
                let known = node.known_cost;
                node.set_costs(known, heuristic);
            }
        }
        self.open.resort_all(&mut self.nodes);
    }

    fn cached_answer(&self, grid: GridConfig) -> Option<NodeIndex> {
        let destination = self.session.destination;
        if let Some((answered, idx)) = self.session.answered {
            if answered == destination && self.nodes[idx.get()].list == ListKind::Closed {
                return Some(idx);
            }
        }

        let query = self.session.query(grid);
        let slot = grid.index_of(destination)?;
        let cells = self.facts.len();
        [slot, cells + slot]
            .into_iter()
            .filter(|&i| i < self.nodes.len())
            .map(NodeIndex::new)
            .find(|idx| {
                let node = &self.nodes[idx.get()];
                node.list == ListKind::Closed && self.policy.is_destination(&query, &node.view())
            })
    }

    // Open/closed list engine

    /// Move the cheapest open node to the closed list. `None` means the open list is exhausted.
    pub(crate) fn get_best(&mut self, grid: GridConfig) -> Option<NodeIndex> {
        let best = self.open.pop_front(&mut self.nodes)?;
        self.closed.push_front(&mut self.nodes, best);

        let view = self.nodes[best.get()].view();
        let query = self.session.query(grid);
        self.policy.list_changed(&query, &view, ListEvent::EnteredClosed);
        Some(best)
    }

    pub(crate) fn create_children(&mut self, grid: GridConfig, node: NodeIndex) {
        let cell = self.nodes[node.get()].cell;
        let slot = self.slot_of(node);
        let neighbors: ArrayVec<Cell, MAX_NEIGHBORS> = match self.neighbor_table.get(slot) {
            Some(table) => table.iter().map(|&i| grid.cell_at(i as usize)).collect(),
            None => grid.neighbors(cell),
        };
        for &next in &neighbors {
            self.visit(grid, node, next, false);
        }

        let mut extras = std::mem::take(&mut self.extras);
        extras.clear();
        {
            let view = self.nodes[node.get()].view();
            let query = self.session.query(grid);
            self.policy.extra_children(&query, &view, &mut extras);
        }
        if extras.len() > MAX_EXTRA_CHILDREN {
            warn!(
                ?cell,
                requested = extras.len(),
                limit = MAX_EXTRA_CHILDREN,
                "dropping extra children over the limit"
            );
            extras.truncate(MAX_EXTRA_CHILDREN);
        }
        for &next in &extras {
            let Some(next) = grid.wrap(next) else {
                continue;
            };
            if next == cell || neighbors.contains(&next) {
                continue;
            }
            self.visit(grid, node, next, true);
        }
        self.extras = extras;
    }

    fn visit(&mut self, grid: GridConfig, parent: NodeIndex, to: Cell, long_range: bool) {
        let Some(to_slot) = grid.index_of(to) else {
            return;
        };
        let Some((known, turn)) = self.edge(grid, parent, to, long_range) else {
            return;
        };
        self.link_child(grid, parent, NodeIndex::new(to_slot), known, turn);
    }

    /// Known cost and turn data of reaching `to` through `parent`, or `None` when the policy
    /// rejects the edge.
    fn edge(
        &mut self,
        grid: GridConfig,
        parent: NodeIndex,
        to: Cell,
        long_range: bool,
    ) -> Option<(i32, TurnData)> {
        let to_slot = grid.index_of(to)?;
        let parent_slot = self.slot_of(parent);
        self.ensure_facts(grid, parent_slot);
        self.ensure_facts(grid, to_slot);

        let parent_node = &self.nodes[parent.get()];
        let query = self.session.query(grid);
        let step = Step {
            query: &query,
            parent: parent_node.view(),
            parent_facts: self.facts.facts(parent_slot),
            to,
            to_facts: self.facts.facts(to_slot),
            long_range,
        };
        if !self.policy.valid(&step) {
            return None;
        }
        let cost = self.policy.cost(&step);
        debug_assert!(
            cost > 0,
            "policy returned cost {cost} for {:?} -> {to:?}",
            parent_node.cell
        );
        let turn = self.policy.turn_data(&step);
        Some((parent_node.known_cost.saturating_add(cost), turn))
    }

    /// Relax the edge `parent -> child` with the given candidate cost.
    pub(crate) fn link_child(
        &mut self,
        grid: GridConfig,
        parent: NodeIndex,
        child: NodeIndex,
        known: i32,
        turn: TurnData,
    ) {
        self.nodes[parent.get()].record_child(child);

        let node = &self.nodes[child.get()];
        match node.list {
            ListKind::Open => {
                if known >= node.known_cost {
                    return;
                }
                let heuristic = node.heuristic_cost;
                self.rewire(child, parent, known, heuristic, turn);
                self.update_open_node(child);
                self.notify_child(grid, parent, child, ChildEvent::Updated);
                L::primary_improved(self, child);
            }
            ListKind::Closed => {
                if known >= node.known_cost {
                    return;
                }
                let heuristic = node.heuristic_cost;
                self.rewire(child, parent, known, heuristic, turn);
                self.notify_child(grid, parent, child, ChildEvent::Updated);
                L::primary_improved(self, child);
                self.update_parents(grid, child);
            }
            ListKind::Unlisted => {
                let heuristic = {
                    let query = self.session.query(grid);
                    self.policy.heuristic(&query, node.cell)
                };
                self.rewire(child, parent, known, heuristic, turn);
                self.notify_child(grid, parent, child, ChildEvent::Added);
                self.add_to_open(grid, child);
                L::primary_improved(self, child);
            }
        }
    }

    pub(crate) fn add_to_open(&mut self, grid: GridConfig, node: NodeIndex) {
        self.open.insert_sorted(&mut self.nodes, node);

        let view = self.nodes[node.get()].view();
        let query = self.session.query(grid);
        self.policy.list_changed(&query, &view, ListEvent::AddedToOpen);
    }

    /// Re-position an open node after its cost decreased in place.
    pub(crate) fn update_open_node(&mut self, node: NodeIndex) {
        debug_assert_eq!(self.nodes[node.get()].list, ListKind::Open);
        self.open.resort_decreased(&mut self.nodes, node);
    }

    /// Push a cost improvement of `node` down through its recorded children.
    ///
    /// Uses an explicit work stack; `on_stack` keeps a node from being queued twice. Re-entrant
    /// calls (from overlay updates) only enqueue.
    pub(crate) fn update_parents(&mut self, grid: GridConfig, node: NodeIndex) {
        self.push_stack(node);
        if self.propagating {
            return;
        }
        self.propagating = true;

        while let Some(parent) = self.pop_stack() {
            let children = self.nodes[parent.get()].children.clone();
            for child in children {
                let Some((known, turn)) = self.child_candidate(grid, parent, child) else {
                    continue;
                };
                let current = &self.nodes[child.get()];
                if known >= current.known_cost {
                    continue;
                }
                let heuristic = current.heuristic_cost;
                let list = current.list;
                self.rewire(child, parent, known, heuristic, turn);
                self.notify_child(grid, parent, child, ChildEvent::Propagated);
                match list {
                    ListKind::Open => self.update_open_node(child),
                    ListKind::Closed => self.push_stack(child),
                    ListKind::Unlisted => debug_assert!(false, "recorded child {child:?} is unlisted"),
                }
                L::primary_improved(self, child);
            }
        }

        self.propagating = false;
    }

    fn child_candidate(
        &mut self,
        grid: GridConfig,
        parent: NodeIndex,
        child: NodeIndex,
    ) -> Option<(i32, TurnData)> {
        let from = self.nodes[parent.get()].cell;
        let (cell, layer) = {
            let node = &self.nodes[child.get()];
            (node.cell, node.layer)
        };
        let long_range = !grid.is_neighbor(from, cell);
        let (known, turn) = self.edge(grid, parent, cell, long_range)?;
        match layer {
            Layer::Primary => Some((known, turn)),
            Layer::Overlay => L::stop_candidate(self, grid, cell, known, turn),
        }
    }

    fn rewire(
        &mut self,
        child: NodeIndex,
        parent: NodeIndex,
        known: i32,
        heuristic: i32,
        turn: TurnData,
    ) {
        let node = &mut self.nodes[child.get()];
        node.parent = Some(parent);
        node.turn = turn;
        node.set_costs(known, heuristic);
    }

    fn notify_child(
        &mut self,
        grid: GridConfig,
        parent: NodeIndex,
        child: NodeIndex,
        event: ChildEvent,
    ) {
        let parent_view = self.nodes[parent.get()].view();
        let child_view = self.nodes[child.get()].view();
        let query = self.session.query(grid);
        self.policy
            .child_added(&query, &parent_view, &child_view, event);
    }

    fn push_stack(&mut self, idx: NodeIndex) {
        let node = &mut self.nodes[idx.get()];
        if node.on_stack {
            return;
        }
        node.on_stack = true;
        self.stack.push(idx);
    }

    fn pop_stack(&mut self) -> Option<NodeIndex> {
        let idx = self.stack.pop()?;
        self.nodes[idx.get()].on_stack = false;
        Some(idx)
    }

    fn ensure_facts(&mut self, grid: GridConfig, slot: usize) {
        let cell = grid.cell_at(slot);
        let query = self.session.query(grid);
        let policy = &self.policy;
        self.facts.ensure(slot, || policy.facts(&query, cell));
    }

    /// Grid cell slot shared by a node and its overlay twin.
    #[inline]
    fn slot_of(&self, idx: NodeIndex) -> usize {
        let cells = self.facts.len();
        let idx = idx.get();
        if idx >= cells {
            idx - cells
        } else {
            idx
        }
    }

    /// Overlay twin of `cell`, allocating the overlay node set on first use.
    pub(crate) fn overlay_index(&mut self, cell: Cell) -> Option<NodeIndex> {
        let grid = self.grid?;
        let slot = grid.index_of(cell)?;
        let cells = grid.cell_count();
        if self.nodes.len() < 2 * cells {
            self.nodes
                .extend((0..cells).map(|i| Node::new(grid.cell_at(i), Layer::Overlay)));
            debug!(cells, "allocated partial-move overlay");
        }
        Some(NodeIndex::new(cells + slot))
    }

    pub(crate) fn overlay_node(&self, cell: Cell) -> Option<&Node> {
        let grid = self.grid?;
        let slot = grid.index_of(cell)?;
        self.nodes.get(grid.cell_count() + slot)
    }

    // Results

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Terminal node of the last successful query.
    pub fn last_node(&self) -> Option<&Node> {
        self.best.map(|idx| &self.nodes[idx.get()])
    }

    pub fn last_index(&self) -> Option<NodeIndex> {
        self.best
    }

    pub fn node_at(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.get())
    }

    /// Primary node of `cell`.
    pub fn node(&self, cell: Cell) -> Option<&Node> {
        let slot = self.grid?.index_of(cell)?;
        self.nodes.get(slot)
    }

    /// Waypoints from the terminal node back to the start. Empty after a failed query.
    pub fn path_steps(&self) -> PathSteps<'_> {
        PathSteps::new(&self.nodes, self.best)
    }

    /// Waypoints from `idx` back to the start of the search that reached it.
    pub fn path_steps_from(&self, idx: NodeIndex) -> PathSteps<'_> {
        let from = (idx.get() < self.nodes.len()).then_some(idx);
        PathSteps::new(&self.nodes, from)
    }

    /// Waypoints from start to destination.
    pub fn path(&self) -> Vec<PathStep> {
        let mut steps: Vec<PathStep> = self.path_steps().collect();
        steps.reverse();
        steps
    }

    pub fn path_cost(&self) -> Option<i32> {
        self.last_node().map(Node::known_cost)
    }

    /// Turn number recorded on the terminal node.
    pub fn path_turns(&self) -> Option<i32> {
        self.last_node().map(|node| node.turn.turn)
    }

    /// Furthest cell of the path still reached during the start's turn.
    pub fn turn_end_cell(&self) -> Option<Cell> {
        let steps = self.path();
        let first_turn = steps.first()?.turn;
        steps
            .iter()
            .take_while(|step| step.turn == first_turn)
            .last()
            .map(PathStep::cell)
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    pub fn open_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.open.iter(&self.nodes).map(move |idx| &self.nodes[idx.get()])
    }

    /// Nodes finalized by the current session, most recent first.
    pub fn closed_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.closed
            .iter(&self.nodes)
            .map(move |idx| &self.nodes[idx.get()])
    }

    /// Cells finalized by the current session. A cell appears twice when both of its nodes
    /// were closed.
    pub fn closed_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.closed_nodes().map(Node::cell)
    }

    /// Cached facts for `cell`, if computed during the current session.
    pub fn facts(&self, cell: Cell) -> Option<&P::Facts> {
        let slot = self.grid?.index_of(cell)?;
        self.facts
            .is_computed(slot)
            .then(|| self.facts.facts(slot))
    }

    pub fn fact_computations(&self) -> u64 {
        self.facts.computations()
    }

    /// Verify the list invariants: membership tags match list threading, links are symmetric,
    /// the open list is sorted, totals are current, parents are expanded, and the propagation
    /// stack is empty.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for list in [&self.open, &self.closed] {
            let kind = list.kind();
            let mut prev: Option<NodeIndex> = None;
            let mut count = 0usize;
            let mut cursor = list.head();
            while let Some(idx) = cursor {
                let node = &self.nodes[idx.get()];
                if node.list != kind {
                    return Err(InvariantViolation::Membership {
                        node: idx,
                        expected: kind,
                        found: node.list,
                    });
                }
                if node.link.prev != prev {
                    return Err(InvariantViolation::BrokenLink { node: idx });
                }
                if kind == ListKind::Open {
                    if let Some(p) = prev {
                        if self.nodes[p.get()].total_cost > node.total_cost {
                            return Err(InvariantViolation::Unsorted { node: idx });
                        }
                    }
                }
                count += 1;
                if count > list.len() {
                    return Err(InvariantViolation::CountMismatch {
                        list: kind,
                        expected: list.len(),
                        found: count,
                    });
                }
                prev = Some(idx);
                cursor = node.link.next;
            }
            if count != list.len() {
                return Err(InvariantViolation::CountMismatch {
                    list: kind,
                    expected: list.len(),
                    found: count,
                });
            }

            let tagged = self.nodes.iter().filter(|n| n.list == kind).count();
            if tagged != list.len() {
                return Err(InvariantViolation::CountMismatch {
                    list: kind,
                    expected: list.len(),
                    found: tagged,
                });
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let idx = NodeIndex::new(i);
            if node.total_cost != node.known_cost.saturating_add(node.heuristic_cost) {
                return Err(InvariantViolation::StaleTotal { node: idx });
            }
            if node.on_stack {
                return Err(InvariantViolation::LeftOnStack { node: idx });
            }
            if node.list != ListKind::Unlisted {
                if let Some(parent) = node.parent {
                    if self.nodes[parent.get()].list != ListKind::Closed {
                        return Err(InvariantViolation::OrphanParent { node: idx });
                    }
                }
            }
        }
        Ok(())
    }
}
