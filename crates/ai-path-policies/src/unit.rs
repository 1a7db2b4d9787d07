//! Turn-aware unit movement.
//!
//! Costs are measured in movement points scaled by [`MOVE_WEIGHT`], so a path's cost is the
//! number of points it spends plus any penalties. Turn data tracks the points left in the current
//! turn and the turn number, starting at turn 1.

use std::collections::{HashMap, HashSet};

use ai_path::{
    Cell, Layering, NodeView, PartialMovePolicy, PathFinder, PathPolicy, Query, SearchFailure,
    SearchFlags, Step, TurnData,
};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Terrain, TerrainMap};

/// Cost of one movement point.
pub const MOVE_WEIGHT: i32 = 100;

/// Restricts a search to cells reachable without starting a new turn. No cell counts as the
/// destination; the search floods and exhausts.
pub const SINGLE_TURN: SearchFlags = SearchFlags(1 << 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitContext {
    pub player: u8,
    /// Movement points granted at the start of every turn.
    pub base_moves: i32,
    /// Points left in the current turn when the search starts.
    pub moves_left: i32,
}

impl Default for UnitContext {
    fn default() -> Self {
        Self::new(0, 2)
    }
}

impl UnitContext {
    pub fn new(player: u8, base_moves: i32) -> Self {
        Self {
            player,
            base_moves,
            moves_left: base_moves,
        }
    }

    pub fn with_moves_left(mut self, moves_left: i32) -> Self {
        self.moves_left = moves_left;
        self
    }
}

/// When danger is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DangerMode {
    #[default]
    Ignore,
    /// Every cell entered.
    EveryStep,
    /// Only cells where the unit ends its turn.
    TurnEnd,
}

/// Extra costs layered on top of movement points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PenaltyModel {
    pub danger: DangerMode,
    /// Multiplier applied to a cell's danger value.
    pub danger_weight: i32,
    /// Cost of passing through a cell occupied by a friendly unit.
    pub stacking: i32,
}

impl Default for PenaltyModel {
    fn default() -> Self {
        Self {
            danger: DangerMode::Ignore,
            danger_weight: 1,
            stacking: 0,
        }
    }
}

impl PenaltyModel {
    pub fn with_danger(mut self, mode: DangerMode, weight: i32) -> Self {
        self.danger = mode;
        self.danger_weight = weight;
        self
    }

    pub fn with_stacking(mut self, stacking: i32) -> Self {
        self.stacking = stacking;
        self
    }

    /// Penalty for entering a cell described by `facts`.
    pub fn apply(&self, facts: &UnitFacts, player: u8, ends_turn: bool) -> i32 {
        let danger = match self.danger {
            DangerMode::Ignore => 0,
            DangerMode::EveryStep => facts.danger,
            DangerMode::TurnEnd if ends_turn => facts.danger,
            DangerMode::TurnEnd => 0,
        };
        let stacking = match facts.occupant {
            Some(owner) if owner == player && !ends_turn => self.stacking,
            _ => 0,
        };
        danger.saturating_mul(self.danger_weight).saturating_add(stacking)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitFacts {
    pub terrain: Terrain,
    pub danger: i32,
    pub occupant: Option<u8>,
    pub end_turn_blocked: bool,
}

/// Land movement for one unit, over a terrain map plus unit occupancy and danger overlays.
#[derive(Debug, Clone)]
pub struct UnitMovePolicy {
    map: TerrainMap,
    units: HashMap<Cell, u8>,
    danger: HashMap<Cell, i32>,
    end_turn_blocked: HashSet<Cell>,
    penalties: PenaltyModel,
    ignore_units: bool,
    revision: u64,
}

impl UnitMovePolicy {
    pub fn new(map: TerrainMap) -> Self {
        Self {
            map,
            units: HashMap::new(),
            danger: HashMap::new(),
            end_turn_blocked: HashSet::new(),
            penalties: PenaltyModel::default(),
            ignore_units: false,
            revision: 0,
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyModel) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }

    pub fn penalties(&self) -> PenaltyModel {
        self.penalties
    }

    pub fn set_penalties(&mut self, penalties: PenaltyModel) {
        if penalties != self.penalties {
            self.penalties = penalties;
            self.revision += 1;
        }
    }

    /// Ignore other units entirely: no blocking, no stacking rules.
    pub fn set_ignore_units(&mut self, ignore: bool) {
        if ignore != self.ignore_units {
            self.ignore_units = ignore;
            self.revision += 1;
        }
    }

    pub fn place_unit(&mut self, cell: Cell, player: u8) {
        self.units.insert(cell, player);
        self.revision += 1;
    }

    pub fn remove_unit(&mut self, cell: Cell) {
        if self.units.remove(&cell).is_some() {
            self.revision += 1;
        }
    }

    pub fn set_danger(&mut self, cell: Cell, danger: i32) {
        self.danger.insert(cell, danger);
        self.revision += 1;
    }

    /// Forbid ending a turn on `cell` (the unit may still pass through).
    pub fn block_turn_end(&mut self, cell: Cell) {
        if self.end_turn_blocked.insert(cell) {
            self.revision += 1;
        }
    }

    fn moves_after(&self, context: &UnitContext, from: TurnData, facts: &UnitFacts) -> TurnData {
        let (moves, turn) = if from.moves > 0 {
            (from.moves, from.turn)
        } else {
            (context.base_moves, from.turn + 1)
        };
        let spent = facts.terrain.entry_cost().min(moves.max(1));
        TurnData::new((moves - spent).max(0), turn)
    }

    fn can_stop(&self, facts: &UnitFacts) -> bool {
        !facts.end_turn_blocked && (self.ignore_units || facts.occupant.is_none())
    }
}

impl PathPolicy for UnitMovePolicy {
    type Context = UnitContext;
    type Facts = UnitFacts;

    fn facts(&self, _query: &Query<'_, UnitContext>, cell: Cell) -> UnitFacts {
        UnitFacts {
            terrain: self.map.terrain(cell),
            danger: self.danger.get(&cell).copied().unwrap_or(0),
            occupant: self.units.get(&cell).copied(),
            end_turn_blocked: self.end_turn_blocked.contains(&cell),
        }
    }

    fn valid(&self, step: &Step<'_, UnitContext, UnitFacts>) -> bool {
        let context = step.query.context;
        let to = step.to_facts;
        if !to.terrain.passable || to.terrain.water {
            return false;
        }
        if step.query.flags.contains(SINGLE_TURN) && step.parent.turn.moves <= 0 {
            return false;
        }
        if !self.ignore_units && to.occupant.is_some_and(|owner| owner != context.player) {
            return false;
        }
        let after = self.moves_after(context, step.parent.turn, to);
        after.moves > 0 || self.can_stop(to)
    }

    fn cost(&self, step: &Step<'_, UnitContext, UnitFacts>) -> i32 {
        let context = step.query.context;
        let from = step.parent.turn;
        let after = self.moves_after(context, from, step.to_facts);
        let available = if from.moves > 0 {
            from.moves
        } else {
            context.base_moves
        };
        let spent = (available - after.moves).max(1);
        let ends_turn = after.moves == 0;
        MOVE_WEIGHT.saturating_mul(spent).saturating_add(self.penalties.apply(
            step.to_facts,
            context.player,
            ends_turn,
        ))
    }

    fn is_destination(&self, query: &Query<'_, UnitContext>, node: &NodeView) -> bool {
        !query.flags.contains(SINGLE_TURN) && node.cell == query.destination
    }

    fn is_destination_valid(&self, query: &Query<'_, UnitContext>) -> bool {
        let terrain = self.map.terrain(query.destination);
        terrain.passable && !terrain.water
    }

    fn heuristic(&self, query: &Query<'_, UnitContext>, from: Cell) -> i32 {
        query.grid.distance(from, query.destination) * MOVE_WEIGHT
    }

    fn initial_turn(&self, query: &Query<'_, UnitContext>) -> TurnData {
        TurnData::new(query.context.moves_left.max(0), 1)
    }

    fn turn_data(&self, step: &Step<'_, UnitContext, UnitFacts>) -> TurnData {
        self.moves_after(step.query.context, step.parent.turn, step.to_facts)
    }

    fn signature(&self) -> u64 {
        self.map.version().wrapping_add(self.revision)
    }
}

impl PartialMovePolicy for UnitMovePolicy {
    fn movement_weight(&self) -> i32 {
        MOVE_WEIGHT
    }

    fn stop_matters(
        &self,
        _query: &Query<'_, UnitContext>,
        _cell: Cell,
        _turn: TurnData,
        facts: &UnitFacts,
    ) -> bool {
        self.can_stop(facts)
    }
}

/// Cells the unit can reach before its current turn ends, with the movement points left there.
///
/// Sorted by cell. The start is included with its full allowance. Empty when the unit cannot
/// stand on `start`.
pub fn reachable_this_turn<L: Layering<UnitMovePolicy>>(
    finder: &mut PathFinder<UnitMovePolicy, L>,
    start: Cell,
) -> Vec<(Cell, i32)> {
    // Never succeeds: the search floods until the open list is exhausted.
    if finder
        .try_generate_path(start, start, SINGLE_TURN, false)
        .is_err_and(|failure| failure != SearchFailure::Exhausted)
    {
        return Vec::new();
    }

    let mut best: HashMap<Cell, i32> = HashMap::new();
    for node in finder.closed_nodes() {
        if node.turn().turn != 1 {
            continue;
        }
        let moves = best.entry(node.cell()).or_insert(node.turn().moves);
        *moves = (*moves).max(node.turn().moves);
    }
    let mut cells: Vec<(Cell, i32)> = best.into_iter().collect();
    cells.sort();
    trace!(?start, reachable = cells.len(), "single-turn reachability");
    cells
}
