use ai_path::{
    Cell, NodeView, PathFinder, PathPolicy, Query, SearchFailure, SearchFlags, Step,
};

use crate::{Terrain, TerrainMap};

/// Terrain-weighted spread from an origin, bounded by a cost radius.
///
/// Water and cells owned by other players cost extra; impassable cells stop the spread.
#[derive(Debug, Clone)]
pub struct InfluencePolicy {
    map: TerrainMap,
    /// Largest accumulated cost a cell may have and still be influenced.
    pub max_cost: i32,
    pub water_cost: i32,
    /// Added when entering a cell owned by someone other than the origin's owner.
    pub foreign_cost: i32,
}

impl InfluencePolicy {
    pub fn new(map: TerrainMap, max_cost: i32) -> Self {
        Self {
            map,
            max_cost,
            water_cost: 2,
            foreign_cost: 0,
        }
    }

    pub fn with_water_cost(mut self, water_cost: i32) -> Self {
        self.water_cost = water_cost;
        self
    }

    pub fn with_foreign_cost(mut self, foreign_cost: i32) -> Self {
        self.foreign_cost = foreign_cost;
        self
    }

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }

    fn step_cost(&self, origin_owner: Option<u8>, to: &Terrain) -> i32 {
        let base = if to.water {
            self.water_cost.max(1)
        } else {
            to.entry_cost()
        };
        let foreign = match (origin_owner, to.owner) {
            (Some(origin), Some(owner)) if origin != owner => self.foreign_cost.max(0),
            _ => 0,
        };
        base.saturating_add(foreign)
    }
}

impl PathPolicy for InfluencePolicy {
    type Context = ();
    type Facts = Terrain;

    fn facts(&self, _query: &Query<'_, ()>, cell: Cell) -> Terrain {
        self.map.terrain(cell)
    }

    fn valid(&self, step: &Step<'_, (), Terrain>) -> bool {
        if !step.to_facts.passable {
            return false;
        }
        let origin_owner = self.map.terrain(step.query.start).owner;
        let reached = step
            .parent
            .known_cost
            .saturating_add(self.step_cost(origin_owner, step.to_facts));
        reached <= self.max_cost
    }

    fn cost(&self, step: &Step<'_, (), Terrain>) -> i32 {
        let origin_owner = self.map.terrain(step.query.start).owner;
        self.step_cost(origin_owner, step.to_facts)
    }

    fn is_destination(&self, _query: &Query<'_, ()>, _node: &NodeView) -> bool {
        false
    }

    fn signature(&self) -> u64 {
        // Radius and weights are public and may change between queries.
        let weights = (self.max_cost as u64) << 40
            ^ (self.water_cost as u64) << 20
            ^ self.foreign_cost as u64;
        self.map.version().wrapping_add(weights)
    }
}

/// Every cell within the cost radius of `origin`, with its cheapest cost, ordered by cost then
/// cell. Empty when `origin` is off the map.
pub fn influence_cells(finder: &mut PathFinder<InfluencePolicy>, origin: Cell) -> Vec<(Cell, i32)> {
    if finder
        .try_generate_path(origin, origin, SearchFlags::NONE, false)
        .is_err_and(|failure| failure != SearchFailure::Exhausted)
    {
        return Vec::new();
    }
    let mut cells: Vec<(Cell, i32)> = finder
        .closed_nodes()
        .map(|node| (node.cell(), node.known_cost()))
        .collect();
    cells.sort_by_key(|&(cell, cost)| (cost, cell));
    cells
}
