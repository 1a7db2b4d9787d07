use std::collections::HashMap;

use ai_path::{Cell, NodeView, PathFinder, PathPolicy, Query, SearchFlags, Step};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Terrain, TerrainMap};

/// Cost of one land step per point of terrain move cost.
pub const LAND_STEP: i32 = 10;
/// Cost of one water step, and of each cell of distance covered by a sea lane.
pub const WATER_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TradeDomain {
    #[default]
    Land,
    /// Water cells and harbours, plus sea lanes between harbours.
    Water,
}

/// Trade routes between cities over land or water.
///
/// Sea lanes are long-range edges between harbours, offered through `extra_children` during
/// water searches.
#[derive(Debug, Clone)]
pub struct TradeRoutePolicy {
    map: TerrainMap,
    lanes: HashMap<Cell, Vec<Cell>>,
    revision: u64,
}

impl TradeRoutePolicy {
    pub fn new(map: TerrainMap) -> Self {
        Self {
            map,
            lanes: HashMap::new(),
            revision: 0,
        }
    }

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }

    /// Open a two-way sea lane between two harbours.
    pub fn add_lane(&mut self, a: Cell, b: Cell) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let lanes = self.lanes.entry(from).or_default();
            if !lanes.contains(&to) {
                lanes.push(to);
            }
        }
        self.revision += 1;
    }

    pub fn lanes_from(&self, cell: Cell) -> &[Cell] {
        self.lanes.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    fn in_domain(domain: TradeDomain, terrain: &Terrain) -> bool {
        if !terrain.passable {
            return false;
        }
        match domain {
            TradeDomain::Land => !terrain.water,
            TradeDomain::Water => terrain.water || terrain.harbor,
        }
    }
}

impl PathPolicy for TradeRoutePolicy {
    type Context = TradeDomain;
    type Facts = Terrain;

    fn facts(&self, _query: &Query<'_, TradeDomain>, cell: Cell) -> Terrain {
        self.map.terrain(cell)
    }

    fn valid(&self, step: &Step<'_, TradeDomain, Terrain>) -> bool {
        let domain = *step.query.context;
        if !Self::in_domain(domain, step.to_facts) {
            return false;
        }
        // Lanes only run between harbours.
        !step.long_range || (step.parent_facts.harbor && step.to_facts.harbor)
    }

    fn cost(&self, step: &Step<'_, TradeDomain, Terrain>) -> i32 {
        if step.long_range {
            let distance = step.query.grid.distance(step.parent.cell, step.to);
            return WATER_STEP.saturating_mul(distance.max(1));
        }
        match step.query.context {
            TradeDomain::Land => LAND_STEP.saturating_mul(step.to_facts.entry_cost()),
            TradeDomain::Water => WATER_STEP,
        }
    }

    fn is_start_valid(&self, query: &Query<'_, TradeDomain>) -> bool {
        Self::in_domain(*query.context, &self.map.terrain(query.start))
    }

    fn is_destination_valid(&self, query: &Query<'_, TradeDomain>) -> bool {
        Self::in_domain(*query.context, &self.map.terrain(query.destination))
    }

    fn heuristic(&self, query: &Query<'_, TradeDomain>, from: Cell) -> i32 {
        query.grid.distance(from, query.destination) * WATER_STEP
    }

    fn extra_children(
        &self,
        query: &Query<'_, TradeDomain>,
        node: &NodeView,
        out: &mut Vec<Cell>,
    ) {
        if *query.context == TradeDomain::Water {
            out.extend_from_slice(self.lanes_from(node.cell));
        }
    }

    fn signature(&self) -> u64 {
        self.map.version().wrapping_add(self.revision)
    }
}

/// Cheapest route cost between two cities in `domain`, leaving the route readable on `finder`.
pub fn trade_route(
    finder: &mut PathFinder<TradeRoutePolicy>,
    from: Cell,
    to: Cell,
    domain: TradeDomain,
) -> Option<i32> {
    finder.set_context(domain);
    if finder.generate_path(from, to, SearchFlags::NONE, true) {
        finder.path_cost()
    } else {
        None
    }
}
