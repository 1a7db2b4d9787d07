use ai_path::{Cell, PathPolicy, Query, Step};

use crate::TerrainMap;

/// Shortest step count over passable cells, with a grid-distance heuristic.
#[derive(Debug, Clone)]
pub struct StepPolicy {
    map: TerrainMap,
    /// Treat water as passable.
    pub allow_water: bool,
}

impl StepPolicy {
    pub fn new(map: TerrainMap) -> Self {
        Self {
            map,
            allow_water: false,
        }
    }

    pub fn with_water(mut self) -> Self {
        self.allow_water = true;
        self
    }

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }
}

impl PathPolicy for StepPolicy {
    type Context = ();
    type Facts = bool;

    fn facts(&self, _query: &Query<'_, ()>, cell: Cell) -> bool {
        let terrain = self.map.terrain(cell);
        terrain.passable && (self.allow_water || !terrain.water)
    }

    fn valid(&self, step: &Step<'_, (), bool>) -> bool {
        *step.to_facts
    }

    fn cost(&self, _step: &Step<'_, (), bool>) -> i32 {
        1
    }

    fn is_destination_valid(&self, query: &Query<'_, ()>) -> bool {
        let terrain = self.map.terrain(query.destination);
        terrain.passable && (self.allow_water || !terrain.water)
    }

    fn heuristic(&self, query: &Query<'_, ()>, from: Cell) -> i32 {
        query.grid.distance(from, query.destination)
    }

    fn signature(&self) -> u64 {
        self.map.version() << 1 | u64::from(self.allow_water)
    }
}
