use ai_path::{
    Cell, GridConfig, NodeView, PathFinder, PathPolicy, Query, SearchFailure, SearchFlags, Step,
};
use tracing::debug;

use crate::{Terrain, TerrainMap};

/// Floods the connected region of passable cells that share the start's land/water class.
/// There is no destination: every search ends by exhausting the open list.
#[derive(Debug, Clone)]
pub struct AreaFloodPolicy {
    map: TerrainMap,
}

impl AreaFloodPolicy {
    pub fn new(map: TerrainMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }
}

impl PathPolicy for AreaFloodPolicy {
    type Context = ();
    type Facts = Terrain;

    fn facts(&self, _query: &Query<'_, ()>, cell: Cell) -> Terrain {
        self.map.terrain(cell)
    }

    fn valid(&self, step: &Step<'_, (), Terrain>) -> bool {
        step.to_facts.passable && step.to_facts.water == step.parent_facts.water
    }

    fn cost(&self, _step: &Step<'_, (), Terrain>) -> i32 {
        1
    }

    fn is_start_valid(&self, query: &Query<'_, ()>) -> bool {
        self.map.terrain(query.start).passable
    }

    fn is_destination(&self, _query: &Query<'_, ()>, _node: &NodeView) -> bool {
        false
    }

    fn signature(&self) -> u64 {
        self.map.version()
    }
}

/// Cells connected to `start`, sorted. Empty when the start is impassable.
pub fn flood_area(finder: &mut PathFinder<AreaFloodPolicy>, start: Cell) -> Vec<Cell> {
    if finder
        .try_generate_path(start, start, SearchFlags::NONE, false)
        .is_err_and(|failure| failure != SearchFailure::Exhausted)
    {
        return Vec::new();
    }
    let mut cells: Vec<Cell> = finder.closed_cells().collect();
    cells.sort();
    cells
}

/// Connected-area id of every cell; impassable cells have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaLabels {
    grid: GridConfig,
    ids: Vec<Option<u32>>,
    count: u32,
}

impl AreaLabels {
    pub fn area(&self, cell: Cell) -> Option<u32> {
        self.ids.get(self.grid.index_of(cell)?).copied().flatten()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn same_area(&self, a: Cell, b: Cell) -> bool {
        matches!((self.area(a), self.area(b)), (Some(x), Some(y)) if x == y)
    }
}

/// Label every connected land and water region of `map`, numbering them from zero in scan
/// order.
pub fn label_areas(map: &TerrainMap) -> AreaLabels {
    let grid = map.grid();
    let mut labels = AreaLabels {
        grid,
        ids: vec![None; grid.cell_count()],
        count: 0,
    };
    let mut finder = PathFinder::new(AreaFloodPolicy::new(map.clone()));
    if finder.initialize(grid).is_err() {
        return labels;
    }

    for (cell, terrain) in map.cells() {
        let Some(index) = grid.index_of(cell) else {
            continue;
        };
        if !terrain.passable || labels.ids[index].is_some() {
            continue;
        }
        let id = labels.count;
        for member in flood_area(&mut finder, cell) {
            if let Some(i) = grid.index_of(member) {
                labels.ids[i] = Some(id);
            }
        }
        labels.count += 1;
    }

    debug!(areas = labels.count, cells = grid.cell_count(), "labelled areas");
    labels
}
