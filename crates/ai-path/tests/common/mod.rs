#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use ai_path::{
    Cell, GridConfig, NodeView, PathFinder, PathPolicy, Query, Step, Topology, TurnData,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellFacts {
    pub blocked: bool,
    pub cost: i32,
}

/// Grid policy with blocked cells, per-cell entry costs and optional long-range edges.
#[derive(Debug, Default)]
pub struct GridPolicy {
    pub blocked: HashSet<Cell>,
    pub costs: HashMap<Cell, i32>,
    pub extras: HashMap<Cell, Vec<Cell>>,
    pub rejected_destinations: HashSet<Cell>,
    pub use_heuristic: bool,
    /// Each step advances the turn counter by one.
    pub turn_per_step: bool,
    pub version: u64,
    pub begun: usize,
    pub ended: Vec<bool>,
}

impl GridPolicy {
    pub fn with_heuristic(mut self) -> Self {
        self.use_heuristic = true;
        self
    }

    pub fn block(&mut self, cell: Cell) {
        self.blocked.insert(cell);
        self.version += 1;
    }

    pub fn unblock(&mut self, cell: Cell) {
        self.blocked.remove(&cell);
        self.version += 1;
    }

    pub fn set_cost(&mut self, cell: Cell, cost: i32) {
        self.costs.insert(cell, cost);
        self.version += 1;
    }

    pub fn cost_of(&self, cell: Cell) -> i32 {
        self.costs.get(&cell).copied().unwrap_or(1)
    }
}

impl PathPolicy for GridPolicy {
    type Context = u32;
    type Facts = CellFacts;

    fn facts(&self, _query: &Query<'_, u32>, cell: Cell) -> CellFacts {
        CellFacts {
            blocked: self.blocked.contains(&cell),
            cost: self.cost_of(cell),
        }
    }

    fn valid(&self, step: &Step<'_, u32, CellFacts>) -> bool {
        !step.to_facts.blocked
    }

    fn cost(&self, step: &Step<'_, u32, CellFacts>) -> i32 {
        step.to_facts.cost
    }

    fn is_destination_valid(&self, query: &Query<'_, u32>) -> bool {
        !self.rejected_destinations.contains(&query.destination)
    }

    fn heuristic(&self, query: &Query<'_, u32>, from: Cell) -> i32 {
        if self.use_heuristic {
            query.grid.distance(from, query.destination)
        } else {
            0
        }
    }

    fn turn_data(&self, step: &Step<'_, u32, CellFacts>) -> TurnData {
        if self.turn_per_step {
            TurnData::new(0, step.parent.turn.turn + 1)
        } else {
            step.parent.turn
        }
    }

    fn extra_children(&self, _query: &Query<'_, u32>, node: &NodeView, out: &mut Vec<Cell>) {
        if let Some(extras) = self.extras.get(&node.cell) {
            out.extend_from_slice(extras);
        }
    }

    fn begin_search(&mut self, _query: &Query<'_, u32>) {
        self.begun += 1;
    }

    fn end_search(&mut self, _query: &Query<'_, u32>, found: bool) {
        self.ended.push(found);
    }

    fn signature(&self) -> u64 {
        self.version
    }
}

pub fn octile(width: i32, height: i32) -> GridConfig {
    GridConfig::new(width, height).with_topology(Topology::Octile)
}

pub fn hex(width: i32, height: i32) -> GridConfig {
    GridConfig::new(width, height).with_topology(Topology::Hex)
}

pub fn finder(grid: GridConfig, policy: GridPolicy) -> PathFinder<GridPolicy> {
    let mut finder = PathFinder::new(policy);
    finder.initialize(grid).expect("valid grid");
    finder
}

/// Brute-force reference: plain Dijkstra with a binary heap, honouring the first eight extras.
pub fn dijkstra(grid: GridConfig, policy: &GridPolicy, start: Cell, goal: Cell) -> Option<i32> {
    let mut dist: HashMap<Cell, i32> = HashMap::new();
    let mut heap = BinaryHeap::new();
    dist.insert(start, 0);
    heap.push(Reverse((0, start)));

    while let Some(Reverse((d, cell))) = heap.pop() {
        if cell == goal {
            return Some(d);
        }
        if dist.get(&cell).is_some_and(|&best| d > best) {
            continue;
        }

        let mut next: Vec<Cell> = grid.neighbors(cell).to_vec();
        if let Some(extras) = policy.extras.get(&cell) {
            for &extra in extras.iter().take(ai_path::MAX_EXTRA_CHILDREN) {
                if let Some(wrapped) = grid.wrap(extra) {
                    if wrapped != cell && !next.contains(&wrapped) {
                        next.push(wrapped);
                    }
                }
            }
        }

        for n in next {
            if policy.blocked.contains(&n) {
                continue;
            }
            let nd = d + policy.cost_of(n);
            if dist.get(&n).is_none_or(|&best| nd < best) {
                dist.insert(n, nd);
                heap.push(Reverse((nd, n)));
            }
        }
    }
    None
}

/// Consecutive waypoints must be adjacent or joined by a declared extra edge.
pub fn assert_connected(grid: GridConfig, policy: &GridPolicy, cells: &[Cell]) {
    for pair in cells.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let extra = policy
            .extras
            .get(&a)
            .is_some_and(|extras| extras.iter().any(|&e| grid.wrap(e) == Some(b)));
        assert!(
            grid.is_neighbor(a, b) || extra,
            "{a:?} -> {b:?} is not an edge"
        );
    }
}
