use std::collections::HashSet;

use ai_path::{
    Cell, GridConfig, Layer, ListKind, PartialMovePolicy, PathFinder, PathPolicy, Query,
    SearchFlags, Step, Topology, TurnData, TwoLayerPathFinder,
};

const WEIGHT: i32 = 100;

/// Every step spends one move; a unit may not end its turn on a `no_stop` cell.
#[derive(Debug, Default)]
struct Walker {
    base_moves: i32,
    no_stop: HashSet<Cell>,
}

impl Walker {
    fn new(base_moves: i32) -> Self {
        Self {
            base_moves,
            no_stop: HashSet::new(),
        }
    }

    fn next_turn(&self, from: TurnData) -> TurnData {
        if from.moves > 0 {
            TurnData::new(from.moves - 1, from.turn)
        } else {
            TurnData::new(self.base_moves - 1, from.turn + 1)
        }
    }
}

impl PathPolicy for Walker {
    type Context = ();
    type Facts = bool;

    fn facts(&self, _query: &Query<'_, ()>, cell: Cell) -> bool {
        self.no_stop.contains(&cell)
    }

    fn valid(&self, step: &Step<'_, (), bool>) -> bool {
        let no_stop = *step.to_facts;
        !(no_stop && self.next_turn(step.parent.turn).moves == 0)
    }

    fn cost(&self, _step: &Step<'_, (), bool>) -> i32 {
        WEIGHT
    }

    fn initial_turn(&self, _query: &Query<'_, ()>) -> TurnData {
        TurnData::new(self.base_moves, 1)
    }

    fn turn_data(&self, step: &Step<'_, (), bool>) -> TurnData {
        self.next_turn(step.parent.turn)
    }
}

impl PartialMovePolicy for Walker {
    fn movement_weight(&self) -> i32 {
        WEIGHT
    }

    fn stop_matters(&self, _query: &Query<'_, ()>, _cell: Cell, _turn: TurnData, no_stop: &bool) -> bool {
        !*no_stop
    }
}

fn corridor(len: i32) -> GridConfig {
    GridConfig::new(len, 1).with_topology(Topology::Octile)
}

fn two_layer(grid: GridConfig, walker: Walker) -> TwoLayerPathFinder<Walker> {
    let mut finder = PathFinder::two_layer(walker);
    finder.initialize(grid).expect("grid");
    finder
}

#[test]
fn straight_corridor_counts_turns() {
    let mut finder = two_layer(corridor(6), Walker::new(2));
    assert!(finder.generate_path(Cell::new(0, 0), Cell::new(5, 0), SearchFlags::NONE, false));

    assert_eq!(finder.path_cost(), Some(5 * WEIGHT));
    assert_eq!(finder.path_turns(), Some(3));
    assert_eq!(finder.turn_end_cell(), Some(Cell::new(2, 0)));

    let turns: Vec<(i32, i32)> = finder.path().iter().map(|s| (s.moves, s.turn)).collect();
    assert_eq!(
        turns,
        vec![(2, 1), (1, 1), (0, 1), (1, 2), (0, 2), (1, 3)]
    );
    assert_eq!(finder.check_invariants(), Ok(()));
}

#[test]
fn waits_early_instead_of_ending_on_a_forbidden_cell() {
    let mut walker = Walker::new(2);
    walker.no_stop.insert(Cell::new(2, 0));

    // Single layer: the only way through ends a turn on the forbidden cell.
    let mut single = PathFinder::new(Walker {
        base_moves: 2,
        no_stop: walker.no_stop.clone(),
    });
    single.initialize(corridor(6)).expect("grid");
    assert!(!single.generate_path(Cell::new(0, 0), Cell::new(5, 0), SearchFlags::NONE, false));

    let mut finder = two_layer(corridor(6), walker);
    assert!(finder.generate_path(Cell::new(0, 0), Cell::new(5, 0), SearchFlags::NONE, false));
    // One move wasted on (1, 0).
    assert_eq!(finder.path_cost(), Some(6 * WEIGHT));
    assert_eq!(finder.path_turns(), Some(3));
    assert_eq!(finder.turn_end_cell(), Some(Cell::new(1, 0)));

    let path = finder.path();
    assert_eq!(path.len(), 6);
    assert_eq!((path[1].cell(), path[1].moves, path[1].turn), (Cell::new(1, 0), 0, 1));
    assert_eq!((path[2].cell(), path[2].moves, path[2].turn), (Cell::new(2, 0), 1, 2));

    let waited = finder.partial_move_node(Cell::new(1, 0)).expect("overlay node");
    assert_eq!(waited.layer(), Layer::Overlay);
    assert_eq!(waited.list(), ListKind::Closed);
    assert!(finder.has_overlay());
    assert!(finder.stats().overlay_clones > 0);
    assert_eq!(finder.check_invariants(), Ok(()));
}

#[test]
fn overlay_never_undercuts_its_primary() {
    let grid = GridConfig::new(8, 8).with_topology(Topology::Hex);
    let mut walker = Walker::new(3);
    for cell in [Cell::new(3, 3), Cell::new(4, 2), Cell::new(2, 5)] {
        walker.no_stop.insert(cell);
    }
    let mut finder = two_layer(grid, walker);
    assert!(finder.generate_path(Cell::new(0, 0), Cell::new(7, 7), SearchFlags::NONE, true));
    assert!(finder.generate_path(Cell::new(0, 0), Cell::new(5, 1), SearchFlags::NONE, true));

    for y in 0..8 {
        for x in 0..8 {
            let cell = Cell::new(x, y);
            let (Some(primary), Some(overlay)) = (finder.node(cell), finder.partial_move_node(cell))
            else {
                continue;
            };
            if primary.list() == ListKind::Unlisted || overlay.list() == ListKind::Unlisted {
                continue;
            }
            assert!(overlay.known_cost() >= primary.known_cost(), "{cell:?}");
            assert_eq!(overlay.turn().moves, 0);
        }
    }
    assert_eq!(finder.check_invariants(), Ok(()));
}

#[test]
fn overlay_matches_single_layer_when_stopping_is_free() {
    let grid = GridConfig::new(9, 7).with_topology(Topology::Hex);
    let mut single = PathFinder::new(Walker::new(2));
    single.initialize(grid).expect("grid");
    let mut finder = two_layer(grid, Walker::new(2));

    for goal in [Cell::new(8, 6), Cell::new(4, 0), Cell::new(0, 6)] {
        assert!(single.generate_path(Cell::new(1, 3), goal, SearchFlags::NONE, false));
        assert!(finder.generate_path(Cell::new(1, 3), goal, SearchFlags::NONE, false));
        assert_eq!(finder.path_cost(), single.path_cost());
        assert_eq!(finder.path_turns(), single.path_turns());
    }
}

#[test]
fn deinit_drops_the_overlay() {
    let grid = corridor(6);
    let mut finder = two_layer(grid, Walker::new(2));
    assert!(finder.generate_path(Cell::new(0, 0), Cell::new(5, 0), SearchFlags::NONE, true));
    assert!(finder.has_overlay());

    finder.deinit();
    finder.initialize(grid).expect("grid");
    assert!(!finder.has_overlay());
    assert!(finder.partial_move_node(Cell::new(1, 0)).is_none());
    for x in 0..6 {
        let node = finder.node(Cell::new(x, 0)).expect("node");
        assert_eq!(node.list(), ListKind::Unlisted);
        assert_eq!(node.known_cost(), 0);
        assert_eq!(node.parent(), None);
    }
}
