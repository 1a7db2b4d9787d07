use ai_path::{Cell, GridConfig, PathFinder, Topology};
use ai_path_policies::{
    trade_route, TerrainMap, TradeDomain, TradeRoutePolicy, LAND_STEP, WATER_STEP,
};

fn finder() -> PathFinder<TradeRoutePolicy> {
    let grid = GridConfig::new(8, 3).with_topology(Topology::Octile);
    let map = TerrainMap::parse(grid, &["H~~#~~~H", "..####..", "........"]).expect("map");
    let mut finder = PathFinder::new(TradeRoutePolicy::new(map));
    finder.initialize(grid).expect("grid");
    finder
}

#[test]
fn land_routes_go_around_the_ridge() {
    let mut finder = finder();
    let cost = trade_route(&mut finder, Cell::new(0, 1), Cell::new(7, 1), TradeDomain::Land);
    assert_eq!(cost, Some(7 * LAND_STEP));
    assert!(finder.path().iter().all(|step| step.y != 0));
}

#[test]
fn water_routes_need_a_lane_between_harbours() {
    let mut finder = finder();
    let west = Cell::new(0, 0);
    let east = Cell::new(7, 0);
    assert_eq!(trade_route(&mut finder, west, east, TradeDomain::Water), None);

    // Lanes between open water cells are ignored.
    finder.policy_mut().add_lane(Cell::new(2, 0), Cell::new(4, 0));
    assert_eq!(trade_route(&mut finder, west, east, TradeDomain::Water), None);

    finder.policy_mut().add_lane(west, east);
    assert_eq!(finder.policy().lanes_from(east), &[west]);
    let cost = trade_route(&mut finder, west, east, TradeDomain::Water);
    assert_eq!(cost, Some(7 * WATER_STEP));
    assert_eq!(
        finder.path().iter().map(|step| step.cell()).collect::<Vec<_>>(),
        vec![west, east]
    );
}

#[test]
fn cities_off_the_domain_are_rejected() {
    let mut finder = finder();
    assert_eq!(
        trade_route(&mut finder, Cell::new(1, 0), Cell::new(7, 1), TradeDomain::Land),
        None
    );
    assert_eq!(
        trade_route(&mut finder, Cell::new(0, 0), Cell::new(0, 2), TradeDomain::Water),
        None
    );
    assert_eq!(finder.stats().searches, 0);
}

#[test]
fn repeated_routes_reuse_the_search() {
    let mut finder = finder();
    let from = Cell::new(0, 2);
    assert!(trade_route(&mut finder, from, Cell::new(7, 2), TradeDomain::Land).is_some());
    assert!(trade_route(&mut finder, from, Cell::new(3, 2), TradeDomain::Land).is_some());
    assert_eq!(finder.stats().reused, 1);
    assert_eq!(finder.path_cost(), Some(3 * LAND_STEP));

    // Switching domain is a context change.
    assert_eq!(
        trade_route(&mut finder, from, Cell::new(7, 2), TradeDomain::Water),
        None
    );
    assert_eq!(finder.stats().reused, 1);
}
