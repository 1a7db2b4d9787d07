use ai_path::{Cell, GridConfig, PathFinder, Topology};
use ai_path_policies::{flood_area, label_areas, AreaFloodPolicy, Terrain, TerrainMap};

const ROWS: [&str; 4] = ["..~~..", "..~~..", "######", "......"];

fn map(wrap_x: bool) -> TerrainMap {
    let grid = GridConfig::new(6, 4)
        .with_topology(Topology::Octile)
        .with_wrap(wrap_x, false);
    TerrainMap::parse(grid, &ROWS).expect("map")
}

#[test]
fn labels_land_and_water_separately() {
    let labels = label_areas(&map(false));
    assert_eq!(labels.count(), 4);
    assert!(labels.same_area(Cell::new(0, 0), Cell::new(1, 1)));
    assert!(labels.same_area(Cell::new(2, 0), Cell::new(3, 1)));
    assert!(!labels.same_area(Cell::new(1, 0), Cell::new(2, 0)));
    assert!(!labels.same_area(Cell::new(0, 0), Cell::new(5, 0)));
    assert!(!labels.same_area(Cell::new(0, 0), Cell::new(0, 3)));
    assert_eq!(labels.area(Cell::new(0, 2)), None);
    assert_eq!(labels.area(Cell::new(9, 9)), None);
}

#[test]
fn wrapping_joins_regions_across_the_seam() {
    let labels = label_areas(&map(true));
    assert_eq!(labels.count(), 3);
    assert!(labels.same_area(Cell::new(0, 0), Cell::new(5, 1)));
}

#[test]
fn flood_from_a_cell() {
    let map = map(false);
    let grid = map.grid();
    let mut finder = PathFinder::new(AreaFloodPolicy::new(map));
    finder.initialize(grid).expect("grid");

    let water = flood_area(&mut finder, Cell::new(3, 0));
    assert_eq!(
        water,
        vec![
            Cell::new(2, 0),
            Cell::new(2, 1),
            Cell::new(3, 0),
            Cell::new(3, 1)
        ]
    );
    assert_eq!(flood_area(&mut finder, Cell::new(0, 3)).len(), 6);
    assert!(flood_area(&mut finder, Cell::new(4, 2)).is_empty());
}

#[test]
fn editing_the_map_is_seen_by_the_next_flood() {
    let map = map(false);
    let grid = map.grid();
    let mut finder = PathFinder::new(AreaFloodPolicy::new(map));
    finder.initialize(grid).expect("grid");
    assert_eq!(flood_area(&mut finder, Cell::new(0, 0)).len(), 4);

    finder
        .policy_mut()
        .map_mut()
        .set(Cell::new(1, 2), Terrain::default());
    assert_eq!(flood_area(&mut finder, Cell::new(0, 0)).len(), 11);
}
