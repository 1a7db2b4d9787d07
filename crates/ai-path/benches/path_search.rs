use ai_path::{Cell, GridConfig, PathFinder, PathPolicy, Query, SearchFlags, Step, Topology};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Uniform terrain with a few long walls.
struct Maze {
    walls: Vec<bool>,
    width: i32,
}

impl Maze {
    fn new(width: i32, height: i32) -> Self {
        let mut walls = vec![false; (width * height) as usize];
        for x in (8..width).step_by(16) {
            let gap = (x * 7) % height;
            for y in 0..height {
                if (y - gap).abs() > 1 {
                    walls[(y * width + x) as usize] = true;
                }
            }
        }
        Self { walls, width }
    }
}

impl PathPolicy for Maze {
    type Context = ();
    type Facts = bool;

    fn facts(&self, _query: &Query<'_, ()>, cell: Cell) -> bool {
        self.walls[(cell.y * self.width + cell.x) as usize]
    }

    fn valid(&self, step: &Step<'_, (), bool>) -> bool {
        !*step.to_facts
    }

    fn cost(&self, _step: &Step<'_, (), bool>) -> i32 {
        1
    }

    fn heuristic(&self, query: &Query<'_, ()>, from: Cell) -> i32 {
        query.grid.distance(from, query.destination)
    }
}

fn bench_path_search(c: &mut Criterion) {
    let grid = GridConfig::new(128, 80)
        .with_wrap(true, false)
        .with_topology(Topology::Hex);
    let start = Cell::new(2, 40);
    let goals = [Cell::new(120, 10), Cell::new(60, 70), Cell::new(100, 40)];

    let mut group = c.benchmark_group("ai-path/hex");

    let mut finder = PathFinder::new(Maze::new(grid.width, grid.height));
    finder.initialize(grid).expect("grid");
    group.bench_function("fresh", |b| {
        b.iter(|| {
            for goal in goals {
                let found = finder.generate_path(start, goal, SearchFlags::NONE, false);
                black_box((found, finder.path_cost()));
            }
        })
    });

    group.bench_function("reuse_same_start", |b| {
        b.iter(|| {
            finder.force_reset();
            for goal in goals {
                let found = finder.generate_path(start, goal, SearchFlags::NONE, true);
                black_box((found, finder.path_cost()));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_path_search);
criterion_main!(benches);
