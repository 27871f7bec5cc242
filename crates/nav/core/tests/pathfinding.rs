use nav_core::{
    Grid, Heuristic, Pathfinder, Position, RecordingObserver, SearchEvent, SearchOptions,
    smooth_path,
};

const MAZE: &str = "
    ..........
    .####.###.
    .#......#.
    .#.####.#.
    .#.#..#.#.
    ...#..#...
    .###.##.#.
    .....#..#.
    .###.#.##.
    ..........
";

fn all_pairs(grid: &Grid) -> Vec<(Position, Position)> {
    let cells: Vec<_> = grid.walkable_cells().collect();
    cells
        .iter()
        .flat_map(|&a| cells.iter().map(move |&b| (a, b)))
        .collect()
}

fn assert_valid_steps(grid: &Grid, path: &[Position], options: &SearchOptions) {
    for cell in path {
        assert!(grid.is_walkable(*cell), "path stepped onto {cell}");
    }
    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.is_adjacent(b), "{a} -> {b} is not a single step");
        let diagonal = a.x != b.x && a.y != b.y;
        if diagonal {
            assert!(options.allow_diagonals, "{a} -> {b} is diagonal");
            assert!(
                grid.is_walkable(Position::new(b.x, a.y)) && grid.is_walkable(Position::new(a.x, b.y)),
                "{a} -> {b} cuts a corner"
            );
        }
    }
}

#[test]
fn every_path_stays_on_walkable_adjacent_cells() {
    let grid: Grid = MAZE.parse().unwrap();
    for options in [SearchOptions::default(), SearchOptions::orthogonal()] {
        let finder = Pathfinder::new(options.clone());
        for (start, goal) in all_pairs(&grid) {
            let result = finder.find_path(&grid, start, goal);
            assert!(result.found, "{start} -> {goal} should be reachable");
            assert_eq!(result.start(), Some(start));
            assert_eq!(result.goal(), Some(goal));
            assert_valid_steps(&grid, &result.path, &options);
        }
    }
}

#[test]
fn same_start_and_goal_is_a_single_cell_path() {
    let grid: Grid = MAZE.parse().unwrap();
    let cell = Position::new(4, 4);
    let result = Pathfinder::default().find_path(&grid, cell, cell);
    assert!(result.found);
    assert_eq!(result.path, vec![cell]);
    assert_eq!(result.length, 0.0);
}

#[test]
fn open_grid_diagonal_example() {
    let grid = Grid::new(10, 10).unwrap();
    let start = Position::new(1, 1);
    let goal = Position::new(8, 8);
    let result = Pathfinder::default().find_path(&grid, start, goal);

    assert!(result.found);
    assert!(result.nodes_explored > 0);
    assert!(result.path.len() <= 12, "path has {} cells", result.path.len());
    assert_eq!(result.path.first(), Some(&start));
    assert_eq!(result.path.last(), Some(&goal));
}

#[test]
fn solid_wall_exhausts_reachable_component() {
    let mut grid = Grid::new(10, 10).unwrap();
    for y in 0..10 {
        grid.set_walkable(Position::new(5, y), false).unwrap();
    }

    let result = Pathfinder::default().find_path(&grid, Position::new(1, 1), Position::new(8, 8));

    assert!(!result.found);
    assert!(result.path.is_empty());
    assert_eq!(result.nodes_explored, 50, "left of the wall is 5 x 10 cells");
}

#[test]
fn unwalkable_endpoints_fail_without_exploring() {
    let mut grid = Grid::new(5, 5).unwrap();
    grid.set_walkable(Position::new(0, 0), false).unwrap();
    grid.set_walkable(Position::new(4, 4), false).unwrap();
    let finder = Pathfinder::default();

    let blocked_start = finder.find_path(&grid, Position::new(0, 0), Position::new(2, 2));
    let blocked_goal = finder.find_path(&grid, Position::new(2, 2), Position::new(4, 4));

    for result in [blocked_start, blocked_goal] {
        assert!(!result.found);
        assert!(result.path.is_empty());
        assert_eq!(result.nodes_explored, 0);
    }
}

#[test]
fn iteration_cap_reports_partial_work() {
    let grid = Grid::new(30, 30).unwrap();
    let finder = Pathfinder::new(SearchOptions::default().with_max_iterations(10));
    let result = finder.find_path(&grid, Position::new(0, 0), Position::new(29, 29));

    assert!(!result.found);
    assert!(result.path.is_empty());
    assert_eq!(result.nodes_explored, 10);
}

#[test]
fn orthogonal_manhattan_search_is_optimal() {
    let grid: Grid = MAZE.parse().unwrap();
    let finder = Pathfinder::new(SearchOptions::orthogonal().with_heuristic(Heuristic::Manhattan));
    let result = finder.find_path(&grid, Position::new(0, 0), Position::new(9, 9));
    assert!(result.found);
    // Open perimeter: 9 right + 9 down.
    assert_eq!(result.length, 18.0);
    assert_eq!(result.path.len(), 19);
}

#[test]
fn weighted_heuristic_explores_no_more_than_plain() {
    let grid = Grid::new(40, 40).unwrap();
    let start = Position::new(0, 20);
    let goal = Position::new(39, 20);
    let plain = Pathfinder::new(SearchOptions::default().with_heuristic(Heuristic::Euclidean))
        .find_path(&grid, start, goal);
    let greedy = Pathfinder::new(
        SearchOptions::default()
            .with_heuristic(Heuristic::Euclidean)
            .with_heuristic_weight(3.0),
    )
    .find_path(&grid, start, goal);

    assert!(plain.found && greedy.found);
    assert!(greedy.nodes_explored <= plain.nodes_explored);
}

#[test]
fn visited_events_match_explored_count_on_failure() {
    let grid: Grid = "..#..\n..#..\n..#..".parse().unwrap();
    let mut observer = RecordingObserver::new();
    let result = Pathfinder::default().find_path_observed(
        &grid,
        Position::new(0, 0),
        Position::new(4, 2),
        &mut observer,
    );

    assert!(!result.found);
    assert_eq!(result.nodes_explored, 6);
    assert_eq!(observer.visited().len(), 6);
    assert_eq!(observer.events.last(), Some(&SearchEvent::PathNotFound));
}

#[test]
fn smoothing_is_idempotent_and_preserves_endpoints() {
    let grid: Grid = MAZE.parse().unwrap();
    let finder = Pathfinder::default();
    for (start, goal) in all_pairs(&grid).into_iter().step_by(7) {
        let raw = finder.find_path(&grid, start, goal);
        let once = smooth_path(&grid, &raw.path);
        let twice = smooth_path(&grid, &once);

        assert_eq!(once.first(), raw.path.first());
        assert_eq!(once.last(), raw.path.last());
        assert_eq!(once, twice, "{start} -> {goal}");
        for pair in once.windows(2) {
            assert!(grid.has_line_of_sight(pair[0], pair[1]));
            assert!(grid.is_segment_clear(pair[0], pair[1]));
        }
    }
}
