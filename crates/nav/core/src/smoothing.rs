//! Path post-processing: shortcut smoothing and interpolation.
use crate::geometry::{Position, Vec2};
use crate::grid::Grid;

/// Reduces a cell-by-cell path to the waypoints where it has to bend.
///
/// From each anchor the furthest later cell reachable in a straight line
/// becomes the next waypoint. A shortcut is only taken when every cell it
/// sweeps is walkable (see [`Grid::is_segment_clear`]), so an entity walking
/// the result never rounds onto a blocked cell. The first and last cells are
/// always kept. Because each waypoint is the furthest reachable one,
/// smoothing a smoothed path returns it unchanged.
pub fn smooth_path(grid: &Grid, path: &[Position]) -> Vec<Position> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut smoothed = vec![path[0]];
    let mut anchor = 0;

    while anchor < last {
        let mut furthest = anchor + 1;
        for candidate in (anchor + 2)..=last {
            if segment_is_walkable(grid, path[anchor], path[candidate]) {
                furthest = candidate;
            }
        }
        smoothed.push(path[furthest]);
        anchor = furthest;
    }

    smoothed
}

/// Inserts evenly spaced points so no two consecutive points are further
/// apart than `step`. Pure geometry; apply it after smoothing.
pub fn interpolate_path(path: &[Position], step: f32) -> Vec<Vec2> {
    if path.len() < 2 || step <= 0.0 || !step.is_finite() {
        return path.iter().map(|p| p.center()).collect();
    }

    let mut points = Vec::with_capacity(path.len());
    for pair in path.windows(2) {
        let (from, to) = (pair[0].center(), pair[1].center());
        let segments = (from.distance(to) / step).ceil().max(1.0) as usize;
        for i in 0..segments {
            points.push(from.lerp(to, i as f32 / segments as f32));
        }
    }
    if let Some(last) = path.last() {
        points.push(last.center());
    }
    points
}

/// Euclidean length of a polyline through cell centres.
pub fn path_length(path: &[Position]) -> f64 {
    path.windows(2)
        .map(|pair| f64::from(pair[0].euclidean(pair[1])))
        .sum()
}

fn segment_is_walkable(grid: &Grid, from: Position, to: Position) -> bool {
    grid.has_line_of_sight(from, to) && grid.is_segment_clear(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(len: i32) -> Vec<Position> {
        (0..len).map(|x| Position::new(x, 0)).collect()
    }

    #[test]
    fn open_straight_path_collapses_to_endpoints() {
        let grid = Grid::new(6, 1).unwrap();
        let smoothed = smooth_path(&grid, &straight(6));
        assert_eq!(smoothed, vec![Position::new(0, 0), Position::new(5, 0)]);
    }

    #[test]
    fn short_paths_are_returned_unchanged() {
        let grid = Grid::new(3, 3).unwrap();
        let path = vec![Position::new(0, 0), Position::new(1, 1)];
        assert_eq!(smooth_path(&grid, &path), path);
        assert!(smooth_path(&grid, &[]).is_empty());
    }

    #[test]
    fn keeps_corner_around_obstacle() {
        let grid: Grid = "...\n##.\n...".parse().unwrap();
        let path = vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(2, 2),
            Position::new(1, 2),
            Position::new(0, 2),
        ];
        let smoothed = smooth_path(&grid, &path);
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        assert!(smoothed.len() < path.len());
        for pair in smoothed.windows(2) {
            assert!(grid.is_segment_clear(pair[0], pair[1]));
        }
    }

    #[test]
    fn never_cuts_across_a_blocked_cell_that_sight_misses() {
        let grid: Grid = "..\n#.\n..".parse().unwrap();
        let path = vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(1, 2),
        ];
        let smoothed = smooth_path(&grid, &path);

        assert_eq!(
            smoothed,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 2)]
        );
        for pair in smoothed.windows(2) {
            assert!(grid.is_segment_clear(pair[0], pair[1]));
        }
    }

    #[test]
    fn interpolation_respects_step() {
        let points = interpolate_path(&[Position::new(0, 0), Position::new(2, 0)], 0.5);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec2::new(0.0, 0.0));
        assert_eq!(points[2], Vec2::new(1.0, 0.0));
        assert_eq!(points[4], Vec2::new(2.0, 0.0));
    }

    #[test]
    fn path_length_sums_segments() {
        let path = [Position::new(0, 0), Position::new(3, 4), Position::new(3, 6)];
        assert!((path_length(&path) - 7.0).abs() < 1e-6);
    }
}
