//! A* search over a [`Grid`].
//!
//! # Edge cases (in order of precedence)
//!
//! 1. `start == goal` is an immediate success with a one-element path
//! 2. An unwalkable (or out-of-bounds) start fails without exploring
//! 3. An unwalkable (or out-of-bounds) goal fails without exploring
//!
//! Failure is a value (`found == false`), never an error: callers decide
//! whether to snap to a nearby cell or abandon the move.
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::config::SearchOptions;
use crate::events::{NullObserver, SearchEvent, SearchObserver, VisitedNode};
use crate::frontier::PriorityFrontier;
use crate::geometry::Position;
use crate::grid::Grid;

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Outcome of a single search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Cells from start to goal, both inclusive. Empty when not found.
    pub path: Vec<Position>,
    pub found: bool,
    /// Nodes taken off the frontier (including partial work on failure).
    pub nodes_explored: u32,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
    /// Travel cost along `path` (sum of step costs, or segment lengths once smoothed).
    pub length: f64,
}

impl PathResult {
    pub fn not_found(nodes_explored: u32, elapsed: Duration) -> Self {
        Self {
            path: Vec::new(),
            found: false,
            nodes_explored,
            elapsed,
            length: 0.0,
        }
    }

    pub fn start(&self) -> Option<Position> {
        self.path.first().copied()
    }

    pub fn goal(&self) -> Option<Position> {
        self.path.last().copied()
    }

    /// Number of waypoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Per-search bookkeeping for one cell. Lives only for one `find_path` call.
#[derive(Clone, Copy, Debug)]
pub struct SearchNode {
    pub position: Position,
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub parent: Option<usize>,
    pub opened: bool,
    pub closed: bool,
}

impl SearchNode {
    fn unvisited(position: Position) -> Self {
        Self {
            position,
            g: f64::INFINITY,
            h: 0.0,
            f: f64::INFINITY,
            parent: None,
            opened: false,
            closed: false,
        }
    }
}

/// A* pathfinder parameterized by [`SearchOptions`].
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    options: SearchOptions,
}

impl Pathfinder {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Finds a path without reporting progress.
    pub fn find_path(&self, grid: &Grid, start: Position, goal: Position) -> PathResult {
        self.find_path_observed(grid, start, goal, &mut NullObserver)
    }

    /// Finds a path, reporting each dequeue and the outcome to `observer`.
    pub fn find_path_observed(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        observer: &mut dyn SearchObserver,
    ) -> PathResult {
        let started = Instant::now();
        let listening = observer.is_listening();

        if listening {
            observer.on_event(SearchEvent::PathStart { start, goal });
        }

        if start == goal {
            if listening {
                observer.on_event(SearchEvent::PathFound { path: vec![start] });
            }
            return PathResult {
                path: vec![start],
                found: true,
                nodes_explored: 0,
                elapsed: started.elapsed(),
                length: 0.0,
            };
        }

        for (label, endpoint) in [("start", start), ("goal", goal)] {
            if grid.is_walkable(endpoint) {
                continue;
            }
            if listening {
                if !grid.contains(endpoint) {
                    observer.on_event(SearchEvent::Error {
                        message: format!("{label} {endpoint} is outside the grid"),
                    });
                }
                observer.on_event(SearchEvent::PathNotFound);
            }
            return PathResult::not_found(0, started.elapsed());
        }

        let options = &self.options;
        let mut nodes: Vec<SearchNode> = (0..grid.len())
            .map(|index| SearchNode::unvisited(grid.position_of(index)))
            .collect();
        let mut frontier = PriorityFrontier::new();
        let mut explored: u32 = 0;

        // Both endpoints were checked walkable, so both are in bounds.
        let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
            return PathResult::not_found(0, started.elapsed());
        };

        {
            let node = &mut nodes[start_index];
            node.g = 0.0;
            node.h = options.heuristic.estimate(start, goal);
            node.f = options.heuristic_weight * node.h;
            node.opened = true;
            frontier.push(start, node.f);
        }

        while let Some((current, _)) = frontier.pop() {
            if explored >= options.max_iterations {
                break;
            }

            let Some(current_index) = grid.index(current) else {
                continue;
            };
            nodes[current_index].closed = true;
            explored += 1;

            if listening {
                let node = &nodes[current_index];
                observer.on_event(SearchEvent::NodeVisited {
                    node: VisitedNode {
                        position: current,
                        g: node.g,
                        h: node.h,
                        f: node.f,
                    },
                });
            }

            if current_index == goal_index {
                let path = reconstruct(&nodes, goal_index);
                if listening {
                    observer.on_event(SearchEvent::PathFound { path: path.clone() });
                }
                return PathResult {
                    path,
                    found: true,
                    nodes_explored: explored,
                    elapsed: started.elapsed(),
                    length: nodes[goal_index].g,
                };
            }

            let current_g = nodes[current_index].g;
            for (neighbor, step_cost) in neighbors(grid, current, options) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let node = &mut nodes[neighbor_index];
                if node.closed {
                    continue;
                }

                let tentative = current_g + step_cost;
                if tentative < node.g {
                    node.g = tentative;
                    if !node.opened {
                        node.h = options.heuristic.estimate(neighbor, goal);
                        node.opened = true;
                    }
                    node.f = node.g + options.heuristic_weight * node.h;
                    node.parent = Some(current_index);
                    frontier.push(neighbor, node.f);
                }
            }
        }

        if listening {
            observer.on_event(SearchEvent::PathNotFound);
        }
        PathResult::not_found(explored, started.elapsed())
    }
}

/// Legal moves out of `position` with their step cost.
pub fn neighbors(
    grid: &Grid,
    position: Position,
    options: &SearchOptions,
) -> ArrayVec<(Position, f64), 8> {
    let mut out = ArrayVec::new();

    for (dx, dy) in ORTHOGONAL {
        let next = position.offset(dx, dy);
        if grid.is_walkable(next) {
            out.push((next, 1.0));
        }
    }

    if !options.allow_diagonals {
        return out;
    }

    for (dx, dy) in DIAGONAL {
        let next = position.offset(dx, dy);
        if !grid.is_walkable(next) {
            continue;
        }
        if !options.cut_corners
            && !(grid.is_walkable(position.offset(dx, 0)) && grid.is_walkable(position.offset(0, dy)))
        {
            continue;
        }
        out.push((next, options.diagonal_weight));
    }

    out
}

fn reconstruct(nodes: &[SearchNode], goal_index: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        path.push(nodes[index].position);
        cursor = nodes[index].parent;
    }
    path.reverse();
    path
}
