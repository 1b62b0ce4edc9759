// A* search over the block grid.
//
// The graph is implicit: nodes are grid cells, edges are the legal moves
// produced by `neighbors.rs`, and every edge costs 1. Scores and back-pointers
// live in `FxHashMap`s keyed by `Coordinate` because the grid is sparse and
// rebuilt for every request. The open set is a `BinaryHeap` made into a
// min-heap by reversing `Ord` on `OpenEntry`.
//
// The heuristic is the horizontal Manhattan distance, floored by the vertical
// separation: `max(|dx| + |dz|, |dy|)`. Every move shifts exactly one block
// horizontally and at most one vertically, so it never overestimates. Plain
// 3-D Manhattan or Euclidean distance would: a staircase step covers one
// block of x and one of y for a single unit of cost. Earlier versions of the
// agent used Euclidean distance, so ties between equal-length paths can now
// resolve differently.
//
// Ties on f are broken toward the deeper entry (larger g), then by coordinate,
// so the same grid always yields the same path.
//
// The search gives up after `SearchConfig::max_iterations` heap pops. `astar`
// reports that exactly like an unreachable goal (`None`); `search` keeps the
// two apart for callers that care.
//
// See also: `neighbors.rs` for the edge function, `controller.rs` which
// consumes the resulting `Path`.

use crate::blocks::BlockRules;
use crate::config::SearchConfig;
use crate::grid::GridMap;
use crate::neighbors::neighbors;
use crate::types::{AgentPose, Coordinate, Waypoint};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Cells to visit after the start, ending at the goal.
///
/// The start cell is never included. A path with no steps means the agent is
/// already at the goal; "no path" is represented by the absence of a `Path`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Coordinate>,
}

impl Path {
    pub fn new(steps: Vec<Coordinate>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Coordinate] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total traversal cost (unit edge cost).
    pub fn cost(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn goal(&self) -> Option<Coordinate> {
        self.steps.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.steps.iter()
    }

    /// Anchor start-relative steps to the cell `origin` stands in.
    pub fn waypoints(&self, origin: &AgentPose) -> Vec<Waypoint> {
        self.steps
            .iter()
            .map(|&c| Waypoint::from_relative(c, origin))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Result of a search, keeping "impossible" and "gave up" apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Path),
    /// Start or goal unknown, or the open set ran dry.
    Unreachable,
    /// The iteration cap was hit before the goal was popped.
    BudgetExhausted { iterations: u32 },
}

impl SearchOutcome {
    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(path) => write!(f, "found {} steps", path.len()),
            SearchOutcome::Unreachable => write!(f, "goal unreachable"),
            SearchOutcome::BudgetExhausted { iterations } => {
                write!(f, "gave up after {iterations} iterations")
            }
        }
    }
}

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    cell: Coordinate,
    g: u32,
    f: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f is "greatest". On equal f the
        // deeper entry wins.
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

/// Lower bound on the number of moves between two cells.
pub fn heuristic(a: Coordinate, b: Coordinate) -> u32 {
    let horizontal = (a.x - b.x).unsigned_abs() + (a.z - b.z).unsigned_abs();
    horizontal.max((a.y - b.y).unsigned_abs())
}

/// Find the cheapest legal path from `start` to `goal`.
///
/// Returns `None` when either endpoint is unknown, the goal cannot be
/// reached, or the iteration cap is exceeded.
pub fn astar(
    start: Coordinate,
    goal: Coordinate,
    grid: &GridMap,
    rules: &BlockRules,
    config: &SearchConfig,
) -> Option<Path> {
    search(start, goal, grid, rules, config).into_path()
}

/// Like `astar`, but reports why no path was returned.
pub fn search(
    start: Coordinate,
    goal: Coordinate,
    grid: &GridMap,
    rules: &BlockRules,
    config: &SearchConfig,
) -> SearchOutcome {
    if !grid.contains(start) || !grid.contains(goal) {
        tracing::debug!("search {start} -> {goal}: endpoint not in grid");
        return SearchOutcome::Unreachable;
    }

    // g_score[cell] = cost of cheapest known path from start to cell.
    let mut g_score: FxHashMap<Coordinate, u32> = FxHashMap::default();
    // came_from[cell] = predecessor on that cheapest path.
    let mut came_from: FxHashMap<Coordinate, Coordinate> = FxHashMap::default();

    g_score.insert(start, 0);
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        cell: start,
        g: 0,
        f: heuristic(start, goal),
    });

    let mut iterations: u32 = 0;
    while let Some(current) = open.pop() {
        iterations += 1;
        if iterations > config.max_iterations {
            tracing::warn!(
                "search {start} -> {goal}: gave up after {} iterations",
                config.max_iterations
            );
            return SearchOutcome::BudgetExhausted {
                iterations: config.max_iterations,
            };
        }

        if current.cell == goal {
            let path = reconstruct_path(&came_from, goal);
            tracing::debug!(
                "search {start} -> {goal}: {} steps, {iterations} iterations",
                path.len()
            );
            return SearchOutcome::Found(path);
        }

        // Superseded by a cheaper push of the same cell.
        if g_score
            .get(&current.cell)
            .is_some_and(|&best| current.g > best)
        {
            continue;
        }

        let tentative_g = current.g + 1;
        for next in neighbors(current.cell, grid, rules, config.support) {
            if g_score.get(&next).is_none_or(|&g| tentative_g < g) {
                g_score.insert(next, tentative_g);
                came_from.insert(next, current.cell);
                open.push(OpenEntry {
                    cell: next,
                    g: tentative_g,
                    f: tentative_g + heuristic(next, goal),
                });
            }
        }
    }

    tracing::debug!("search {start} -> {goal}: open set exhausted after {iterations} iterations");
    SearchOutcome::Unreachable
}

/// Walk back-pointers from the goal. The start has no predecessor, so it is
/// left out.
fn reconstruct_path(came_from: &FxHashMap<Coordinate, Coordinate>, goal: Coordinate) -> Path {
    let mut steps = Vec::new();
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        steps.push(current);
        current = prev;
    }
    steps.reverse();
    Path::new(steps)
}
