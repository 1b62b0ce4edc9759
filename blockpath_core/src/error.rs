// Error types for blockpath.
//
// Search failures are not errors: `astar` returns `None` and `search`
// returns a `SearchOutcome`. Errors cover what can go wrong while acting on
// a plan (missing sensor data, a waypoint that never completes) and while
// loading configuration.

use crate::pathfinding::SearchOutcome;
use crate::types::{Coordinate, Waypoint};
use thiserror::Error;

/// Why a navigation attempt stopped early.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("agent pose unavailable (waypoint {waypoint})")]
    PoseUnavailable { waypoint: usize },

    #[error("block grid unavailable")]
    GridUnavailable,

    #[error("no path from {start} to {goal}: {reason}")]
    NoPath {
        start: Coordinate,
        goal: Coordinate,
        reason: SearchOutcome,
    },

    #[error("waypoint {index} at {target} not reached within {ticks} ticks")]
    WaypointTimeout {
        index: usize,
        target: Waypoint,
        ticks: u32,
    },
}

/// Failure to load a `NavConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}
