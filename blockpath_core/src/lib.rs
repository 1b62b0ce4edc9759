// blockpath_core: voxel-grid navigation for an embodied agent.
//
// This crate turns a locally observed block grid into a traversable graph,
// searches it for a cheapest legal route, and steers an agent along that
// route one control tick at a time. It has no knowledge of how the grid or
// the pose is obtained: both arrive through the `Environment` trait, which
// the companion crate `blockpath_env` implements (kinematic mock and a
// line-oriented stream link).
//
// Module overview:
// - `types.rs`:       Coordinate, BoundingBox, AgentPose, Waypoint.
// - `grid.rs`:        GridMap + `parse_grid()` (flat block list -> sparse grid).
// - `blocks.rs`:      BlockRules: passability and hazard classification.
// - `neighbors.rs`:   Legal lateral / step-up / step-down moves from a cell.
// - `pathfinding.rs`: A* over the implicit neighbor graph, iteration-capped.
// - `command.rs`:     Typed actuator commands (move / turn / jump).
// - `env.rs`:         The `Environment` capability trait.
// - `controller.rs`:  Closed-loop waypoint follower with stall recovery.
// - `navigator.rs`:   One planning cycle: observe, build, search, follow.
// - `config.rs`:      NavConfig, every tunable, loaded from JSON.
// - `error.rs`:       NavError / ConfigError.
//
// Everything is passed explicitly: there is no global grid, environment or
// config. The grid is immutable once built and the controller holds the
// environment exclusively for the duration of one `move_to` call.

pub mod blocks;
pub mod command;
pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod grid;
pub mod navigator;
pub mod neighbors;
pub mod pathfinding;
pub mod types;

pub use blocks::BlockRules;
pub use command::Command;
pub use config::{ControllerConfig, NavConfig, RecoveryManeuver, SearchConfig, SupportPolicy};
pub use controller::{MotionController, MoveReport, SteerDecision, move_to};
pub use env::{Environment, GridObservation};
pub use error::{ConfigError, NavError};
pub use grid::{GridMap, parse_grid};
pub use navigator::Navigator;
pub use neighbors::neighbors;
pub use pathfinding::{Path, SearchOutcome, astar, search};
pub use types::{AgentPose, AxisRange, BoundingBox, Coordinate, Waypoint};
