// Data-driven navigation configuration.
//
// Every tunable used by the search and the controller lives in `NavConfig`,
// loaded from JSON at startup and never mutated afterwards. Each struct is
// `#[serde(default)]`, so a config file only needs the fields it overrides.
//
// Parameter groups:
// - `SearchConfig`:     iteration cap and how unknown support cells are treated.
// - `BlockRules`:       passable allow-list and hazard set (see `blocks.rs`).
// - `ControllerConfig`: tick length, tolerances, steering gains, stall
//                       detection and recovery, per-waypoint timeout.
//
// See also: `pathfinding.rs` and `controller.rs`, the two readers of these
// values, and `error.rs` for `ConfigError`.

use crate::blocks::BlockRules;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// How the neighbor generator treats a support cell missing from the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportPolicy {
    /// The cell below a target must be known and solid.
    #[default]
    RequireKnown,
    /// An unknown cell below a target counts as footing.
    AllowUnknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum heap pops before the search gives up.
    pub max_iterations: u32,
    pub support: SupportPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            support: SupportPolicy::RequireKnown,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// What the controller does once the agent has stalled for too long.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryManeuver {
    /// Hold jump for the recovery duration.
    #[default]
    Jump,
    /// Back up while holding jump.
    ReverseAndJump,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Wait between control ticks, in milliseconds.
    pub tick_duration_ms: u64,
    /// Horizontal distance (blocks) below which a waypoint counts as reached.
    pub arrival_tolerance: f64,
    /// Vertical offset (blocks) that must also be undercut to arrive.
    pub vertical_tolerance: f64,
    /// Hold jump while the target is this much higher than the agent.
    pub jump_threshold: f64,
    /// Heading errors (degrees) above this turn in place.
    pub heading_deadband_deg: f64,
    /// Heading errors (degrees) above this, but inside the deadband, walk
    /// at the reduced rate.
    pub fine_heading_deg: f64,
    /// Turn rate per degree of heading error.
    pub turn_gain: f64,
    pub max_turn_rate: f64,
    pub forward_rate: f64,
    pub reduced_forward_rate: f64,
    /// Distance change (blocks) per tick that still counts as no progress.
    pub stuck_epsilon: f64,
    /// Consecutive stalled ticks tolerated before recovering.
    pub stuck_tick_threshold: u32,
    pub recovery: RecoveryManeuver,
    /// How long the recovery maneuver is held, in milliseconds.
    pub recovery_duration_ms: u64,
    /// Move rate used while reversing (negative is backwards).
    pub reverse_rate: f64,
    /// Ticks allowed per waypoint before the whole move fails.
    pub waypoint_timeout_ticks: u32,
}

impl ControllerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_duration_ms)
    }

    pub fn recovery_duration(&self) -> Duration {
        Duration::from_millis(self.recovery_duration_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: 50,
            arrival_tolerance: 0.35,
            vertical_tolerance: 1.0,
            jump_threshold: 0.5,
            heading_deadband_deg: 30.0,
            fine_heading_deg: 10.0,
            turn_gain: 0.01,
            max_turn_rate: 0.6,
            forward_rate: 0.7,
            reduced_forward_rate: 0.4,
            stuck_epsilon: 0.01,
            stuck_tick_threshold: 100,
            recovery: RecoveryManeuver::Jump,
            recovery_duration_ms: 200,
            reverse_rate: -0.5,
            waypoint_timeout_ticks: 400,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level navigation configuration. Loaded from JSON, never mutated at
/// runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub search: SearchConfig,
    pub blocks: BlockRules,
    pub controller: ControllerConfig,
}

impl NavConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
