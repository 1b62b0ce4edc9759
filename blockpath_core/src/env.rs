// The capability boundary between navigation logic and the agent's world.
//
// Everything the search and the controller need from outside comes through
// `Environment`: a pose sample, a grid observation, a command sink and a
// tick wait. Nothing in this crate reaches for a global client or a clock;
// callers inject an implementation (see `blockpath_env` for a kinematic mock
// and a stream link).
//
// **Critical constraint:** calls happen in a fixed order within a tick:
// commands are sent, then `wait_tick`, then the next `pose()`. Implementations
// may rely on that ordering to advance simulated time only inside
// `wait_tick`.

use crate::command::Command;
use crate::types::{AgentPose, BoundingBox};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A snapshot of the blocks around the agent: a flat list plus the
/// agent-relative box it covers (see `grid::parse_grid`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridObservation {
    pub blocks: Vec<String>,
    pub bounds: BoundingBox,
}

impl GridObservation {
    pub fn new(blocks: Vec<String>, bounds: BoundingBox) -> Self {
        Self { blocks, bounds }
    }
}

pub trait Environment {
    /// Latest agent pose, or `None` if the sensor had nothing this tick.
    fn pose(&mut self) -> Option<AgentPose>;

    /// Latest block grid around the agent, or `None` if unavailable.
    fn observe_grid(&mut self) -> Option<GridObservation>;

    /// Issue one actuator command. Fire-and-forget.
    fn send(&mut self, command: Command);

    /// Block until the next control tick.
    fn wait_tick(&mut self, duration: Duration);

    /// Send the commands that leave the agent standing still.
    fn halt(&mut self) {
        for command in Command::NEUTRAL {
            self.send(command);
        }
    }
}
