// Kinematic mock agent.
//
// `MockEnvironment` stands in for the live agent connection. It keeps a pose
// and the most recent move / turn / jump rates, and advances one step per
// `wait_tick`:
//
//   1. yaw += turn_rate * turn_deg_per_tick (+ jitter while acting);
//   2. the agent walks move_rate * speed_per_tick along its heading
//      (yaw 0 faces +Z, so the step is (-sin yaw, cos yaw));
//   3. with a terrain, walking into a solid block is refused unless jump is
//      held and the block above is clear, in which case the agent steps up;
//   4. with a terrain, an open cell under the feet drops the agent one block.
//
// Without a terrain the agent moves freely in the plane. Grid observations
// come either from an explicit `GridObservation` or are cut from the terrain
// around the agent's current cell using `MockConfig::view`.
//
// Extra switches for tests: `immobile()` freezes the pose no matter what is
// commanded, and `drop_pose_at` makes chosen pose samples come back empty.
// Every command is logged in order.
//
// See also: `jitter.rs` for the heading noise, `link.rs` for the stream-backed
// counterpart.

use crate::jitter::HeadingJitter;
use blockpath_core::{
    AgentPose, BlockRules, BoundingBox, Command, Coordinate, Environment, GridMap, GridObservation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Physical parameters of the mock agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Blocks walked per tick at move rate 1.0.
    pub speed_per_tick: f64,
    /// Degrees turned per tick at turn rate 1.0.
    pub turn_deg_per_tick: f64,
    /// Heading noise amplitude, degrees per tick.
    pub jitter_deg: f64,
    pub seed: u64,
    /// Observation box, relative to the agent's cell.
    pub view: BoundingBox,
    /// Block reported for observed cells missing from the terrain.
    pub fill_block: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            speed_per_tick: 0.25,
            turn_deg_per_tick: 30.0,
            jitter_deg: 0.0,
            seed: 0,
            view: BoundingBox::from([[-10, 10], [-2, 3], [-10, 10]]),
            fill_block: "air".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MockEnvironment {
    config: MockConfig,
    pose: AgentPose,
    move_rate: f64,
    turn_rate: f64,
    jumping: bool,
    terrain: Option<(GridMap, BlockRules)>,
    observation: Option<GridObservation>,
    immobile: bool,
    jitter: HeadingJitter,
    pose_dropouts: BTreeSet<u64>,
    pose_samples: u64,
    commands: Vec<Command>,
    ticks: u64,
    elapsed: Duration,
}

impl MockEnvironment {
    pub fn new(pose: AgentPose) -> Self {
        Self::with_config(pose, MockConfig::default())
    }

    pub fn with_config(pose: AgentPose, config: MockConfig) -> Self {
        let jitter = HeadingJitter::new(config.seed, config.jitter_deg);
        Self {
            config,
            pose,
            move_rate: 0.0,
            turn_rate: 0.0,
            jumping: false,
            terrain: None,
            observation: None,
            immobile: false,
            jitter,
            pose_dropouts: BTreeSet::new(),
            pose_samples: 0,
            commands: Vec::new(),
            ticks: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Collide with and stand on `terrain` (world coordinates).
    pub fn with_terrain(mut self, terrain: GridMap, rules: BlockRules) -> Self {
        self.terrain = Some((terrain, rules));
        self
    }

    /// Report this observation from `observe_grid`, ignoring the terrain.
    pub fn with_observation(mut self, observation: GridObservation) -> Self {
        self.observation = Some(observation);
        self
    }

    /// Ignore all commands; the pose never changes.
    pub fn immobile(mut self) -> Self {
        self.immobile = true;
        self
    }

    /// Make the `sample`-th call to `pose()` (0-based) return `None`.
    pub fn drop_pose_at(mut self, sample: u64) -> Self {
        self.pose_dropouts.insert(sample);
        self
    }

    /// Current pose, without counting as a sample.
    pub fn current_pose(&self) -> AgentPose {
        self.pose
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total simulated time handed to `wait_tick`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// Advance the kinematic model by one tick.
    fn step(&mut self) {
        if self.immobile {
            return;
        }
        let acting = self.move_rate != 0.0 || self.turn_rate != 0.0;
        let noise = if acting { self.jitter.sample() } else { 0.0 };
        self.pose.yaw = (self.pose.yaw + self.turn_rate * self.config.turn_deg_per_tick + noise)
            .rem_euclid(360.0);

        let dist = self.move_rate * self.config.speed_per_tick;
        let rad = self.pose.yaw.to_radians();
        let next_x = self.pose.x - rad.sin() * dist;
        let next_z = self.pose.z + rad.cos() * dist;

        let Some((terrain, rules)) = &self.terrain else {
            self.pose.x = next_x;
            self.pose.z = next_z;
            return;
        };

        let fill = self.config.fill_block.as_str();
        let open = |c: Coordinate| rules.is_passable(terrain.get(c).unwrap_or(fill));
        let feet = Coordinate::new(
            next_x.floor() as i32,
            self.pose.y.floor() as i32,
            next_z.floor() as i32,
        );

        if open(feet) && open(feet.above()) {
            self.pose.x = next_x;
            self.pose.z = next_z;
        } else if self.jumping && open(feet.above()) && open(feet.offset(0, 2, 0)) {
            self.pose.x = next_x;
            self.pose.z = next_z;
            self.pose.y = f64::from(feet.y + 1);
            debug!(y = self.pose.y, "mock stepped up");
        }

        let below = self.pose.cell().below();
        if terrain.contains(below) && open(below) {
            self.pose.y -= 1.0;
            debug!(y = self.pose.y, "mock fell");
        }
    }

    /// Cut an agent-relative observation out of the terrain.
    fn observe_terrain(&self) -> Option<GridObservation> {
        let (terrain, _) = self.terrain.as_ref()?;
        let base = self.pose.cell();
        let view = self.config.view;
        let blocks = view
            .cells()
            .map(|c| {
                terrain
                    .get(base.offset(c.x, c.y, c.z))
                    .unwrap_or(self.config.fill_block.as_str())
                    .to_string()
            })
            .collect();
        Some(GridObservation::new(blocks, view))
    }
}

impl Environment for MockEnvironment {
    fn pose(&mut self) -> Option<AgentPose> {
        let sample = self.pose_samples;
        self.pose_samples += 1;
        if self.pose_dropouts.contains(&sample) {
            debug!(sample, "mock pose dropout");
            return None;
        }
        Some(self.pose)
    }

    fn observe_grid(&mut self) -> Option<GridObservation> {
        match &self.observation {
            Some(obs) => Some(obs.clone()),
            None => self.observe_terrain(),
        }
    }

    fn send(&mut self, command: Command) {
        match command.clamped() {
            Command::Move(rate) => self.move_rate = rate,
            Command::Turn(rate) => self.turn_rate = rate,
            Command::Jump(held) => self.jumping = held,
        }
        self.commands.push(command);
    }

    fn wait_tick(&mut self, duration: Duration) {
        self.step();
        self.ticks += 1;
        self.elapsed += duration;
    }
}
