// Closed-loop waypoint follower.
//
// Drives the agent through a sequence of absolute `Waypoint`s one control
// tick at a time. Each tick samples a fresh pose, decides the move / turn /
// jump rates for that instant (`MotionController::steer`, a pure function of
// pose and target), sends them, and waits for the environment to advance.
//
// Tick structure for one waypoint:
//
//   1. Sample pose. Missing pose aborts the whole move with
//      `NavError::PoseUnavailable`.
//   2. Arrived (horizontal distance under `arrival_tolerance` and vertical
//      offset under `vertical_tolerance`)? Move to the next waypoint.
//   3. Stall tracking: a distance change under `stuck_epsilon` counts as a
//      stalled tick; more than `stuck_tick_threshold` in a row triggers the
//      configured `RecoveryManeuver`, then the count starts over.
//   4. Steer: jump while the target is above the agent, turn in place on
//      large heading errors, walk (reduced or full rate) otherwise.
//   5. Timeout: more than `waypoint_timeout_ticks` on a single waypoint
//      aborts with `NavError::WaypointTimeout`.
//   6. `Environment::wait_tick`.
//
// Neutral commands are sent on every exit, success or failure. Waypoints
// already reached stay reached; nothing is rolled back.
//
// Yaw convention: degrees, 0 faces +Z, and a positive turn rate increases
// yaw. The bearing to a target at offset (dx, dz) is `atan2(-dx, dz)`.
//
// See also: `env.rs` for the `Environment` trait, `config.rs` for
// `ControllerConfig`, `navigator.rs` which calls `move_to` after a search.

use crate::command::Command;
use crate::config::{ControllerConfig, RecoveryManeuver};
use crate::env::Environment;
use crate::error::NavError;
use crate::pathfinding::Path;
use crate::types::{AgentPose, Waypoint};
use tracing::{debug, info, warn};

/// Rates chosen for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteerDecision {
    pub move_rate: f64,
    pub turn_rate: f64,
    pub jump: bool,
    /// Signed heading error in degrees, in [-180, 180).
    pub heading_error: f64,
}

impl SteerDecision {
    fn commands(&self) -> [Command; 3] {
        [
            Command::Jump(self.jump),
            Command::Turn(self.turn_rate),
            Command::Move(self.move_rate),
        ]
    }
}

/// Summary of a completed `follow_waypoints` run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub waypoints_reached: usize,
    /// Control ticks spent across all waypoints.
    pub ticks: u32,
    /// Stall recoveries performed.
    pub recoveries: u32,
}

/// Yaw (degrees) that faces from the agent toward a horizontal offset.
pub fn bearing(dx: f64, dz: f64) -> f64 {
    (-dx).atan2(dz).to_degrees()
}

/// Shortest signed rotation from `yaw` to `target`, in [-180, 180).
pub fn heading_error(target: f64, yaw: f64) -> f64 {
    (target - yaw + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Clone, Debug, Default)]
pub struct MotionController {
    config: ControllerConfig,
}

impl MotionController {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Whether `pose` is close enough to `target` to count as arrived.
    pub fn arrived(&self, pose: &AgentPose, target: &Waypoint) -> bool {
        target.horizontal_distance(pose) < self.config.arrival_tolerance
            && (target.y - pose.y).abs() < self.config.vertical_tolerance
    }

    /// Decide this tick's rates from the current pose alone.
    pub fn steer(&self, pose: &AgentPose, target: &Waypoint) -> SteerDecision {
        let c = &self.config;
        let dx = target.x - pose.x;
        let dy = target.y - pose.y;
        let dz = target.z - pose.z;

        let error = heading_error(bearing(dx, dz), pose.yaw);
        let (turn_rate, move_rate) = if error.abs() > c.heading_deadband_deg {
            let turn = (error * c.turn_gain).clamp(-c.max_turn_rate, c.max_turn_rate);
            (turn, 0.0)
        } else if error.abs() > c.fine_heading_deg {
            (0.0, c.reduced_forward_rate)
        } else {
            (0.0, c.forward_rate)
        };

        SteerDecision {
            move_rate,
            turn_rate,
            jump: dy > c.jump_threshold,
            heading_error: error,
        }
    }

    /// Drive through `waypoints` in order. Stops at the first failure.
    pub fn follow_waypoints<E: Environment>(
        &self,
        env: &mut E,
        waypoints: &[Waypoint],
    ) -> Result<MoveReport, NavError> {
        let mut report = MoveReport::default();
        for (index, target) in waypoints.iter().enumerate() {
            if let Err(err) = self.reach(env, index, target, &mut report) {
                env.halt();
                warn!(%err, reached = report.waypoints_reached, "move aborted");
                return Err(err);
            }
            report.waypoints_reached += 1;
            debug!(index, %target, ticks = report.ticks, "waypoint reached");
        }
        env.halt();
        info!(
            waypoints = report.waypoints_reached,
            ticks = report.ticks,
            recoveries = report.recoveries,
            "move complete"
        );
        Ok(report)
    }

    /// Run the control loop for a single waypoint.
    fn reach<E: Environment>(
        &self,
        env: &mut E,
        index: usize,
        target: &Waypoint,
        report: &mut MoveReport,
    ) -> Result<(), NavError> {
        let c = &self.config;
        let mut ticks: u32 = 0;
        let mut stalled: u32 = 0;
        let mut last_dist = f64::INFINITY;

        loop {
            let Some(pose) = env.pose() else {
                warn!(waypoint = index, "pose unavailable");
                return Err(NavError::PoseUnavailable { waypoint: index });
            };
            if self.arrived(&pose, target) {
                return Ok(());
            }

            let dist = target.horizontal_distance(&pose);
            if (dist - last_dist).abs() < c.stuck_epsilon {
                stalled += 1;
            } else {
                stalled = 0;
            }
            last_dist = dist;

            if stalled > c.stuck_tick_threshold {
                warn!(waypoint = index, %target, dist, "stuck, recovering");
                self.recover(env);
                report.recoveries += 1;
                stalled = 0;
            }

            for command in self.steer(&pose, target).commands() {
                env.send(command);
            }

            ticks += 1;
            report.ticks += 1;
            if ticks > c.waypoint_timeout_ticks {
                return Err(NavError::WaypointTimeout {
                    index,
                    target: *target,
                    ticks,
                });
            }
            env.wait_tick(c.tick_duration());
        }
    }

    fn recover<E: Environment>(&self, env: &mut E) {
        let c = &self.config;
        env.send(Command::Jump(true));
        if c.recovery == RecoveryManeuver::ReverseAndJump {
            env.send(Command::Turn(0.0));
            env.send(Command::Move(c.reverse_rate));
        }
        env.wait_tick(c.recovery_duration());
        env.send(Command::Jump(false));
        if c.recovery == RecoveryManeuver::ReverseAndJump {
            env.send(Command::Move(0.0));
        }
    }
}

/// Follow a relative `path`, anchored at the cell `origin` stands in.
pub fn move_to<E: Environment>(
    env: &mut E,
    path: &Path,
    origin: &AgentPose,
    config: &ControllerConfig,
) -> Result<MoveReport, NavError> {
    let waypoints = path.waypoints(origin);
    debug!(steps = waypoints.len(), "following path");
    MotionController::new(config.clone()).follow_waypoints(env, &waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::GridObservation;
    use crate::types::Coordinate;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays a fixed pose script; the last pose repeats forever. Records
    /// every command and wait.
    #[derive(Default)]
    struct ScriptedEnv {
        poses: VecDeque<Option<AgentPose>>,
        last: Option<AgentPose>,
        sent: Vec<Command>,
        waits: Vec<Duration>,
    }

    impl ScriptedEnv {
        fn still(pose: AgentPose) -> Self {
            Self {
                last: Some(pose),
                ..Self::default()
            }
        }

        fn script(poses: Vec<Option<AgentPose>>) -> Self {
            Self {
                poses: poses.into(),
                ..Self::default()
            }
        }

        fn jumps_held(&self) -> usize {
            self.sent.iter().filter(|c| **c == Command::Jump(true)).count()
        }
    }

    impl Environment for ScriptedEnv {
        fn pose(&mut self) -> Option<AgentPose> {
            match self.poses.pop_front() {
                Some(p) => {
                    self.last = p;
                    p
                }
                None => self.last,
            }
        }

        fn observe_grid(&mut self) -> Option<GridObservation> {
            None
        }

        fn send(&mut self, command: Command) {
            self.sent.push(command);
        }

        fn wait_tick(&mut self, duration: Duration) {
            self.waits.push(duration);
        }
    }

    fn controller() -> MotionController {
        MotionController::default()
    }

    #[test]
    fn heading_error_wraps_to_shortest_turn() {
        assert_eq!(heading_error(10.0, 350.0), 20.0);
        assert_eq!(heading_error(350.0, 10.0), -20.0);
        assert_eq!(heading_error(180.0, 0.0), -180.0);
        assert_eq!(heading_error(-90.0, 90.0), -180.0);
        assert_eq!(heading_error(45.0, 45.0), 0.0);
    }

    #[test]
    fn bearing_matches_yaw_convention() {
        assert_eq!(bearing(0.0, 1.0), 0.0);
        assert!((bearing(-1.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((bearing(1.0, 0.0) + 90.0).abs() < 1e-9);
        assert!((bearing(0.0, -1.0).abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn target_behind_turns_without_full_forward() {
        // Facing +Z, target directly behind at -Z.
        let pose = AgentPose::new(0.5, 0.0, 0.5, 0.0);
        let target = Waypoint::new(0.5, 0.0, -3.5);
        let d = controller().steer(&pose, &target);
        assert_eq!(d.heading_error.abs(), 180.0);
        assert!(d.turn_rate != 0.0);
        assert!(d.turn_rate.abs() <= 0.6);
        assert!(d.move_rate < 0.7);
        assert_eq!(d.move_rate, 0.0);
    }

    #[test]
    fn steer_rates_by_heading_band() {
        let c = controller();
        let pose = AgentPose::new(0.0, 0.0, 0.0, 0.0);

        let ahead = c.steer(&pose, &Waypoint::new(0.0, 0.0, 5.0));
        assert_eq!((ahead.turn_rate, ahead.move_rate), (0.0, 0.7));

        // 20 degrees off: inside the deadband, outside the fine band.
        let yaw_20 = AgentPose::new(0.0, 0.0, 0.0, -20.0);
        let slight = c.steer(&yaw_20, &Waypoint::new(0.0, 0.0, 5.0));
        assert_eq!((slight.turn_rate, slight.move_rate), (0.0, 0.4));

        // 45 degrees off: proportional turn, no walking.
        let yaw_45 = AgentPose::new(0.0, 0.0, 0.0, 45.0);
        let wide = c.steer(&yaw_45, &Waypoint::new(0.0, 0.0, 5.0));
        assert!((wide.turn_rate + 0.45).abs() < 1e-9);
        assert_eq!(wide.move_rate, 0.0);
    }

    #[test]
    fn jumps_only_when_target_is_above() {
        let c = controller();
        let pose = AgentPose::new(0.0, 0.0, 0.0, 0.0);
        assert!(c.steer(&pose, &Waypoint::new(0.0, 1.0, 2.0)).jump);
        assert!(!c.steer(&pose, &Waypoint::new(0.0, 0.4, 2.0)).jump);
        assert!(!c.steer(&pose, &Waypoint::new(0.0, -1.0, 2.0)).jump);
    }

    #[test]
    fn arrival_needs_both_tolerances() {
        let c = controller();
        let target = Waypoint::new(1.5, 0.0, 1.5);
        assert!(c.arrived(&AgentPose::new(1.4, 0.0, 1.6, 0.0), &target));
        assert!(!c.arrived(&AgentPose::new(1.0, 0.0, 1.5, 0.0), &target));
        assert!(!c.arrived(&AgentPose::new(1.5, 1.2, 1.5, 0.0), &target));
    }

    #[test]
    fn empty_sequence_succeeds_and_halts() {
        let mut env = ScriptedEnv::default();
        let report = controller().follow_waypoints(&mut env, &[]).unwrap();
        assert_eq!(report, MoveReport::default());
        assert_eq!(env.sent, Command::NEUTRAL.to_vec());
    }

    #[test]
    fn approaching_pose_reaches_each_waypoint() {
        let mut poses = Vec::new();
        for i in 0..=10 {
            poses.push(Some(AgentPose::new(0.5, 0.0, 0.5 + 0.1 * f64::from(i), 0.0)));
        }
        let mut env = ScriptedEnv::script(poses);
        let target = Waypoint::new(0.5, 0.0, 1.5);
        let report = controller().follow_waypoints(&mut env, &[target]).unwrap();
        assert_eq!(report.waypoints_reached, 1);
        assert_eq!(report.recoveries, 0);
        // Arrival is seen on the 8th sample (distance 0.3).
        assert_eq!(report.ticks, 7);
        assert_eq!(env.waits.len(), 7);
        assert_eq!(env.waits[0], Duration::from_millis(50));
        assert!(env.sent.contains(&Command::Move(0.7)));
        assert_eq!(&env.sent[env.sent.len() - 3..], &Command::NEUTRAL);
    }

    #[test]
    fn immobile_agent_recovers_then_times_out() {
        let c = MotionController::new(ControllerConfig {
            stuck_tick_threshold: 10,
            waypoint_timeout_ticks: 50,
            ..ControllerConfig::default()
        });
        let mut env = ScriptedEnv::still(AgentPose::new(0.5, 0.0, 0.5, 0.0));
        let target = Waypoint::new(0.5, 0.0, 4.5);

        let err = c.follow_waypoints(&mut env, &[target]).unwrap_err();
        assert_eq!(
            err,
            NavError::WaypointTimeout {
                index: 0,
                target,
                ticks: 51,
            }
        );
        // First sample sets the baseline; ticks 2..=12 are stalled, so the
        // first recovery fires on tick 12 and then every 11 ticks.
        assert_eq!(env.jumps_held(), 4);
        assert!(env.waits.contains(&Duration::from_millis(200)));
        assert_eq!(&env.sent[env.sent.len() - 3..], &Command::NEUTRAL);
    }

    #[test]
    fn reverse_recovery_backs_up() {
        let c = MotionController::new(ControllerConfig {
            stuck_tick_threshold: 2,
            waypoint_timeout_ticks: 5,
            recovery: RecoveryManeuver::ReverseAndJump,
            ..ControllerConfig::default()
        });
        let mut env = ScriptedEnv::still(AgentPose::new(0.5, 0.0, 0.5, 0.0));
        let result = c.follow_waypoints(&mut env, &[Waypoint::new(0.5, 0.0, 3.5)]);
        assert!(matches!(result, Err(NavError::WaypointTimeout { .. })));
        assert!(env.sent.contains(&Command::Move(-0.5)));
    }

    #[test]
    fn pose_dropout_aborts_with_waypoint_index() {
        let mut env = ScriptedEnv::script(vec![
            Some(AgentPose::new(0.5, 0.0, 1.5, 0.0)),
            Some(AgentPose::new(0.5, 0.0, 1.6, 0.0)),
            None,
        ]);
        let waypoints = [Waypoint::new(0.5, 0.0, 1.5), Waypoint::new(0.5, 0.0, 2.5)];
        let err = controller().follow_waypoints(&mut env, &waypoints).unwrap_err();
        assert_eq!(err, NavError::PoseUnavailable { waypoint: 1 });
        assert_eq!(&env.sent[env.sent.len() - 3..], &Command::NEUTRAL);
    }

    #[test]
    fn move_to_anchors_path_at_origin_cell() {
        let origin = AgentPose::new(10.2, 64.0, -3.7, 0.0);
        // Agent already standing on the single target.
        let path = Path::new(vec![Coordinate::new(0, 0, 0)]);
        let mut env = ScriptedEnv::still(AgentPose::new(10.5, 64.0, -3.5, 0.0));
        let report = move_to(&mut env, &path, &origin, &ControllerConfig::default()).unwrap();
        assert_eq!(report.waypoints_reached, 1);
        assert_eq!(report.ticks, 0);
    }
}
