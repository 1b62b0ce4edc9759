// One planning cycle: observe, build, search, follow.
//
// `Navigator` owns a `NavConfig` and nothing else. Each `navigate` call
// samples the agent's pose, takes a fresh grid observation, builds a
// `GridMap` from it, searches from the agent's own cell to the requested
// goal, and hands the resulting path to the motion controller. Nothing is
// cached between calls; the grid is rebuilt every time.
//
// The observation is agent-relative: the agent stands in cell (0, 0, 0), and
// goals are given in the same frame. The pose sampled at the start of the
// cycle anchors the relative path in world space.
//
// See also: `controller.rs` for `move_to`, `pathfinding.rs` for `search`.

use crate::config::NavConfig;
use crate::controller::{MoveReport, move_to};
use crate::env::{Environment, GridObservation};
use crate::error::NavError;
use crate::grid::parse_grid;
use crate::pathfinding::{SearchOutcome, search};
use crate::types::Coordinate;
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct Navigator {
    config: NavConfig,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Search an observation for a route from the agent's cell to `goal`.
    pub fn plan(&self, observation: &GridObservation, goal: Coordinate) -> SearchOutcome {
        let grid = parse_grid(observation.blocks.as_slice(), &observation.bounds);
        search(
            Coordinate::ORIGIN,
            goal,
            &grid,
            &self.config.blocks,
            &self.config.search,
        )
    }

    /// Walk the agent to `goal`, given relative to its current cell.
    pub fn navigate<E: Environment>(
        &self,
        env: &mut E,
        goal: Coordinate,
    ) -> Result<MoveReport, NavError> {
        let origin = env
            .pose()
            .ok_or(NavError::PoseUnavailable { waypoint: 0 })?;
        let observation = env.observe_grid().ok_or(NavError::GridUnavailable)?;
        debug!(
            blocks = observation.blocks.len(),
            volume = observation.bounds.volume(),
            "grid observed"
        );

        let path = match self.plan(&observation, goal) {
            SearchOutcome::Found(path) => path,
            reason => {
                return Err(NavError::NoPath {
                    start: Coordinate::ORIGIN,
                    goal,
                    reason,
                });
            }
        };
        info!(%goal, steps = path.len(), "path found");

        move_to(env, &path, &origin, &self.config.controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::config::SearchConfig;
    use crate::types::{AgentPose, BoundingBox};
    use std::time::Duration;

    /// Fixed pose and grid; records commands.
    struct FixedEnv {
        pose: Option<AgentPose>,
        grid: Option<GridObservation>,
        sent: Vec<Command>,
    }

    impl Environment for FixedEnv {
        fn pose(&mut self) -> Option<AgentPose> {
            self.pose
        }

        fn observe_grid(&mut self) -> Option<GridObservation> {
            self.grid.clone()
        }

        fn send(&mut self, command: Command) {
            self.sent.push(command);
        }

        fn wait_tick(&mut self, _duration: Duration) {}
    }

    /// 3 x 3 stone floor with air at y = 0 and 1; agent at the center.
    fn small_platform() -> GridObservation {
        let bounds = BoundingBox::from([[-1, 1], [-1, 1], [-1, 1]]);
        let mut blocks = vec!["stone".to_string(); 9];
        blocks.extend(std::iter::repeat_n("air".to_string(), 18));
        GridObservation::new(blocks, bounds)
    }

    fn env(pose: Option<AgentPose>, grid: Option<GridObservation>) -> FixedEnv {
        FixedEnv {
            pose,
            grid,
            sent: Vec::new(),
        }
    }

    #[test]
    fn plan_finds_route_on_platform() {
        let nav = Navigator::default();
        let outcome = nav.plan(&small_platform(), Coordinate::new(1, 0, 1));
        let path = outcome.into_path().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.goal(), Some(Coordinate::new(1, 0, 1)));
    }

    #[test]
    fn missing_pose_is_reported_first() {
        let mut e = env(None, None);
        let err = Navigator::default().navigate(&mut e, Coordinate::new(1, 0, 0));
        assert_eq!(err, Err(NavError::PoseUnavailable { waypoint: 0 }));
    }

    #[test]
    fn missing_grid_is_reported() {
        let mut e = env(Some(AgentPose::new(0.5, 0.0, 0.5, 0.0)), None);
        let err = Navigator::default().navigate(&mut e, Coordinate::new(1, 0, 0));
        assert_eq!(err, Err(NavError::GridUnavailable));
        assert!(e.sent.is_empty());
    }

    #[test]
    fn goal_outside_observation_is_no_path() {
        let mut e = env(Some(AgentPose::new(0.5, 0.0, 0.5, 0.0)), Some(small_platform()));
        let goal = Coordinate::new(5, 0, 0);
        let err = Navigator::default().navigate(&mut e, goal).unwrap_err();
        assert_eq!(
            err,
            NavError::NoPath {
                start: Coordinate::ORIGIN,
                goal,
                reason: SearchOutcome::Unreachable,
            }
        );
    }

    #[test]
    fn tiny_budget_is_no_path_with_reason() {
        let config = NavConfig {
            search: SearchConfig {
                max_iterations: 1,
                ..SearchConfig::default()
            },
            ..NavConfig::default()
        };
        let mut e = env(Some(AgentPose::new(0.5, 0.0, 0.5, 0.0)), Some(small_platform()));
        let err = Navigator::new(config)
            .navigate(&mut e, Coordinate::new(1, 0, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            NavError::NoPath {
                reason: SearchOutcome::BudgetExhausted { iterations: 1 },
                ..
            }
        ));
    }

    #[test]
    fn goal_at_origin_succeeds_without_moving() {
        let mut e = env(Some(AgentPose::new(0.5, 0.0, 0.5, 0.0)), Some(small_platform()));
        let report = Navigator::default()
            .navigate(&mut e, Coordinate::ORIGIN)
            .unwrap();
        assert_eq!(report.waypoints_reached, 0);
        assert_eq!(e.sent, Command::NEUTRAL.to_vec());
    }
}
