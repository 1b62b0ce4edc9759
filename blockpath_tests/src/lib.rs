// Scenario builders for the blockpath integration tests.
//
// A `Scenario` is an agent-relative block observation (flat list + bounding
// box) that can be turned into every form the pipeline consumes: a
// `GridObservation` for the navigator, a `GridMap` for direct search, or a
// world-space terrain anchored under a `MockEnvironment`'s agent so the mock
// collides with the same blocks the search planned over.
//
// Nothing here bypasses the real code paths: grids are built with
// `parse_grid`, motion runs through the real controller and mock.
//
// See also: `tests/pipeline.rs` for the scenarios themselves.

use blockpath_core::{
    AgentPose, BlockRules, BoundingBox, Coordinate, GridMap, GridObservation, parse_grid,
};
use blockpath_env::{MockConfig, MockEnvironment};
use tracing_subscriber::EnvFilter;

/// Yaw facing +X.
pub const FACING_EAST: f64 = 270.0;

/// Install a test-friendly tracing subscriber once. Filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pose standing in the middle of `cell`.
pub fn pose_in_cell(cell: Coordinate, yaw: f64) -> AgentPose {
    AgentPose::new(
        f64::from(cell.x) + 0.5,
        f64::from(cell.y),
        f64::from(cell.z) + 0.5,
        yaw,
    )
}

#[derive(Clone, Debug)]
pub struct Scenario {
    bounds: BoundingBox,
    blocks: Vec<String>,
}

impl Scenario {
    /// `sx` x `sz` stone floor at y = -1 with `air_layers` layers of air
    /// above it. The agent's cell (0, 0, 0) is the corner at minimum x and z.
    pub fn platform(sx: i32, sz: i32, air_layers: i32) -> Self {
        let bounds = BoundingBox::from([[0, sx - 1], [-1, air_layers - 1], [0, sz - 1]]);
        let blocks = bounds
            .cells()
            .map(|c| {
                let block = if c.y < 0 { "stone" } else { "air" };
                block.to_string()
            })
            .collect();
        Self { bounds, blocks }
    }

    /// Replace one cell. Cells outside the box are ignored.
    pub fn set(&mut self, cell: Coordinate, block: &str) -> &mut Self {
        if let Some(i) = self.bounds.index_of(cell) {
            self.blocks[i] = block.to_string();
        }
        self
    }

    /// Fill every cell in the inclusive box `from..=to`.
    pub fn fill(&mut self, from: Coordinate, to: Coordinate, block: &str) -> &mut Self {
        for y in from.y..=to.y {
            for z in from.z..=to.z {
                for x in from.x..=to.x {
                    self.set(Coordinate::new(x, y, z), block);
                }
            }
        }
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn observation(&self) -> GridObservation {
        GridObservation::new(self.blocks.clone(), self.bounds)
    }

    pub fn grid(&self) -> GridMap {
        parse_grid(self.blocks.as_slice(), &self.bounds)
    }

    /// The scenario in world coordinates, with relative (0, 0, 0) at `anchor`.
    pub fn terrain_at(&self, anchor: Coordinate) -> GridMap {
        self.bounds
            .cells()
            .zip(&self.blocks)
            .map(|(c, b)| (anchor.offset(c.x, c.y, c.z), b.clone()))
            .collect()
    }

    /// A mock agent at `pose`, standing on this scenario anchored at its
    /// cell, observing exactly the scenario's box.
    pub fn mock(&self, pose: AgentPose) -> MockEnvironment {
        self.mock_with(pose, MockConfig::default())
    }

    pub fn mock_with(&self, pose: AgentPose, config: MockConfig) -> MockEnvironment {
        let config = MockConfig {
            view: self.bounds,
            ..config
        };
        MockEnvironment::with_config(pose, config)
            .with_terrain(self.terrain_at(pose.cell()), BlockRules::strict())
    }
}
