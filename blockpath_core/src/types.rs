// Core spatial types shared by the grid, search and controller.
//
// Defines the integer cell coordinate (`Coordinate`), the inclusive box that
// a flat block list covers (`BoundingBox`), the agent's continuous pose
// (`AgentPose`), and the continuous steering target derived from a cell
// (`Waypoint`).
//
// Axis conventions follow the block world the agent lives in:
// - X: horizontal, yaw 90 faces -X
// - Y: up (positive) / down (negative)
// - Z: horizontal, yaw 0 faces +Z
// Yaw is in degrees and increases clockwise when viewed from above.
//
// A `Coordinate` is used both as an absolute cell and as an offset relative
// to the agent's starting cell. Nothing in the type distinguishes the two;
// `Waypoint::from_relative` is the single place where a relative cell is
// anchored to a world pose.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// An integer grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The cell directly above (y + 1).
    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The cell directly below (y - 1).
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Manhattan distance over all three axes.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }

    /// Straight-line distance between cell corners.
    pub fn euclidean_distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for Coordinate {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// One inclusive `[min, max]` axis range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Number of cells covered. Zero when `max < min`.
    pub fn len(self) -> usize {
        if self.max < self.min {
            0
        } else {
            usize::try_from(i64::from(self.max) - i64::from(self.min) + 1).unwrap_or(usize::MAX)
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn contains(self, v: i32) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

/// The extent a flat block list covers, one inclusive range per axis.
///
/// Serialized the way sensor bridges report it:
/// `[[x_min, x_max], [y_min, y_max], [z_min, z_max]]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[[i32; 2]; 3]", into = "[[i32; 2]; 3]")]
pub struct BoundingBox {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl BoundingBox {
    pub const fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells in the box, saturating at `usize::MAX`.
    pub fn volume(&self) -> usize {
        self.x
            .len()
            .checked_mul(self.y.len())
            .and_then(|v| v.checked_mul(self.z.len()))
            .unwrap_or(usize::MAX)
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.x.contains(c.x) && self.y.contains(c.y) && self.z.contains(c.z)
    }

    /// The cell that list index `i` describes.
    ///
    /// Order is y outermost, then z, then x innermost, each ascending from its
    /// minimum. Callers must keep `i < volume()`.
    pub fn cell_at(&self, i: usize) -> Coordinate {
        let sx = self.x.len();
        let sz = self.z.len();
        let y = self.y.min as i64 + (i / sx.saturating_mul(sz)) as i64;
        let z = self.z.min as i64 + ((i / sx) % sz) as i64;
        let x = self.x.min as i64 + (i % sx) as i64;
        Coordinate::new(x as i32, y as i32, z as i32)
    }

    /// Inverse of `cell_at`: the list index describing `c`, if inside.
    pub fn index_of(&self, c: Coordinate) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        let sx = self.x.len();
        let sz = self.z.len();
        let dx = (i64::from(c.x) - i64::from(self.x.min)) as usize;
        let dy = (i64::from(c.y) - i64::from(self.y.min)) as usize;
        let dz = (i64::from(c.z) - i64::from(self.z.min)) as usize;
        dy.checked_mul(sz)?
            .checked_add(dz)?
            .checked_mul(sx)?
            .checked_add(dx)
    }

    /// Every cell of the box, in flat-list order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.volume()).map(move |i| self.cell_at(i))
    }
}

impl From<[[i32; 2]; 3]> for BoundingBox {
    fn from([x, y, z]: [[i32; 2]; 3]) -> Self {
        Self::new(
            AxisRange::new(x[0], x[1]),
            AxisRange::new(y[0], y[1]),
            AxisRange::new(z[0], z[1]),
        )
    }
}

impl From<BoundingBox> for [[i32; 2]; 3] {
    fn from(b: BoundingBox) -> Self {
        [[b.x.min, b.x.max], [b.y.min, b.y.max], [b.z.min, b.z.max]]
    }
}

// ---------------------------------------------------------------------------
// Continuous pose and targets
// ---------------------------------------------------------------------------

/// Continuous agent state, sampled once per control tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Degrees; 0 faces +Z, increasing clockwise.
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
}

impl AgentPose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch: 0.0,
        }
    }

    /// The grid cell containing the agent's feet.
    pub fn cell(&self) -> Coordinate {
        Coordinate::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// Absolute continuous target for the controller: the horizontal center of
/// a cell, at the cell's floor height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Target for an absolute cell.
    pub fn from_cell(cell: Coordinate) -> Self {
        Self::new(
            f64::from(cell.x) + 0.5,
            f64::from(cell.y),
            f64::from(cell.z) + 0.5,
        )
    }

    /// Target for a cell given relative to the cell `origin` stands in.
    pub fn from_relative(cell: Coordinate, origin: &AgentPose) -> Self {
        let base = origin.cell();
        Self::from_cell(base.offset(cell.x, cell.y, cell.z))
    }

    /// Horizontal (x/z) distance from a pose.
    pub fn horizontal_distance(&self, pose: &AgentPose) -> f64 {
        let dx = self.x - pose.x;
        let dz = self.z - pose.z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_neighbors_and_distances() {
        let a = Coordinate::new(1, 2, 3);
        assert_eq!(a.above(), Coordinate::new(1, 3, 3));
        assert_eq!(a.below(), Coordinate::new(1, 1, 3));
        assert_eq!(a.manhattan_distance(Coordinate::new(4, 0, 3)), 5);
        assert_eq!(Coordinate::ORIGIN.euclidean_distance(Coordinate::new(3, 4, 0)), 5.0);
    }

    #[test]
    fn axis_range_inverted_is_empty() {
        assert_eq!(AxisRange::new(3, 1).len(), 0);
        assert_eq!(AxisRange::new(-2, 2).len(), 5);
    }

    #[test]
    fn cell_order_is_y_then_z_then_x() {
        let bbox = BoundingBox::from([[0, 1], [10, 11], [5, 6]]);
        let cells: Vec<_> = bbox.cells().collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], Coordinate::new(0, 10, 5));
        assert_eq!(cells[1], Coordinate::new(1, 10, 5));
        assert_eq!(cells[2], Coordinate::new(0, 10, 6));
        assert_eq!(cells[4], Coordinate::new(0, 11, 5));
        assert_eq!(cells[7], Coordinate::new(1, 11, 6));
        for (i, c) in cells.iter().enumerate() {
            assert_eq!(bbox.index_of(*c), Some(i));
        }
        assert_eq!(bbox.index_of(Coordinate::new(2, 10, 5)), None);
    }

    #[test]
    fn huge_box_volume_saturates() {
        let full = [i32::MIN, i32::MAX];
        let wide = BoundingBox::from([full, full, full]);
        assert_eq!(wide.volume(), usize::MAX);
        assert_eq!(wide.cell_at(0), Coordinate::new(i32::MIN, i32::MIN, i32::MIN));
        assert_eq!(wide.cell_at(1), Coordinate::new(i32::MIN + 1, i32::MIN, i32::MIN));
        assert_eq!(wide.index_of(Coordinate::new(i32::MIN + 2, i32::MIN, i32::MIN)), Some(2));
        assert_eq!(wide.index_of(Coordinate::new(0, 0, 0)), None);
    }

    #[test]
    fn bounding_box_json_is_nested_pairs() {
        let bbox: BoundingBox = serde_json::from_str("[[-10, 10], [-2, 3], [-10, 10]]").unwrap();
        assert_eq!(bbox.x, AxisRange::new(-10, 10));
        assert_eq!(bbox.y, AxisRange::new(-2, 3));
        assert_eq!(bbox.volume(), 21 * 6 * 21);
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[[-10,10],[-2,3],[-10,10]]");
    }

    #[test]
    fn waypoint_from_relative_anchors_to_origin_cell() {
        let origin = AgentPose::new(10.7, 64.0, -3.2, 0.0);
        let wp = Waypoint::from_relative(Coordinate::new(1, 0, -1), &origin);
        assert_eq!(wp, Waypoint::new(11.5, 64.0, -4.5));
    }

    #[test]
    fn pose_cell_floors_negative_values() {
        let pose = AgentPose::new(-0.5, 63.9, 2.0, 0.0);
        assert_eq!(pose.cell(), Coordinate::new(-1, 63, 2));
    }
}
