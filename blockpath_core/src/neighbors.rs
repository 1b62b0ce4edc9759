// Legal single-step moves on the block grid.
//
// From a cell the agent may move one block along a cardinal horizontal axis,
// optionally stepping up or down one block at the same time. A target cell is
// legal when:
//
//   1. the target and the cell above it (headroom) are known;
//   2. both are passable;
//   3. the cell below the target is known and solid (under
//      `SupportPolicy::AllowUnknown` an unknown support also counts);
//   4. for a step up, the cell two above the origin is unknown or passable,
//      so the agent's head clears while it climbs;
//   5. the target is not a hazard under the active `BlockRules`.
//
// Unknown cells are never entered. Enumeration order is direction-major
// (+Z, -Z, +X, -X), vertical-minor (level, up, down); A* does not depend on
// it beyond tie-breaking.
//
// See also: `blocks.rs` for the predicates, `pathfinding.rs` which drives
// this generator as the implicit graph's edge function.

use crate::blocks::BlockRules;
use crate::config::SupportPolicy;
use crate::grid::GridMap;
use crate::types::Coordinate;
use smallvec::SmallVec;

/// Cardinal horizontal steps as (dx, dz).
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Vertical deltas tried for each direction.
const VERTICAL_DELTAS: [i32; 3] = [0, 1, -1];

/// At most 4 directions x 3 vertical deltas.
pub type NeighborList = SmallVec<[Coordinate; 12]>;

/// All cells reachable from `cell` in one legal step.
pub fn neighbors(
    cell: Coordinate,
    grid: &GridMap,
    rules: &BlockRules,
    support: SupportPolicy,
) -> NeighborList {
    let mut out = NeighborList::new();

    // Checked once: only matters for step-ups.
    let ceiling_clear = grid
        .get(cell.offset(0, 2, 0))
        .is_none_or(|b| rules.is_passable(b));

    for (dx, dz) in DIRECTIONS {
        for dy in VERTICAL_DELTAS {
            if dy == 1 && !ceiling_clear {
                continue;
            }
            let target = cell.offset(dx, dy, dz);
            if can_stand_at(target, grid, rules, support) {
                out.push(target);
            }
        }
    }
    out
}

/// Whether the agent's body fits in `target` with footing beneath it.
pub fn can_stand_at(
    target: Coordinate,
    grid: &GridMap,
    rules: &BlockRules,
    support: SupportPolicy,
) -> bool {
    let (Some(body), Some(head)) = (grid.get(target), grid.get(target.above())) else {
        return false;
    };
    if !rules.is_passable(body) || !rules.is_passable(head) {
        return false;
    }
    if rules.is_hazard(body) {
        return false;
    }
    match grid.get(target.below()) {
        Some(floor) => rules.is_solid(floor),
        None => support == SupportPolicy::AllowUnknown,
    }
}
