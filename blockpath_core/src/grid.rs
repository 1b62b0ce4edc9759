// Sparse 3-D block grid built from a flat sensor list.
//
// Sensor bridges report the blocks around the agent as one flat list of ids
// plus the inclusive box the list covers. `parse_grid()` maps list index to
// cell using the box's fixed order (y outermost, z, x innermost; see
// `BoundingBox::cell_at`) and stores each id with its namespace prefix
// removed (`minecraft:stone` -> `stone`).
//
// The grid is sparse: a short list yields only the cells it reached, and a
// coordinate that was never filled is *unknown*. Unknown is neither open nor
// solid; `neighbors.rs` refuses to path through it.
//
// A `GridMap` is rebuilt for every planning request and never mutated after
// `parse_grid()` returns.
//
// See also: `types.rs` for `BoundingBox`, `neighbors.rs` for the movement
// rules evaluated on top of this grid.

use crate::blocks::BlockRules;
use crate::types::{BoundingBox, Coordinate};
use rustc_hash::FxHashMap;

/// Mapping from cell to block id. Absent cells are unknown.
#[derive(Clone, Debug, Default)]
pub struct GridMap {
    cells: FxHashMap<Coordinate, String>,
}

impl GridMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block id at `coord`, or `None` when the cell is unknown.
    pub fn get(&self, coord: Coordinate) -> Option<&str> {
        self.cells.get(&coord).map(String::as_str)
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Number of known cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate known cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &str)> {
        self.cells.iter().map(|(c, b)| (*c, b.as_str()))
    }

    /// `Some(true)` for a passable cell, `Some(false)` for solid, `None` for
    /// unknown.
    pub fn passable(&self, coord: Coordinate, rules: &BlockRules) -> Option<bool> {
        self.get(coord).map(|b| rules.is_passable(b))
    }

    /// Read the grid back in `bbox` order. Unknown cells yield `None`.
    pub fn flatten(&self, bbox: &BoundingBox) -> Vec<Option<&str>> {
        bbox.cells().map(|c| self.get(c)).collect()
    }

    /// Insert unless the cell is already set. Returns whether it was stored.
    fn insert_first(&mut self, coord: Coordinate, block: String) -> bool {
        use std::collections::hash_map::Entry;
        match self.cells.entry(coord) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(block);
                true
            }
        }
    }
}

impl FromIterator<(Coordinate, String)> for GridMap {
    /// Collect cells, keeping the first id seen for each coordinate.
    fn from_iter<I: IntoIterator<Item = (Coordinate, String)>>(iter: I) -> Self {
        let mut grid = GridMap::new();
        for (coord, block) in iter {
            grid.insert_first(coord, block);
        }
        grid
    }
}

/// Strip a leading `namespace:` qualifier from a block id.
pub fn strip_namespace(block: &str) -> &str {
    match block.split_once(':') {
        Some((_, name)) => name,
        None => block,
    }
}

/// Build a sparse grid from a flat block list covering `bbox`.
///
/// Consumes `min(blocks.len(), bbox.volume())` entries. A list shorter than
/// the box yields a partial grid; extra entries are ignored. Neither case is
/// an error.
pub fn parse_grid<S: AsRef<str>>(blocks: &[S], bbox: &BoundingBox) -> GridMap {
    let volume = bbox.volume();
    if blocks.len() != volume {
        tracing::warn!(
            "block list length {} does not match box volume {}",
            blocks.len(),
            volume
        );
    }

    let mut grid = GridMap::new();
    grid.cells.reserve(blocks.len().min(volume));
    for (i, block) in blocks.iter().take(volume).enumerate() {
        let id = strip_namespace(block.as_ref());
        grid.insert_first(bbox.cell_at(i), id.to_string());
    }

    tracing::debug!("grid mapped: {} cells loaded", grid.len());
    grid
}
