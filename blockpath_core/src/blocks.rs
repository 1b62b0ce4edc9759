// Block classification: open space, solid support, hazard.
//
// A block id is passable when it is on the allow-list or contains one of the
// decorative-plant markers (every `*_flower`, `fern`, `large_fern`, ...).
// Everything else is solid. Hazards are a separate, explicit set: the strict
// rules exclude cells an agent could physically enter but should not (fire,
// berry bushes), the permissive rules exclude nothing.
//
// Classification is a pure function of the id string. It never consults the
// grid and never fails; an id nobody has heard of is simply solid.
//
// See also: `neighbors.rs`, the only caller that combines these predicates
// into movement rules, and `config.rs`, which embeds `BlockRules` in
// `NavConfig` so deployments can swap the sets without recompiling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DEFAULT_PASSABLE: &[&str] = &[
    "air",
    "cave_air",
    "void_air",
    "grass",
    "tall_grass",
    "poppy",
    "dandelion",
    "cornflower",
    "torch",
    "wall_torch",
    "oak_sapling",
    "wheat",
    "sugar_cane",
    "lever",
    "redstone_torch",
    "redstone_wire",
    "tripwire",
    "tripwire_hook",
    "rail",
];

const DEFAULT_PLANT_MARKERS: &[&str] = &["flower", "fern"];

const DEFAULT_HAZARDS: &[&str] = &["lava", "fire", "magma_block", "cactus", "sweet_berry_bush"];

/// Passability and hazard sets used by the neighbor generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockRules {
    /// Exact ids the agent can occupy.
    pub passable: BTreeSet<String>,
    /// Substrings that make any id passable.
    pub passable_markers: Vec<String>,
    /// Ids the agent must never step into, even when passable.
    pub hazards: BTreeSet<String>,
}

impl BlockRules {
    /// Default allow-list plus the standard hazard set.
    pub fn strict() -> Self {
        Self {
            passable: to_set(DEFAULT_PASSABLE),
            passable_markers: DEFAULT_PLANT_MARKERS.iter().map(|s| s.to_string()).collect(),
            hazards: to_set(DEFAULT_HAZARDS),
        }
    }

    /// Default allow-list with no hazards.
    pub fn permissive() -> Self {
        Self {
            hazards: BTreeSet::new(),
            ..Self::strict()
        }
    }

    pub fn is_passable(&self, block: &str) -> bool {
        self.passable.contains(block)
            || self.passable_markers.iter().any(|m| block.contains(m.as_str()))
    }

    pub fn is_hazard(&self, block: &str) -> bool {
        self.hazards.contains(block)
    }

    /// Solid blocks provide footing. Anything not passable is solid.
    pub fn is_solid(&self, block: &str) -> bool {
        !self.is_passable(block)
    }
}

impl Default for BlockRules {
    fn default() -> Self {
        Self::strict()
    }
}

fn to_set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_and_plants_are_passable() {
        let rules = BlockRules::strict();
        assert!(rules.is_passable("air"));
        assert!(rules.is_passable("tall_grass"));
        assert!(rules.is_passable("blue_orchid_flower"));
        assert!(rules.is_passable("large_fern"));
        assert!(rules.is_passable("sunflower"));
    }

    #[test]
    fn unknown_ids_are_solid() {
        let rules = BlockRules::strict();
        assert!(!rules.is_passable("stone"));
        assert!(!rules.is_passable("grass_block"));
        assert!(rules.is_solid("some_modded_block"));
        assert!(rules.is_solid(""));
    }

    #[test]
    fn hazard_set_depends_on_rules() {
        assert!(BlockRules::strict().is_hazard("lava"));
        assert!(BlockRules::strict().is_hazard("sweet_berry_bush"));
        assert!(!BlockRules::permissive().is_hazard("lava"));
        assert!(!BlockRules::strict().is_hazard("air"));
    }

    #[test]
    fn permissive_keeps_passable_set() {
        let strict = BlockRules::strict();
        let permissive = BlockRules::permissive();
        assert_eq!(strict.passable, permissive.passable);
        assert_eq!(strict.passable_markers, permissive.passable_markers);
    }

    #[test]
    fn rules_load_from_partial_json() {
        let rules: BlockRules = serde_json::from_str(r#"{ "hazards": [] }"#).unwrap();
        assert!(rules.is_passable("air"));
        assert!(!rules.is_hazard("fire"));
    }
}
