//! Tile vocabularies and walkability predicates.
//!
//! Tiles are small integers interpreted through one of two closed
//! vocabularies: the dungeon set used by the cave, walk, BSP, WFC and
//! maze generators, and the terrain set used by the Perlin generator.
//! These predicates are the only place tile meanings are interpreted
//! outside a generator.

use serde::{Serialize, Serializer};

/// Dungeon vocabulary. Integer values are part of the output contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DungeonTile {
    Wall = 0,
    Floor = 1,
    Door = 2,
    SecretDoor = 3,
    Start = 4,
    End = 5,
    Corridor = 6,
}

impl DungeonTile {
    /// True for the dungeon walkable set: everything but walls.
    pub fn is_floor_like(self) -> bool {
        !matches!(self, DungeonTile::Wall)
    }

    pub fn is_walkable(self) -> bool {
        self.is_floor_like()
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Terrain vocabulary. Water and mountain are impassable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TerrainTile {
    DeepWater = 0,
    Water = 1,
    Sand = 2,
    Grass = 3,
    Forest = 4,
    Mountain = 5,
}

impl TerrainTile {
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            TerrainTile::Sand | TerrainTile::Grass | TerrainTile::Forest
        )
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Which vocabulary a raw tile integer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vocabulary {
    Dungeon,
    Terrain,
}

/// Walkability of a raw tile value under the given vocabulary.
///
/// Values outside the vocabulary are not walkable.
pub fn is_walkable(value: u8, vocabulary: Vocabulary) -> bool {
    match vocabulary {
        Vocabulary::Dungeon => (1..=6).contains(&value),
        Vocabulary::Terrain => (2..=4).contains(&value),
    }
}

// Tiles serialize as their integer values so downstream consumers see
// plain tile grids, matching the vocabulary tables.
impl Serialize for DungeonTile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl Serialize for TerrainTile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dungeon_values_are_stable() {
        assert_eq!(DungeonTile::Wall.value(), 0);
        assert_eq!(DungeonTile::Floor.value(), 1);
        assert_eq!(DungeonTile::Door.value(), 2);
        assert_eq!(DungeonTile::SecretDoor.value(), 3);
        assert_eq!(DungeonTile::Start.value(), 4);
        assert_eq!(DungeonTile::End.value(), 5);
        assert_eq!(DungeonTile::Corridor.value(), 6);
    }

    #[test]
    fn terrain_values_are_stable() {
        assert_eq!(TerrainTile::DeepWater.value(), 0);
        assert_eq!(TerrainTile::Water.value(), 1);
        assert_eq!(TerrainTile::Sand.value(), 2);
        assert_eq!(TerrainTile::Grass.value(), 3);
        assert_eq!(TerrainTile::Forest.value(), 4);
        assert_eq!(TerrainTile::Mountain.value(), 5);
    }

    #[test]
    fn dungeon_walkable_set() {
        assert!(!DungeonTile::Wall.is_floor_like());
        for t in [
            DungeonTile::Floor,
            DungeonTile::Door,
            DungeonTile::SecretDoor,
            DungeonTile::Start,
            DungeonTile::End,
            DungeonTile::Corridor,
        ] {
            assert!(t.is_floor_like());
            assert!(t.is_walkable());
        }
    }

    #[test]
    fn terrain_walkable_set() {
        assert!(TerrainTile::Sand.is_walkable());
        assert!(TerrainTile::Grass.is_walkable());
        assert!(TerrainTile::Forest.is_walkable());
        assert!(!TerrainTile::DeepWater.is_walkable());
        assert!(!TerrainTile::Water.is_walkable());
        assert!(!TerrainTile::Mountain.is_walkable());
    }

    #[test]
    fn raw_value_dispatch_matches_enums() {
        for v in 0..=6u8 {
            let via_enum = v != 0;
            assert_eq!(is_walkable(v, Vocabulary::Dungeon), via_enum);
        }
        for v in 0..=5u8 {
            assert_eq!(is_walkable(v, Vocabulary::Terrain), (2..=4).contains(&v));
        }
    }
}
