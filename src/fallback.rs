//! Hand-authored fallback dungeon.
//!
//! Returned by the `default` kind when no procedural generation is
//! wanted: a fixed, fully connected 16x16 dungeon that doubles as a
//! deterministic baseline in tests.

use crate::grid::Grid;
use crate::tile::DungeonTile;

pub const STATIC_SIZE: usize = 16;

// '#' wall, '.' floor, '+' door, 'S' start, 'E' end.
const STATIC_MAP: [&str; STATIC_SIZE] = [
    "################",
    "#......#.......#",
    "#......#.......#",
    "#......+.......#",
    "#......#.......#",
    "####+###.......#",
    "#......#.......#",
    "#.S....####+####",
    "#......#.......#",
    "#......#.......#",
    "####+###...E...#",
    "#......#.......#",
    "#......#.......#",
    "#......+.......#",
    "#......#.......#",
    "################",
];

pub fn static_map() -> Grid<DungeonTile> {
    let mut grid = Grid::filled(STATIC_SIZE, DungeonTile::Wall);
    for (y, row) in STATIC_MAP.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            let tile = match c {
                '.' => DungeonTile::Floor,
                '+' => DungeonTile::Door,
                'S' => DungeonTile::Start,
                'E' => DungeonTile::End,
                _ => DungeonTile::Wall,
            };
            grid.set(x, y, tile);
        }
    }
    grid
}
