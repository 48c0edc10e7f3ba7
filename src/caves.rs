//! Cellular-automata cave generator.
//!
//! A random interior seed grid is smoothed with passes of the 4-5
//! rule: a cell stays floor when at least five of the nine cells in
//! its 3x3 neighborhood are floor, and a cell whose 5x5 neighborhood
//! holds no floor at all flips to floor, seeding detail inside solid
//! rock. Each pass reads a snapshot of the previous one; the border
//! never leaves wall.

use crate::grid::Grid;
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::CaveOpts;

pub fn generate(size: usize, opts: &CaveOpts, rng: &mut Mulberry32) -> Grid<DungeonTile> {
    let mut grid = Grid::filled(size, DungeonTile::Wall);
    // initial_density is the wall share of the seed grid.
    for y in 1..size - 1 {
        for x in 1..size - 1 {
            if !rng.chance(opts.initial_density) {
                grid.set(x, y, DungeonTile::Floor);
            }
        }
    }
    for _ in 0..opts.iterations {
        grid = smooth(&grid);
    }
    grid
}

fn smooth(snapshot: &Grid<DungeonTile>) -> Grid<DungeonTile> {
    let n = snapshot.size();
    let mut next = Grid::filled(n, DungeonTile::Wall);
    for y in 1..n - 1 {
        for x in 1..n - 1 {
            let (n1, n2) = floor_counts(snapshot, x, y);
            let tile = if n2 == 0 || n1 >= 5 {
                DungeonTile::Floor
            } else {
                DungeonTile::Wall
            };
            next.set(x, y, tile);
        }
    }
    next
}

// Floor cells within the 3x3 and 5x5 neighborhoods of (x, y), both
// inclusive of the cell itself. Off-grid cells count as wall.
fn floor_counts(grid: &Grid<DungeonTile>, x: usize, y: usize) -> (u32, u32) {
    let mut n1 = 0;
    let mut n2 = 0;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let Some((nx, ny)) = grid.offset(x, y, dx, dy) else {
                continue;
            };
            if grid.get(nx, ny) == DungeonTile::Floor {
                n2 += 1;
                if dx.abs() <= 1 && dy.abs() <= 1 {
                    n1 += 1;
                }
            }
        }
    }
    (n1, n2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::{keep_largest_region, regions};

    #[test]
    fn border_is_wall() {
        let mut rng = Mulberry32::new(42);
        let g = generate(32, &CaveOpts::default(), &mut rng);
        for i in 0..32 {
            assert_eq!(g.get(i, 0), DungeonTile::Wall);
            assert_eq!(g.get(i, 31), DungeonTile::Wall);
            assert_eq!(g.get(0, i), DungeonTile::Wall);
            assert_eq!(g.get(31, i), DungeonTile::Wall);
        }
    }

    #[test]
    fn deterministic_for_a_seed() {
        let mut a = Mulberry32::new(7);
        let mut b = Mulberry32::new(7);
        let opts = CaveOpts::default();
        assert_eq!(generate(24, &opts, &mut a), generate(24, &opts, &mut b));
    }

    #[test]
    fn isolated_cells_become_floor() {
        // One lone floor cell surrounded by rock: the 4-5 rule erases
        // it, while every deep-rock cell 3+ away from it seeds detail.
        let mut g = Grid::filled(16, DungeonTile::Wall);
        g.set(8, 8, DungeonTile::Floor);
        let smoothed = smooth(&g);
        assert_eq!(smoothed.get(8, 8), DungeonTile::Wall);
        assert_eq!(smoothed.get(2, 2), DungeonTile::Floor);
    }

    #[test]
    fn smoothing_keeps_open_chambers() {
        let mut g = Grid::filled(16, DungeonTile::Wall);
        for y in 4..12 {
            for x in 4..12 {
                g.set(x, y, DungeonTile::Floor);
            }
        }
        let smoothed = smooth(&g);
        assert_eq!(smoothed.get(7, 7), DungeonTile::Floor);
    }

    #[test]
    fn pruned_caves_have_reasonable_floor_share() {
        for seed in [1, 7, 42, 99] {
            let mut rng = Mulberry32::new(seed);
            let mut g = generate(32, &CaveOpts::default(), &mut rng);
            keep_largest_region(&mut g);
            let pct = 100.0 * g.count(|t| t.is_walkable()) as f64 / (32.0 * 32.0);
            assert!(
                (15.0..=75.0).contains(&pct),
                "seed {seed}: floor share {pct:.1}% out of range"
            );
            assert_eq!(regions(&g).len(), 1);
        }
    }
}
