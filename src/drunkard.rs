//! Drunkard's-walk cave generator.
//!
//! Walkers carve floor into a solid grid until a target share of the
//! map is open. The weighted variant biases each step toward
//! unexplored rock, which reaches the target in far fewer steps than a
//! uniform walk.

use log::warn;

use crate::grid::{Grid, CARDINALS};
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::{DrunkardOpts, DrunkardVariant};

pub struct WalkOutcome {
    pub grid: Grid<DungeonTile>,
    pub carved: usize,
    pub target: usize,
}

pub fn generate(size: usize, opts: &DrunkardOpts, rng: &mut Mulberry32) -> WalkOutcome {
    let target = (opts.fill_percentage * (size * size) as f64) as usize;
    let mut grid = Grid::filled(size, DungeonTile::Wall);
    let carved = match opts.variant {
        DrunkardVariant::Simple => walk_simple(&mut grid, target, rng),
        DrunkardVariant::Multiple => walk_multiple(&mut grid, target, opts.num_walkers, rng),
        DrunkardVariant::Weighted => walk_weighted(&mut grid, target, rng),
    };
    if carved < target {
        warn!(
            "drunkard ({}) stalled at {carved}/{target} floor cells",
            opts.variant.name()
        );
    }
    WalkOutcome { grid, carved, target }
}

// Single walker from the center; gives up once the floor count stops
// growing for N^2 consecutive steps.
fn walk_simple(grid: &mut Grid<DungeonTile>, target: usize, rng: &mut Mulberry32) -> usize {
    let n = grid.size();
    let (mut x, mut y) = (n / 2, n / 2);
    let mut carved = 0;
    let mut stall = 0;
    while carved < target && stall < n * n {
        if grid.get(x, y) == DungeonTile::Wall {
            grid.set(x, y, DungeonTile::Floor);
            carved += 1;
            stall = 0;
        } else {
            stall += 1;
        }
        let (dx, dy) = *rng.pick(&CARDINALS);
        if let Some((nx, ny)) = interior_offset(grid, x, y, dx, dy) {
            x = nx;
            y = ny;
        }
    }
    carved
}

// Each walker gets an equal slice of the target; later walkers start
// on floor already carved by earlier ones.
fn walk_multiple(
    grid: &mut Grid<DungeonTile>,
    target: usize,
    num_walkers: u32,
    rng: &mut Mulberry32,
) -> usize {
    let n = grid.size();
    let quota = target.div_ceil(num_walkers.max(1) as usize);
    let mut total = 0;
    for w in 0..num_walkers {
        let (mut x, mut y) = if w == 0 {
            (n / 2, n / 2)
        } else {
            let floors = grid.coords_where(|t| t == DungeonTile::Floor);
            *rng.pick(&floors)
        };
        let mut carved = 0;
        let mut stall = 0;
        while carved < quota && stall < n * n {
            if grid.get(x, y) == DungeonTile::Wall {
                grid.set(x, y, DungeonTile::Floor);
                carved += 1;
                total += 1;
                stall = 0;
            } else {
                stall += 1;
            }
            let (dx, dy) = *rng.pick(&CARDINALS);
            if let Some((nx, ny)) = interior_offset(grid, x, y, dx, dy) {
                x = nx;
                y = ny;
            }
        }
    }
    total
}

// Steps toward rock: each candidate neighbor is weighted by one plus
// the wall count of its 3x3 surroundings.
fn walk_weighted(grid: &mut Grid<DungeonTile>, target: usize, rng: &mut Mulberry32) -> usize {
    let n = grid.size();
    let (mut x, mut y) = (n / 2, n / 2);
    let mut carved = 0;
    let mut steps = 0;
    while carved < target && steps < 4 * n * n {
        steps += 1;
        if grid.get(x, y) == DungeonTile::Wall {
            grid.set(x, y, DungeonTile::Floor);
            carved += 1;
        }
        let mut candidates = Vec::with_capacity(4);
        let mut weights = Vec::with_capacity(4);
        for (dx, dy) in CARDINALS {
            if let Some((nx, ny)) = interior_offset(grid, x, y, dx, dy) {
                candidates.push((nx, ny));
                weights.push(1.0 + f64::from(walls_around(grid, nx, ny)));
            }
        }
        (x, y) = candidates[rng.weighted_pick(&weights)];
    }
    carved
}

// Walkers never leave the interior ring 1..N-1.
fn interior_offset(
    grid: &Grid<DungeonTile>,
    x: usize,
    y: usize,
    dx: i32,
    dy: i32,
) -> Option<(usize, usize)> {
    let n = grid.size();
    let (nx, ny) = grid.offset(x, y, dx, dy)?;
    (nx >= 1 && ny >= 1 && nx < n - 1 && ny < n - 1).then_some((nx, ny))
}

fn walls_around(grid: &Grid<DungeonTile>, cx: usize, cy: usize) -> u32 {
    let mut count = 0;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            match grid.offset(cx, cy, dx, dy) {
                Some((x, y)) if grid.get(x, y) != DungeonTile::Wall => {}
                _ => count += 1,
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::{keep_largest_region, regions};

    fn floor_pct(grid: &Grid<DungeonTile>) -> f64 {
        let n = grid.size();
        100.0 * grid.count(|t| t.is_walkable()) as f64 / (n * n) as f64
    }

    #[test]
    fn weighted_walk_reaches_its_target() {
        let mut rng = Mulberry32::new(5);
        let out = generate(24, &DrunkardOpts::default(), &mut rng);
        assert_eq!(out.carved, out.target);
        assert_eq!(out.carved, (0.45 * 24.0 * 24.0) as usize);
    }

    #[test]
    fn carved_map_is_one_region_after_pruning() {
        for seed in [1, 2, 5, 77] {
            let mut rng = Mulberry32::new(seed);
            let mut out = generate(24, &DrunkardOpts::default(), &mut rng);
            keep_largest_region(&mut out.grid);
            assert_eq!(regions(&out.grid).len(), 1);
            let pct = floor_pct(&out.grid);
            assert!(
                (30.0..=55.0).contains(&pct),
                "seed {seed}: floor share {pct:.1}%"
            );
        }
    }

    #[test]
    fn simple_walker_stays_in_interior() {
        let mut rng = Mulberry32::new(9);
        let opts = DrunkardOpts {
            variant: DrunkardVariant::Simple,
            ..DrunkardOpts::default()
        };
        let out = generate(16, &opts, &mut rng);
        for i in 0..16 {
            assert_eq!(out.grid.get(i, 0), DungeonTile::Wall);
            assert_eq!(out.grid.get(i, 15), DungeonTile::Wall);
            assert_eq!(out.grid.get(0, i), DungeonTile::Wall);
            assert_eq!(out.grid.get(15, i), DungeonTile::Wall);
        }
    }

    #[test]
    fn multiple_walkers_split_the_quota() {
        let mut rng = Mulberry32::new(5);
        let opts = DrunkardOpts {
            variant: DrunkardVariant::Multiple,
            ..DrunkardOpts::default()
        };
        let out = generate(24, &opts, &mut rng);
        // ceil-division quotas may overshoot by up to num_walkers - 1.
        assert!(out.carved >= out.target);
        assert!(out.carved < out.target + 4);
    }

    #[test]
    fn deterministic_for_a_seed() {
        let opts = DrunkardOpts::default();
        let mut a = Mulberry32::new(321);
        let mut b = Mulberry32::new(321);
        assert_eq!(generate(20, &opts, &mut a).grid, generate(20, &opts, &mut b).grid);
    }
}
