//! Generator dispatch facade.
//!
//! `generate` is the single entry point: it validates arguments,
//! resolves the seed, runs the requested generator, applies the shared
//! post-pass (connectivity repair, marker placement) and assembles the
//! result record. Given the same kind, size and seed the emitted grid
//! is bit-identical across runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::connect::{keep_largest_region, place_markers, regions, stitch_regions};
use crate::grid::Grid;
use crate::prng::Mulberry32;
use crate::tile::{DungeonTile, TerrainTile};
use crate::types::{
    ConnectivityPolicy, GenerateError, GenerateOptions, Generated, Kind, MapGrid, MapStats,
    MIN_SIZE,
};
use crate::{bsp, caves, drunkard, fallback, maze, perlin, wfc};

/// Runs the generator selected by `kind` on a `size x size` grid.
///
/// Invalid arguments fail fast; generation shortfalls (a stalled
/// walker, an exhausted WFC budget) are reported through the stats of
/// an otherwise successful result.
pub fn generate(
    kind: Kind,
    size: usize,
    options: &GenerateOptions,
) -> Result<Generated, GenerateError> {
    if size < MIN_SIZE {
        return Err(GenerateError::SizeTooSmall(size));
    }
    let seed = options.seed.unwrap_or_else(derive_seed);
    let mut rng = Mulberry32::new(seed);
    debug!("generating `{kind}` at {size}x{size}, seed {seed}");

    let markers = options.place_markers.unwrap_or(matches!(&kind, Kind::Maze(_)));
    let mut stats = MapStats { seed_used: seed, ..MapStats::default() };

    let grid = match kind {
        Kind::Default => {
            // The authored map ships at its own fixed size, unchanged.
            let grid = fallback::static_map();
            stats.regions = Some(regions(&grid).len());
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Caves(opts) => {
            let mut grid = caves::generate(size, &opts, &mut rng);
            let region_count = if options.ensure_connected {
                match opts.connectivity {
                    ConnectivityPolicy::KeepLargest => keep_largest_region(&mut grid),
                    ConnectivityPolicy::Stitch => stitch_regions(&mut grid),
                }
            } else {
                regions(&grid).len()
            };
            stats.regions = Some(region_count);
            if markers {
                set_markers(&mut grid, &mut rng, &mut stats);
            }
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Drunkard(opts) => {
            let out = drunkard::generate(size, &opts, &mut rng);
            let mut grid = out.grid;
            let region_count = if options.ensure_connected {
                keep_largest_region(&mut grid)
            } else {
                regions(&grid).len()
            };
            stats.variant = Some(opts.variant.name().to_string());
            stats.carved = Some(out.carved);
            stats.carve_target = Some(out.target);
            stats.regions = Some(region_count);
            if markers {
                set_markers(&mut grid, &mut rng, &mut stats);
            }
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Bsp(opts) => {
            let out = bsp::generate(size, &opts, &mut rng);
            let mut grid = out.grid;
            // Corridor routing can miss a room in pathological
            // partitions; stitching is the safety net.
            let region_count = if options.ensure_connected {
                stitch_regions(&mut grid)
            } else {
                regions(&grid).len()
            };
            stats.rooms = Some(out.rooms);
            stats.regions = Some(region_count);
            if markers {
                set_markers(&mut grid, &mut rng, &mut stats);
            }
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Wfc(opts) => {
            let out = wfc::generate(size, &opts, &mut rng);
            let mut grid = out.grid;
            let region_count = if options.ensure_connected {
                keep_largest_region(&mut grid)
            } else {
                regions(&grid).len()
            };
            stats.backtracks = Some(out.backtracks);
            if out.exhausted {
                stats.exhausted = Some(true);
            }
            stats.regions = Some(region_count);
            if markers {
                set_markers(&mut grid, &mut rng, &mut stats);
            }
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Maze(opts) => {
            let mut grid = maze::generate(size, &opts, &mut rng);
            let region_count = if options.ensure_connected {
                keep_largest_region(&mut grid)
            } else {
                regions(&grid).len()
            };
            stats.variant = Some(opts.algorithm.name().to_string());
            stats.regions = Some(region_count);
            if markers {
                if let Some((start, end)) = maze::place_endpoints(&mut grid) {
                    stats.start = Some(start);
                    stats.end = Some(end);
                }
            }
            stats.floor_percentage = Some(floor_percentage(&grid));
            MapGrid::Dungeon(grid)
        }
        Kind::Perlin(opts) => {
            let grid = perlin::generate(size, &opts, &mut rng);
            let (water, land, mountain) = terrain_percentages(&grid);
            stats.water_percentage = Some(water);
            stats.land_percentage = Some(land);
            stats.mountain_percentage = Some(mountain);
            MapGrid::Terrain(grid)
        }
    };

    Ok(Generated { grid, seed_used: seed, stats })
}

fn set_markers(grid: &mut Grid<DungeonTile>, rng: &mut Mulberry32, stats: &mut MapStats) {
    if let Some((start, end)) = place_markers(grid, rng) {
        stats.start = Some(start);
        stats.end = Some(end);
    }
}

fn floor_percentage(grid: &Grid<DungeonTile>) -> f64 {
    let n = grid.size();
    100.0 * grid.count(|t| t.is_walkable()) as f64 / (n * n) as f64
}

fn terrain_percentages(grid: &Grid<TerrainTile>) -> (f64, f64, f64) {
    let n = grid.size();
    let total = (n * n) as f64;
    let water = grid.count(|t| matches!(t, TerrainTile::DeepWater | TerrainTile::Water));
    let land = grid.count(TerrainTile::is_walkable);
    let mountain = grid.count(|t| t == TerrainTile::Mountain);
    (
        100.0 * water as f64 / total,
        100.0 * land as f64 / total,
        100.0 * mountain as f64 / total,
    )
}

// Nondeterministic 32-bit seed for callers that did not pass one. The
// recipe is not part of the contract; the result is exposed through
// `seed_used` so any run can be reproduced.
fn derive_seed() -> u32 {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0u128, |d| d.as_nanos());
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    let entropy = (nanos as u64)
        ^ ((nanos >> 64) as u64)
        ^ u64::from(std::process::id()).rotate_left(17)
        ^ u64::from(counter).rotate_left(7);
    remix(entropy) as u32
}

fn remix(value: u64) -> u64 {
    let mut mixed = value ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

// -----------------------------------------------------------------
// Tests
// -----------------------------------------------------------------
