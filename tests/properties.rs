//! Property suite over the engine's quantified invariants: dimensions,
//! alphabet, border walls, determinism, connectivity and markers, for
//! randomly drawn kinds, sizes and seeds.

use proptest::arbitrary::any;
use proptest::strategy::Strategy;
use proptest::test_runner::{Config as ProptestConfig, TestCaseError, TestRunner};
use tilegen::{
    generate, BspOpts, CaveOpts, DrunkardOpts, GenerateOptions, Kind, MapGrid, MazeAlgorithm,
    MazeOpts, PerlinOpts, WfcOpts,
};

fn kind_from_index(index: u8) -> Kind {
    match index % 6 {
        0 => Kind::Caves(CaveOpts::default()),
        1 => Kind::Drunkard(DrunkardOpts::default()),
        2 => Kind::Bsp(BspOpts::default()),
        3 => Kind::Wfc(WfcOpts::default()),
        4 => Kind::Maze(MazeOpts::default()),
        _ => Kind::Perlin(PerlinOpts::default()),
    }
}

fn is_dungeon(kind: &Kind) -> bool {
    !matches!(kind, Kind::Perlin(_))
}

fn walkable_region_count(grid: &MapGrid) -> usize {
    let n = grid.size();
    let mut seen = vec![false; n * n];
    let mut count = 0;
    for sy in 0..n {
        for sx in 0..n {
            if seen[sy * n + sx] || !grid.is_walkable(sx, sy) {
                continue;
            }
            count += 1;
            let mut stack = vec![(sx, sy)];
            seen[sy * n + sx] = true;
            while let Some((x, y)) = stack.pop() {
                for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx as usize >= n || ny as usize >= n {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if !seen[ny * n + nx] && grid.is_walkable(nx, ny) {
                        seen[ny * n + nx] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
    count
}

fn check_core_invariants(kind: Kind, size: usize, seed: u32) -> Result<(), String> {
    let opts = GenerateOptions { seed: Some(seed), ..GenerateOptions::default() };
    let dungeon = is_dungeon(&kind);
    let out = generate(kind.clone(), size, &opts).map_err(|e| e.to_string())?;

    if out.grid.size() != size {
        return Err(format!("dimensions: got {}, wanted {size}", out.grid.size()));
    }
    let max_value = if dungeon { 6 } else { 5 };
    for y in 0..size {
        for x in 0..size {
            let v = out.grid.tile_value(x, y);
            if v > max_value {
                return Err(format!("alphabet: tile {v} at ({x},{y})"));
            }
        }
    }
    if dungeon {
        for i in 0..size {
            for (x, y) in [(i, 0), (i, size - 1), (0, i), (size - 1, i)] {
                if out.grid.tile_value(x, y) != 0 {
                    return Err(format!("border: open tile at ({x},{y})"));
                }
            }
        }
        let regions = walkable_region_count(&out.grid);
        if regions > 1 {
            return Err(format!("connectivity: {regions} regions"));
        }
        if out.stats.regions != Some(regions) {
            return Err(format!(
                "stats regions {:?} vs counted {regions}",
                out.stats.regions
            ));
        }
    }

    let replay = generate(kind, size, &opts).map_err(|e| e.to_string())?;
    if replay.grid != out.grid {
        return Err("determinism: replay produced a different grid".to_string());
    }
    Ok(())
}

#[test]
fn core_invariants_hold_for_random_inputs() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(48));
    let inputs = (any::<u8>(), 8usize..=24, any::<u32>());
    runner
        .run(&inputs, |(kind_index, size, seed)| {
            check_core_invariants(kind_from_index(kind_index), size, seed)
                .map_err(TestCaseError::fail)
        })
        .expect("core invariants should hold");
}

#[test]
fn markers_are_well_formed_when_requested() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(32));
    let inputs = ((0u8..3).prop_map(|i| i * 2), 12usize..=24, any::<u32>());
    runner
        .run(&inputs, |(kind_index, size, seed)| {
            let kind = kind_from_index(kind_index);
            let opts = GenerateOptions {
                seed: Some(seed),
                place_markers: Some(true),
                ..GenerateOptions::default()
            };
            let out = generate(kind, size, &opts).map_err(|e| TestCaseError::fail(e.to_string()))?;

            let mut starts = Vec::new();
            let mut ends = Vec::new();
            let mut walkable = Vec::new();
            for y in 0..size {
                for x in 0..size {
                    match out.grid.tile_value(x, y) {
                        4 => starts.push((x, y)),
                        5 => ends.push((x, y)),
                        _ => {}
                    }
                    if out.grid.is_walkable(x, y) {
                        walkable.push((x, y));
                    }
                }
            }
            if walkable.len() < 2 {
                return Ok(());
            }
            if starts.len() != 1 || ends.len() != 1 {
                return Err(TestCaseError::fail(format!(
                    "{} starts, {} ends",
                    starts.len(),
                    ends.len()
                )));
            }
            let (sx, sy) = starts[0];
            let (ex, ey) = ends[0];
            let dist = sx.abs_diff(ex) + sy.abs_diff(ey);
            let mut dists: Vec<usize> = walkable
                .iter()
                .filter(|&&c| c != (sx, sy))
                .map(|&(x, y)| x.abs_diff(sx) + y.abs_diff(sy))
                .collect();
            dists.sort_unstable();
            let p75 = dists[(dists.len() * 3) / 4];
            if dist < p75 {
                return Err(TestCaseError::fail(format!(
                    "marker distance {dist} below 75th percentile {p75}"
                )));
            }
            Ok(())
        })
        .expect("marker invariants should hold");
}

#[test]
fn perfect_mazes_are_trees_for_random_seeds() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(48));
    let inputs = (0u8..3, 9usize..=25, any::<u32>());
    runner
        .run(&inputs, |(algo_index, size, seed)| {
            let algorithm = match algo_index {
                0 => MazeAlgorithm::Backtracking,
                1 => MazeAlgorithm::Prim,
                _ => MazeAlgorithm::Division,
            };
            let kind = Kind::Maze(MazeOpts { algorithm, loop_chance: 0.0, openness: 0.0 });
            let opts = GenerateOptions {
                seed: Some(seed),
                place_markers: Some(false),
                ..GenerateOptions::default()
            };
            let out = generate(kind, size, &opts).map_err(|e| TestCaseError::fail(e.to_string()))?;

            let mut cells = 0usize;
            let mut edges = 0usize;
            for y in 0..size {
                for x in 0..size {
                    if !out.grid.is_walkable(x, y) {
                        continue;
                    }
                    cells += 1;
                    if x + 1 < size && out.grid.is_walkable(x + 1, y) {
                        edges += 1;
                    }
                    if y + 1 < size && out.grid.is_walkable(x, y + 1) {
                        edges += 1;
                    }
                }
            }
            if edges != cells - 1 {
                return Err(TestCaseError::fail(format!(
                    "{} size {size} seed {seed}: {cells} cells, {edges} edges",
                    algorithm.name()
                )));
            }
            Ok(())
        })
        .expect("perfect mazes should be trees");
}
