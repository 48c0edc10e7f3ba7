//! Connectivity toolkit: flood-fill, region analysis and repair,
//! marker placement.
//!
//! Every dungeon generator funnels through these passes so that an
//! emitted grid is guaranteed walkable end to end. Regions are
//! equivalence classes of walkable cells under 4-adjacency; they exist
//! only transiently inside this module.

use crate::grid::{manhattan, Grid, CARDINALS};
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::Coord;

/// Coordinates reachable from `start` through cells satisfying `pred`,
/// including `start` itself when it qualifies. Worklist-based so deep
/// regions cannot overflow the call stack.
pub fn flood_fill(
    grid: &Grid<DungeonTile>,
    start: (usize, usize),
    pred: impl Fn(DungeonTile) -> bool,
) -> Vec<(usize, usize)> {
    if !pred(grid.get(start.0, start.1)) {
        return Vec::new();
    }
    let n = grid.size();
    let mut seen = vec![false; n * n];
    seen[start.1 * n + start.0] = true;
    let mut out = vec![start];
    let mut stack = vec![start];
    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in CARDINALS {
            if let Some((nx, ny)) = grid.offset(x, y, dx, dy) {
                if !seen[ny * n + nx] && pred(grid.get(nx, ny)) {
                    seen[ny * n + nx] = true;
                    out.push((nx, ny));
                    stack.push((nx, ny));
                }
            }
        }
    }
    out
}

/// All walkable regions, discovered in row-major seed order.
pub fn regions(grid: &Grid<DungeonTile>) -> Vec<Vec<(usize, usize)>> {
    let n = grid.size();
    let mut seen = vec![false; n * n];
    let mut out = Vec::new();
    for y in 0..n {
        for x in 0..n {
            if seen[y * n + x] || !grid.get(x, y).is_walkable() {
                continue;
            }
            let region = flood_fill(grid, (x, y), DungeonTile::is_walkable);
            for &(rx, ry) in &region {
                seen[ry * n + rx] = true;
            }
            out.push(region);
        }
    }
    out
}

/// Fills every walkable cell outside the largest region with wall.
/// Ties go to the first-encountered region. Returns the region count
/// after the pass (0 when the grid had no walkable cell at all).
pub fn keep_largest_region(grid: &mut Grid<DungeonTile>) -> usize {
    let regs = regions(grid);
    if regs.len() <= 1 {
        return regs.len();
    }
    let mut largest = 0;
    for (i, r) in regs.iter().enumerate() {
        if r.len() > regs[largest].len() {
            largest = i;
        }
    }
    for (i, r) in regs.iter().enumerate() {
        if i == largest {
            continue;
        }
        for &(x, y) in r {
            grid.set(x, y, DungeonTile::Wall);
        }
    }
    1
}

/// Joins all walkable regions by carving L-shaped corridors between the
/// closest pair of regions until a single region remains. Each pass
/// strictly reduces the region count, so termination is guaranteed.
/// Returns the final region count (0 for an entirely-wall grid).
pub fn stitch_regions(grid: &mut Grid<DungeonTile>) -> usize {
    loop {
        let regs = regions(grid);
        if regs.len() <= 1 {
            return regs.len();
        }
        let (from, to) = closest_pair(&regs);
        carve_corridor(grid, from, to);
    }
}

// Closest (manhattan) coordinate pair across all region pairs; strict
// comparison keeps the first-found pair on ties.
fn closest_pair(regs: &[Vec<(usize, usize)>]) -> ((usize, usize), (usize, usize)) {
    let mut best = (usize::MAX, (0, 0), (0, 0));
    for i in 0..regs.len() {
        for j in (i + 1)..regs.len() {
            for &a in &regs[i] {
                for &b in &regs[j] {
                    let d = manhattan(a, b);
                    if d < best.0 {
                        best = (d, a, b);
                    }
                }
            }
        }
    }
    (best.1, best.2)
}

// Horizontal-then-vertical corridor from `a` to `b`; only wall cells
// are converted, to the corridor tile.
fn carve_corridor(grid: &mut Grid<DungeonTile>, a: (usize, usize), b: (usize, usize)) {
    let (mut x, mut y) = a;
    while x != b.0 {
        x = if b.0 > x { x + 1 } else { x - 1 };
        if grid.get(x, y) == DungeonTile::Wall {
            grid.set(x, y, DungeonTile::Corridor);
        }
    }
    while y != b.1 {
        y = if b.1 > y { y + 1 } else { y - 1 };
        if grid.get(x, y) == DungeonTile::Wall {
            grid.set(x, y, DungeonTile::Corridor);
        }
    }
}

/// Places START on a uniformly chosen walkable cell and END on a
/// uniformly chosen cell among the 20% of remaining walkable cells
/// farthest (manhattan) from START. With fewer than two walkable cells
/// the grid is left unchanged and no markers are reported.
pub fn place_markers(
    grid: &mut Grid<DungeonTile>,
    rng: &mut Mulberry32,
) -> Option<(Coord, Coord)> {
    let walkable = grid.coords_where(DungeonTile::is_walkable);
    if walkable.len() < 2 {
        return None;
    }
    let start = *rng.pick(&walkable);
    let mut rest: Vec<(usize, usize)> =
        walkable.into_iter().filter(|&c| c != start).collect();
    rest.sort_by_key(|&c| (std::cmp::Reverse(manhattan(c, start)), c.1, c.0));
    let top = rest.len() / 5;
    let end = *rng.pick(&rest[..top.max(1)]);
    grid.set(start.0, start.1, DungeonTile::Start);
    grid.set(end.0, end.1, DungeonTile::End);
    Some((Coord { x: start.0, y: start.1 }, Coord { x: end.0, y: end.1 }))
}
