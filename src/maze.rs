//! Maze generator.
//!
//! Cells live on odd coordinates and walls on even ones, so carving
//! works in steps of two with the intermediate cell opened alongside
//! the target. An even-sized request keeps its last row and column as
//! wall, since the lattice needs odd dimensions.

use crate::grid::Grid;
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::{Coord, MazeAlgorithm, MazeOpts};

const JUMPS: [(i32, i32); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

pub fn generate(size: usize, opts: &MazeOpts, rng: &mut Mulberry32) -> Grid<DungeonTile> {
    let m = if size % 2 == 1 { size } else { size - 1 };
    let mut grid = Grid::filled(size, DungeonTile::Wall);
    match opts.algorithm {
        MazeAlgorithm::Backtracking => carve_backtracking(&mut grid, m, rng),
        MazeAlgorithm::Prim => carve_prim(&mut grid, m, rng),
        MazeAlgorithm::Division => carve_division(&mut grid, m, rng),
    }
    if opts.loop_chance > 0.0 {
        carve_loops(&mut grid, m, opts.loop_chance, rng);
    }
    if opts.openness > 0.0 {
        open_walls(&mut grid, m, opts.openness, rng);
    }
    grid
}

/// START goes on the first floor cell in scanline order, END on the
/// first in reverse scanline order.
pub fn place_endpoints(grid: &mut Grid<DungeonTile>) -> Option<(Coord, Coord)> {
    let n = grid.size();
    let mut start = None;
    'forward: for y in 0..n {
        for x in 0..n {
            if grid.get(x, y) == DungeonTile::Floor {
                start = Some((x, y));
                break 'forward;
            }
        }
    }
    let mut end = None;
    'backward: for y in (0..n).rev() {
        for x in (0..n).rev() {
            if grid.get(x, y) == DungeonTile::Floor {
                end = Some((x, y));
                break 'backward;
            }
        }
    }
    match (start, end) {
        (Some(s), Some(e)) if s != e => {
            grid.set(s.0, s.1, DungeonTile::Start);
            grid.set(e.0, e.1, DungeonTile::End);
            Some((Coord { x: s.0, y: s.1 }, Coord { x: e.0, y: e.1 }))
        }
        _ => None,
    }
}

// Depth-first: repeatedly jump two cells toward an uncarved neighbor,
// opening the wall between; dead ends pop back up the stack.
fn carve_backtracking(grid: &mut Grid<DungeonTile>, m: usize, rng: &mut Mulberry32) {
    grid.set(1, 1, DungeonTile::Floor);
    let mut stack = vec![(1usize, 1usize)];
    while let Some(&(x, y)) = stack.last() {
        let mut dirs = JUMPS;
        rng.shuffle(&mut dirs);
        let mut moved = false;
        for (dx, dy) in dirs {
            let Some((nx, ny)) = jump_target(m, x, y, dx, dy) else {
                continue;
            };
            if grid.get(nx, ny) == DungeonTile::Wall {
                let (bx, by) = between(x, y, nx, ny);
                grid.set(bx, by, DungeonTile::Floor);
                grid.set(nx, ny, DungeonTile::Floor);
                stack.push((nx, ny));
                moved = true;
                break;
            }
        }
        if !moved {
            stack.pop();
        }
    }
}

// Prim-like growth: keep a frontier of uncarved cells two steps from
// the carved area, attach a random one to a random carved neighbor.
fn carve_prim(grid: &mut Grid<DungeonTile>, m: usize, rng: &mut Mulberry32) {
    grid.set(1, 1, DungeonTile::Floor);
    let mut frontier: Vec<(usize, usize)> = Vec::new();
    push_frontier(grid, m, 1, 1, &mut frontier);
    while !frontier.is_empty() {
        let i = rng.int_in(0, frontier.len() - 1);
        let (fx, fy) = frontier.remove(i);
        if grid.get(fx, fy) != DungeonTile::Wall {
            continue;
        }
        let mut carved = Vec::with_capacity(4);
        for (dx, dy) in JUMPS {
            if let Some((px, py)) = jump_target(m, fx, fy, dx, dy) {
                if grid.get(px, py) == DungeonTile::Floor {
                    carved.push((px, py));
                }
            }
        }
        if carved.is_empty() {
            continue;
        }
        let &(px, py) = rng.pick(&carved);
        grid.set((fx + px) / 2, (fy + py) / 2, DungeonTile::Floor);
        grid.set(fx, fy, DungeonTile::Floor);
        push_frontier(grid, m, fx, fy, &mut frontier);
    }
}

fn push_frontier(
    grid: &Grid<DungeonTile>,
    m: usize,
    x: usize,
    y: usize,
    frontier: &mut Vec<(usize, usize)>,
) {
    for (dx, dy) in JUMPS {
        if let Some((nx, ny)) = jump_target(m, x, y, dx, dy) {
            if grid.get(nx, ny) == DungeonTile::Wall && !frontier.contains(&(nx, ny)) {
                frontier.push((nx, ny));
            }
        }
    }
}

// Recursive division: open the interior, then draw walls with a single
// gap across the longer axis, recursing into both halves. Region
// origins stay on odd coordinates so walls land on even ones.
fn carve_division(grid: &mut Grid<DungeonTile>, m: usize, rng: &mut Mulberry32) {
    for y in 1..m - 1 {
        for x in 1..m - 1 {
            grid.set(x, y, DungeonTile::Floor);
        }
    }
    divide(grid, 1, 1, m - 2, m - 2, rng);
}

fn divide(grid: &mut Grid<DungeonTile>, x: usize, y: usize, w: usize, h: usize, rng: &mut Mulberry32) {
    if w < 3 || h < 3 {
        return;
    }
    let vertical = if w > h {
        true
    } else if h > w {
        false
    } else {
        rng.chance(0.5)
    };
    if vertical {
        let walls: Vec<usize> = (x + 1..x + w - 1).filter(|wx| wx % 2 == 0).collect();
        if walls.is_empty() {
            return;
        }
        let wx = *rng.pick(&walls);
        let gaps: Vec<usize> = (y..y + h).filter(|gy| gy % 2 == 1).collect();
        let gy = *rng.pick(&gaps);
        for yy in y..y + h {
            if yy != gy {
                grid.set(wx, yy, DungeonTile::Wall);
            }
        }
        divide(grid, x, y, wx - x, h, rng);
        divide(grid, wx + 1, y, x + w - wx - 1, h, rng);
    } else {
        let walls: Vec<usize> = (y + 1..y + h - 1).filter(|wy| wy % 2 == 0).collect();
        if walls.is_empty() {
            return;
        }
        let wy = *rng.pick(&walls);
        let gaps: Vec<usize> = (x..x + w).filter(|gx| gx % 2 == 1).collect();
        let gx = *rng.pick(&gaps);
        for xx in x..x + w {
            if xx != gx {
                grid.set(xx, wy, DungeonTile::Wall);
            }
        }
        divide(grid, x, y, w, wy - y, rng);
        divide(grid, x, wy + 1, w, y + h - wy - 1, rng);
    }
}

// Wall segments sit between two cells exactly when one coordinate is
// even and the other odd; knocking one out creates a loop.
fn carve_loops(grid: &mut Grid<DungeonTile>, m: usize, chance: f64, rng: &mut Mulberry32) {
    for y in 1..m - 1 {
        for x in 1..m - 1 {
            if (x % 2 == 0) != (y % 2 == 0)
                && grid.get(x, y) == DungeonTile::Wall
                && rng.chance(chance)
            {
                grid.set(x, y, DungeonTile::Floor);
            }
        }
    }
}

fn open_walls(grid: &mut Grid<DungeonTile>, m: usize, chance: f64, rng: &mut Mulberry32) {
    for y in 1..m - 1 {
        for x in 1..m - 1 {
            if grid.get(x, y) == DungeonTile::Wall && rng.chance(chance) {
                grid.set(x, y, DungeonTile::Floor);
            }
        }
    }
}

fn jump_target(m: usize, x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    (nx >= 1 && ny >= 1 && nx < m as i32 - 1 && ny < m as i32 - 1)
        .then_some((nx as usize, ny as usize))
}

fn between(x: usize, y: usize, nx: usize, ny: usize) -> (usize, usize) {
    ((x + nx) / 2, (y + ny) / 2)
}
