//! Wave-function-collapse dungeon generator.
//!
//! Every cell starts as a superposition of dungeon tiles and is
//! narrowed by constraint propagation: collapsing the lowest-entropy
//! cell, then intersecting each neighbor's options with what the
//! adjacency table permits, until the whole grid is decided. A
//! contradiction (a cell with no options left) restores the most
//! recent snapshot and forbids the choice that led to it; cells are
//! never silently substituted.

use std::collections::VecDeque;

use log::warn;

use crate::grid::{Grid, CARDINALS};
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::WfcOpts;

pub struct WfcOutcome {
    pub grid: Grid<DungeonTile>,
    pub backtracks: u32,
    pub exhausted: bool,
}

/// One cell of the wave: its remaining options, in canonical order.
/// `chosen` is set once the cell is collapsed.
#[derive(Clone)]
struct Cell {
    collapsed: bool,
    options: Vec<DungeonTile>,
    chosen: Option<DungeonTile>,
}

const TILES: [DungeonTile; 4] = [
    DungeonTile::Wall,
    DungeonTile::Floor,
    DungeonTile::Door,
    DungeonTile::Corridor,
];

fn weight(tile: DungeonTile) -> f64 {
    match tile {
        DungeonTile::Wall => 2.0,
        DungeonTile::Floor => 5.0,
        DungeonTile::Door => 1.0,
        DungeonTile::Corridor => 3.0,
        _ => 0.0,
    }
}

// The adjacency table is symmetric, so the same set applies toward
// every direction; the direction parameter keeps the rule lookup
// explicit at call sites.
fn allowed(from: DungeonTile, _toward: (i32, i32)) -> &'static [DungeonTile] {
    match from {
        DungeonTile::Wall => &[DungeonTile::Wall, DungeonTile::Floor, DungeonTile::Corridor],
        DungeonTile::Floor => &[
            DungeonTile::Wall,
            DungeonTile::Floor,
            DungeonTile::Door,
            DungeonTile::Corridor,
        ],
        DungeonTile::Door => &[DungeonTile::Floor, DungeonTile::Corridor],
        DungeonTile::Corridor => &[
            DungeonTile::Wall,
            DungeonTile::Floor,
            DungeonTile::Door,
            DungeonTile::Corridor,
        ],
        _ => &[],
    }
}

pub fn generate(size: usize, opts: &WfcOpts, rng: &mut Mulberry32) -> WfcOutcome {
    let mut wave = Wave::new(size);
    let mut history: VecDeque<(Vec<Cell>, usize)> = VecDeque::new();
    let mut backtracks = 0u32;
    let mut exhausted = false;

    loop {
        let minima = wave.entropy_minima();
        if minima.is_empty() {
            break;
        }
        let idx = *rng.pick(&minima);
        history.push_back((wave.cells.clone(), idx));
        if history.len() > 2 * opts.max_backtracks as usize {
            history.pop_front();
        }
        wave.collapse(idx, rng);

        let mut contradiction = wave.propagate(idx);
        while contradiction.is_some() {
            if backtracks >= opts.max_backtracks {
                exhausted = true;
                break;
            }
            let Some((cells, collapsed_idx)) = history.pop_back() else {
                exhausted = true;
                break;
            };
            backtracks += 1;
            wave.cells = cells;
            // Forbid the first option of the cell collapsed in that
            // frame so the next pass makes a different choice.
            let cell = &mut wave.cells[collapsed_idx];
            if !cell.options.is_empty() {
                cell.options.remove(0);
            }
            contradiction = match cell.options.len() {
                0 => Some(collapsed_idx),
                1 => {
                    cell.collapsed = true;
                    cell.chosen = Some(cell.options[0]);
                    wave.propagate(collapsed_idx)
                }
                _ => None,
            };
        }
        if exhausted {
            warn!("wfc gave up after {backtracks} backtracks");
            break;
        }
    }

    WfcOutcome { grid: wave.into_grid(), backtracks, exhausted }
}

struct Wave {
    size: usize,
    cells: Vec<Cell>,
}

impl Wave {
    // Border cells are pre-collapsed to wall; a manhattan disc around
    // the center is pre-constrained to open tiles so the dungeon grows
    // outward from a guaranteed floor seed.
    fn new(size: usize) -> Self {
        let center = size / 2;
        let radius = size / 6;
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                let cell = if border {
                    Cell {
                        collapsed: true,
                        options: vec![DungeonTile::Wall],
                        chosen: Some(DungeonTile::Wall),
                    }
                } else if x.abs_diff(center) + y.abs_diff(center) <= radius {
                    Cell {
                        collapsed: false,
                        options: vec![DungeonTile::Floor, DungeonTile::Corridor],
                        chosen: None,
                    }
                } else {
                    Cell { collapsed: false, options: TILES.to_vec(), chosen: None }
                };
                cells.push(cell);
            }
        }
        Wave { size, cells }
    }

    // Uncollapsed cells with the smallest non-zero option count, in
    // index order; the caller breaks ties with a uniform pick.
    fn entropy_minima(&self) -> Vec<usize> {
        let mut min = usize::MAX;
        let mut minima = Vec::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.collapsed || cell.options.is_empty() {
                continue;
            }
            let k = cell.options.len();
            if k < min {
                min = k;
                minima.clear();
                minima.push(i);
            } else if k == min {
                minima.push(i);
            }
        }
        minima
    }

    fn collapse(&mut self, idx: usize, rng: &mut Mulberry32) {
        let cell = &mut self.cells[idx];
        let weights: Vec<f64> = cell.options.iter().map(|&t| weight(t)).collect();
        let choice = cell.options[rng.weighted_pick(&weights)];
        cell.options = vec![choice];
        cell.chosen = Some(choice);
        cell.collapsed = true;
    }

    // Breadth-first constraint propagation from `start`. Returns the
    // index of a cell whose option set became empty, if any.
    fn propagate(&mut self, start: usize) -> Option<usize> {
        let n = self.size;
        let mut work = VecDeque::from([start]);
        while let Some(idx) = work.pop_front() {
            let (x, y) = (idx % n, idx / n);
            let opts = self.cells[idx].options.clone();
            for (dx, dy) in CARDINALS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx as usize >= n || ny as usize >= n {
                    continue;
                }
                let nidx = ny as usize * n + nx as usize;
                let next = narrowed(&opts, &self.cells[nidx].options, (dx, dy));
                if next.len() == self.cells[nidx].options.len() {
                    continue;
                }
                let empty = next.is_empty();
                let unit = next.len() == 1;
                let neighbor = &mut self.cells[nidx];
                neighbor.options = next;
                if empty {
                    return Some(nidx);
                }
                if unit {
                    neighbor.collapsed = true;
                    neighbor.chosen = Some(neighbor.options[0]);
                    work.push_back(nidx);
                }
            }
        }
        None
    }

    fn into_grid(self) -> Grid<DungeonTile> {
        let mut grid = Grid::filled(self.size, DungeonTile::Wall);
        for (i, cell) in self.cells.iter().enumerate() {
            let tile = cell
                .chosen
                .or_else(|| cell.options.first().copied())
                .unwrap_or(DungeonTile::Wall);
            grid.set(i % self.size, i / self.size, tile);
        }
        grid
    }
}

// The neighbor keeps an option when (a) some source option allows it
// in this direction and (b) it allows some source option back in the
// opposite direction.
fn narrowed(
    source: &[DungeonTile],
    neighbor: &[DungeonTile],
    toward: (i32, i32),
) -> Vec<DungeonTile> {
    let opposite = (-toward.0, -toward.1);
    neighbor
        .iter()
        .copied()
        .filter(|&p| {
            source.iter().any(|&s| allowed(s, toward).contains(&p))
                && allowed(p, opposite).iter().any(|q| source.contains(q))
        })
        .collect()
}
