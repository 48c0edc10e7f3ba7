//! BSP dungeon generator.
//!
//! The interior rectangle is recursively partitioned into a binary
//! tree; leaves get rooms, internal nodes get an L-shaped corridor
//! between a room from each side. The tree is owned top-down and
//! discarded once the grid is emitted.

use crate::grid::{Grid, CARDINALS};
use crate::prng::Mulberry32;
use crate::tile::DungeonTile;
use crate::types::BspOpts;

pub struct BspOutcome {
    pub grid: Grid<DungeonTile>,
    pub rooms: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RoomRect {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl RoomRect {
    fn center(self) -> (usize, usize) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

struct Node {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    room: Option<RoomRect>,
}

impl Node {
    fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Node { x, y, w, h, left: None, right: None, room: None }
    }
}

pub fn generate(size: usize, opts: &BspOpts, rng: &mut Mulberry32) -> BspOutcome {
    let mut grid = Grid::filled(size, DungeonTile::Wall);
    let mut root = Node::new(1, 1, size - 2, size - 2);
    split(&mut root, opts, 0, rng);

    let mut rooms = 0;
    place_rooms(&mut root, opts, &mut grid, &mut rooms, rng);
    carve_corridors(&root, &mut grid, rng);
    if opts.place_doors {
        place_doors(&mut grid, opts.door_chance, rng);
    }
    BspOutcome { grid, rooms }
}

fn split(node: &mut Node, opts: &BspOpts, depth: u32, rng: &mut Mulberry32) {
    if depth >= opts.max_depth {
        return;
    }
    let (w, h) = (node.w as f64, node.h as f64);
    // Wide nodes split vertically, tall ones horizontally; near-square
    // nodes flip a coin.
    let vertical = if w / h >= 1.25 {
        true
    } else if h / w >= 1.25 {
        false
    } else {
        rng.chance(0.5)
    };
    let axis = if vertical { node.w } else { node.h };
    if axis <= 2 * opts.min_partition_size {
        return;
    }
    let max_split = axis - opts.min_partition_size;
    let offset = rng.int_in(opts.min_partition_size, max_split);
    let (mut left, mut right) = if vertical {
        (
            Node::new(node.x, node.y, offset, node.h),
            Node::new(node.x + offset, node.y, node.w - offset, node.h),
        )
    } else {
        (
            Node::new(node.x, node.y, node.w, offset),
            Node::new(node.x, node.y + offset, node.w, node.h - offset),
        )
    };
    split(&mut left, opts, depth + 1, rng);
    split(&mut right, opts, depth + 1, rng);
    node.left = Some(Box::new(left));
    node.right = Some(Box::new(right));
}

// Rooms are placed in leaf preorder so the draw sequence is fixed.
fn place_rooms(
    node: &mut Node,
    opts: &BspOpts,
    grid: &mut Grid<DungeonTile>,
    rooms: &mut usize,
    rng: &mut Mulberry32,
) {
    if let (Some(left), Some(right)) = (&mut node.left, &mut node.right) {
        place_rooms(left, opts, grid, rooms, rng);
        place_rooms(right, opts, grid, rooms, rng);
        return;
    }
    let avail_w = node.w.saturating_sub(2 * opts.padding);
    let avail_h = node.h.saturating_sub(2 * opts.padding);
    if avail_w < opts.min_room_size || avail_h < opts.min_room_size {
        return;
    }
    let w = rng.int_in(opts.min_room_size, avail_w);
    let h = rng.int_in(opts.min_room_size, avail_h);
    let x = rng.int_in(node.x + opts.padding, node.x + node.w - opts.padding - w);
    let y = rng.int_in(node.y + opts.padding, node.y + node.h - opts.padding - h);
    let room = RoomRect { x, y, w, h };
    for yy in y..y + h {
        for xx in x..x + w {
            grid.set(xx, yy, DungeonTile::Floor);
        }
    }
    node.room = Some(room);
    *rooms += 1;
}

// Post-order: children are wired internally before the two halves are
// joined, so every internal node bridges two already-coherent sides.
fn carve_corridors(node: &Node, grid: &mut Grid<DungeonTile>, rng: &mut Mulberry32) {
    let (Some(left), Some(right)) = (&node.left, &node.right) else {
        return;
    };
    carve_corridors(left, grid, rng);
    carve_corridors(right, grid, rng);
    let (Some(a), Some(b)) = (first_room(left), first_room(right)) else {
        return;
    };
    carve_l(grid, a.center(), b.center(), rng.chance(0.5));
}

fn first_room(node: &Node) -> Option<RoomRect> {
    if let Some(room) = node.room {
        return Some(room);
    }
    node.left
        .as_deref()
        .and_then(first_room)
        .or_else(|| node.right.as_deref().and_then(first_room))
}

// Corridor cells overwrite walls only, so crossing a room leaves its
// floor intact.
fn carve_l(
    grid: &mut Grid<DungeonTile>,
    a: (usize, usize),
    b: (usize, usize),
    horizontal_first: bool,
) {
    let (mut x, mut y) = a;
    let mut carve = |grid: &mut Grid<DungeonTile>, x: usize, y: usize| {
        if grid.get(x, y) == DungeonTile::Wall {
            grid.set(x, y, DungeonTile::Corridor);
        }
    };
    if horizontal_first {
        while x != b.0 {
            x = if b.0 > x { x + 1 } else { x - 1 };
            carve(grid, x, y);
        }
        while y != b.1 {
            y = if b.1 > y { y + 1 } else { y - 1 };
            carve(grid, x, y);
        }
    } else {
        while y != b.1 {
            y = if b.1 > y { y + 1 } else { y - 1 };
            carve(grid, x, y);
        }
        while x != b.0 {
            x = if b.0 > x { x + 1 } else { x - 1 };
            carve(grid, x, y);
        }
    }
}

// A corridor tile touching both room floor and wall is a doorway
// candidate.
fn place_doors(grid: &mut Grid<DungeonTile>, door_chance: f64, rng: &mut Mulberry32) {
    let n = grid.size();
    for y in 1..n - 1 {
        for x in 1..n - 1 {
            if grid.get(x, y) != DungeonTile::Corridor {
                continue;
            }
            let mut touches_floor = false;
            let mut touches_wall = false;
            for (dx, dy) in CARDINALS {
                match grid.get((x as i32 + dx) as usize, (y as i32 + dy) as usize) {
                    DungeonTile::Floor => touches_floor = true,
                    DungeonTile::Wall => touches_wall = true,
                    _ => {}
                }
            }
            if touches_floor && touches_wall && rng.chance(door_chance) {
                grid.set(x, y, DungeonTile::Door);
            }
        }
    }
}
