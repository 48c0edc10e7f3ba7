//! Seeded Perlin terrain generator.
//!
//! Classic permutation-table Perlin noise summed over fractal octaves,
//! optionally shaped by a radial island mask, relaxed by a few
//! diffusion passes, then banded into terrain tiers. The permutation
//! table is the only seeded state; two runs with the same seed produce
//! the same heightfield bit for bit.

use crate::grid::{Grid, CARDINALS};
use crate::prng::Mulberry32;
use crate::tile::TerrainTile;
use crate::types::PerlinOpts;

pub fn generate(size: usize, opts: &PerlinOpts, rng: &mut Mulberry32) -> Grid<TerrainTile> {
    let noise = PerlinNoise::seeded(rng);
    let mut height = vec![0.0f64; size * size];
    for y in 0..size {
        for x in 0..size {
            let mut v = noise.fractal(x as f64, y as f64, opts);
            if opts.island_mode {
                v *= island_mask(size, x, y, opts.island_falloff);
            }
            height[y * size + x] = v;
        }
    }
    for _ in 0..opts.erosion_iterations {
        height = diffuse(&height, size);
    }
    band(&height, size, opts)
}

struct PerlinNoise {
    perm: [usize; 512],
}

impl PerlinNoise {
    // Shuffled byte table doubled onto itself, so hash lookups never
    // need wrapping.
    fn seeded(rng: &mut Mulberry32) -> Self {
        let mut base: Vec<usize> = (0..256).collect();
        rng.shuffle(&mut base);
        let mut perm = [0usize; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i % 256];
        }
        PerlinNoise { perm }
    }

    /// Raw 2D noise at `(x, y)`, roughly in `[-1, 1]`.
    fn noise(&self, x: f64, y: f64) -> f64 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();
        let u = fade(xf);
        let v = fade(yf);

        let aa = self.perm[self.perm[xi] + yi];
        let ab = self.perm[self.perm[xi] + yi + 1];
        let ba = self.perm[self.perm[xi + 1] + yi];
        let bb = self.perm[self.perm[xi + 1] + yi + 1];

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        lerp(x1, x2, v)
    }

    /// Octave sum normalized into `[0, 1]`.
    fn fractal(&self, x: f64, y: f64, opts: &PerlinOpts) -> f64 {
        let mut total = 0.0;
        let mut frequency = opts.scale;
        let mut amplitude = 1.0;
        let mut amplitude_sum = 0.0;
        for _ in 0..opts.octaves {
            total += amplitude * self.noise(x * frequency, y * frequency);
            amplitude_sum += amplitude;
            frequency *= opts.lacunarity;
            amplitude *= opts.persistence;
        }
        (total / amplitude_sum + 1.0) / 2.0
    }
}

/// The quintic `6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

// The low two hash bits select one of the four diagonal gradients.
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

// Radial falloff: 1 at the center, 0 from the inscribed-circle edge
// outward. Distance is normalized by the half-extent.
fn island_mask(size: usize, x: usize, y: usize, falloff: f64) -> f64 {
    let half = size as f64 / 2.0;
    let dx = x as f64 - (size as f64 - 1.0) / 2.0;
    let dy = y as f64 - (size as f64 - 1.0) / 2.0;
    let d = (dx * dx + dy * dy).sqrt() / half;
    (1.0 - d.powf(falloff)).max(0.0)
}

// One smoothing pass: each cell keeps 80% of its height and takes 20%
// from the average of its in-bounds 4-neighbors.
fn diffuse(height: &[f64], size: usize) -> Vec<f64> {
    let mut next = vec![0.0f64; size * size];
    for y in 0..size {
        for x in 0..size {
            let mut sum = 0.0;
            let mut count = 0;
            for (dx, dy) in CARDINALS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < size && (ny as usize) < size {
                    sum += height[ny as usize * size + nx as usize];
                    count += 1;
                }
            }
            let own = height[y * size + x];
            next[y * size + x] = 0.8 * own + 0.2 * (sum / f64::from(count));
        }
    }
    next
}

fn band(height: &[f64], size: usize, opts: &PerlinOpts) -> Grid<TerrainTile> {
    let deep = opts.water_level - 0.1;
    let mut grid = Grid::filled(size, TerrainTile::DeepWater);
    for y in 0..size {
        for x in 0..size {
            let v = height[y * size + x];
            let tile = if v < deep {
                TerrainTile::DeepWater
            } else if v < opts.water_level {
                TerrainTile::Water
            } else if v < 0.4 {
                TerrainTile::Sand
            } else if v < 0.6 {
                TerrainTile::Grass
            } else if v < 0.75 {
                TerrainTile::Forest
            } else {
                TerrainTile::Mountain
            };
            grid.set(x, y, tile);
        }
    }
    grid
}
