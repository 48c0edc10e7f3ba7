//! Generation options, result types and the error taxonomy.
//!
//! Option structs derive Serialize + Deserialize with per-field defaults
//! so a partial JSON options bag deserializes into the documented
//! defaults; the stats bag serializes only the keys a generator filled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::grid::Grid;
use crate::tile::{DungeonTile, TerrainTile};

/// Smallest accepted grid size.
pub const MIN_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

// -- Generator kinds and per-kind options --------------------------

/// Which generator to run, with its tuning knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Kind {
    Default,
    Caves(CaveOpts),
    Drunkard(DrunkardOpts),
    Bsp(BspOpts),
    Wfc(WfcOpts),
    Maze(MazeOpts),
    Perlin(PerlinOpts),
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Default => "default",
            Kind::Caves(_) => "caves",
            Kind::Drunkard(_) => "drunkard",
            Kind::Bsp(_) => "bsp",
            Kind::Wfc(_) => "wfc",
            Kind::Maze(_) => "maze",
            Kind::Perlin(_) => "perlin",
        }
    }
}

impl FromStr for Kind {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Kind::Default),
            "caves" => Ok(Kind::Caves(CaveOpts::default())),
            "drunkard" => Ok(Kind::Drunkard(DrunkardOpts::default())),
            "bsp" => Ok(Kind::Bsp(BspOpts::default())),
            "wfc" => Ok(Kind::Wfc(WfcOpts::default())),
            "maze" => Ok(Kind::Maze(MazeOpts::default())),
            "perlin" => Ok(Kind::Perlin(PerlinOpts::default())),
            other => Err(GenerateError::UnknownKind(other.to_string())),
        }
    }
}

/// Region-repair policy applied when a generator leaves multiple
/// walkable regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityPolicy {
    /// Fill every region but the largest with wall.
    #[default]
    KeepLargest,
    /// Carve corridors between nearest regions until one remains.
    Stitch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaveOpts {
    /// Initial wall density of the random seed grid.
    #[serde(default = "default_initial_density")]
    pub initial_density: f64,
    /// Smoothing passes of the 4-5 rule.
    #[serde(default = "default_cave_iterations")]
    pub iterations: u32,
    #[serde(default)]
    pub connectivity: ConnectivityPolicy,
}

impl Default for CaveOpts {
    fn default() -> Self {
        CaveOpts {
            initial_density: default_initial_density(),
            iterations: default_cave_iterations(),
            connectivity: ConnectivityPolicy::KeepLargest,
        }
    }
}

fn default_initial_density() -> f64 {
    0.45
}

fn default_cave_iterations() -> u32 {
    3
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrunkardVariant {
    Simple,
    Multiple,
    #[default]
    Weighted,
}

impl DrunkardVariant {
    pub fn name(self) -> &'static str {
        match self {
            DrunkardVariant::Simple => "simple",
            DrunkardVariant::Multiple => "multiple",
            DrunkardVariant::Weighted => "weighted",
        }
    }
}

impl FromStr for DrunkardVariant {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(DrunkardVariant::Simple),
            "multiple" => Ok(DrunkardVariant::Multiple),
            "weighted" => Ok(DrunkardVariant::Weighted),
            other => Err(GenerateError::UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrunkardOpts {
    #[serde(default)]
    pub variant: DrunkardVariant,
    /// Fraction of the grid the walkers try to carve.
    #[serde(default = "default_fill_percentage")]
    pub fill_percentage: f64,
    /// Walker count for the `multiple` variant.
    #[serde(default = "default_num_walkers")]
    pub num_walkers: u32,
}

impl Default for DrunkardOpts {
    fn default() -> Self {
        DrunkardOpts {
            variant: DrunkardVariant::Weighted,
            fill_percentage: default_fill_percentage(),
            num_walkers: default_num_walkers(),
        }
    }
}

fn default_fill_percentage() -> f64 {
    0.45
}

fn default_num_walkers() -> u32 {
    4
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BspOpts {
    #[serde(default = "default_min_partition_size")]
    pub min_partition_size: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_min_room_size")]
    pub min_room_size: usize,
    /// Blank margin kept between a room and its partition edge.
    #[serde(default = "default_padding")]
    pub padding: usize,
    #[serde(default)]
    pub place_doors: bool,
    #[serde(default = "default_door_chance")]
    pub door_chance: f64,
}

impl Default for BspOpts {
    fn default() -> Self {
        BspOpts {
            min_partition_size: default_min_partition_size(),
            max_depth: default_max_depth(),
            min_room_size: default_min_room_size(),
            padding: default_padding(),
            place_doors: false,
            door_chance: default_door_chance(),
        }
    }
}

fn default_min_partition_size() -> usize {
    6
}

fn default_max_depth() -> u32 {
    4
}

fn default_min_room_size() -> usize {
    3
}

fn default_padding() -> usize {
    1
}

fn default_door_chance() -> f64 {
    0.3
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WfcOpts {
    /// Snapshot restarts allowed before giving up on contradictions.
    #[serde(default = "default_max_backtracks")]
    pub max_backtracks: u32,
}

impl Default for WfcOpts {
    fn default() -> Self {
        WfcOpts { max_backtracks: default_max_backtracks() }
    }
}

fn default_max_backtracks() -> u32 {
    100
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeAlgorithm {
    #[default]
    Backtracking,
    Prim,
    Division,
}

impl MazeAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            MazeAlgorithm::Backtracking => "backtracking",
            MazeAlgorithm::Prim => "prim",
            MazeAlgorithm::Division => "division",
        }
    }
}

impl FromStr for MazeAlgorithm {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backtracking" => Ok(MazeAlgorithm::Backtracking),
            "prim" => Ok(MazeAlgorithm::Prim),
            "division" => Ok(MazeAlgorithm::Division),
            other => Err(GenerateError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeOpts {
    #[serde(default)]
    pub algorithm: MazeAlgorithm,
    /// Chance to knock out a wall segment, making the maze imperfect.
    #[serde(default)]
    pub loop_chance: f64,
    /// Like `loop_chance` but applied to every interior wall.
    #[serde(default)]
    pub openness: f64,
}

impl Default for MazeOpts {
    fn default() -> Self {
        MazeOpts {
            algorithm: MazeAlgorithm::Backtracking,
            loop_chance: 0.0,
            openness: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerlinOpts {
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// Base noise frequency.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f64,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    #[serde(default)]
    pub island_mode: bool,
    #[serde(default = "default_island_falloff")]
    pub island_falloff: f64,
    #[serde(default = "default_erosion_iterations")]
    pub erosion_iterations: u32,
    /// Shallow-water band threshold; deep water cuts off 0.1 below it.
    #[serde(default = "default_water_level")]
    pub water_level: f64,
}

impl Default for PerlinOpts {
    fn default() -> Self {
        PerlinOpts {
            octaves: default_octaves(),
            scale: default_scale(),
            lacunarity: default_lacunarity(),
            persistence: default_persistence(),
            island_mode: false,
            island_falloff: default_island_falloff(),
            erosion_iterations: default_erosion_iterations(),
            water_level: default_water_level(),
        }
    }
}

fn default_octaves() -> u32 {
    4
}

fn default_scale() -> f64 {
    0.1
}

fn default_lacunarity() -> f64 {
    2.0
}

fn default_persistence() -> f64 {
    0.5
}

fn default_island_falloff() -> f64 {
    1.8
}

fn default_erosion_iterations() -> u32 {
    2
}

fn default_water_level() -> f64 {
    0.35
}

// -- Common options ------------------------------------------------

/// Options shared by every generator kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// 32-bit seed; a nondeterministic one is derived when absent.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Repair the walkable set into a single region after generation.
    #[serde(default = "default_true")]
    pub ensure_connected: bool,
    /// Place START/END markers. Defaults to the per-kind behavior
    /// (on for mazes, off elsewhere) when unset.
    #[serde(default)]
    pub place_markers: Option<bool>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions { seed: None, ensure_connected: true, place_markers: None }
    }
}

fn default_true() -> bool {
    true
}

// -- Results -------------------------------------------------------

/// The emitted grid, tagged by vocabulary.
#[derive(Clone, Debug, PartialEq)]
pub enum MapGrid {
    Dungeon(Grid<DungeonTile>),
    Terrain(Grid<TerrainTile>),
}

impl MapGrid {
    pub fn size(&self) -> usize {
        match self {
            MapGrid::Dungeon(g) => g.size(),
            MapGrid::Terrain(g) => g.size(),
        }
    }

    /// Raw integer value of the tile at `(x, y)`.
    pub fn tile_value(&self, x: usize, y: usize) -> u8 {
        match self {
            MapGrid::Dungeon(g) => g.get(x, y).value(),
            MapGrid::Terrain(g) => g.get(x, y).value(),
        }
    }

    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        match self {
            MapGrid::Dungeon(g) => g.get(x, y).is_walkable(),
            MapGrid::Terrain(g) => g.get(x, y).is_walkable(),
        }
    }

    /// The grid as rows of raw tile values.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        let n = self.size();
        let mut rows = Vec::with_capacity(n);
        for y in 0..n {
            let mut row = Vec::with_capacity(n);
            for x in 0..n {
                row.push(self.tile_value(x, y));
            }
            rows.push(row);
        }
        rows
    }
}

// Serialized as nested rows of integers; the vocabulary is recorded in
// the surrounding stats, not in the grid itself.
impl Serialize for MapGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

/// Per-generation quality metadata. Only the keys relevant to the
/// generator that ran are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MapStats {
    pub seed_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Walkable share of the whole grid, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_percentage: Option<f64>,
    /// Walkable region count after the post-pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Coord>,
    /// Floor cells actually carved vs. requested (drunkard shortfall).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carved: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carve_target: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtracks: Option<u32>,
    /// Set when WFC exhausted its backtrack budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mountain_percentage: Option<f64>,
}

/// A finished generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Generated {
    pub grid: MapGrid,
    pub seed_used: u32,
    pub stats: MapStats,
}

// -- Errors --------------------------------------------------------

/// Invalid-argument failures. Generation shortfalls are not errors;
/// they are reported through [`MapStats`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("grid size must be at least {MIN_SIZE}, got {0}")]
    SizeTooSmall(usize),
    #[error("unknown generator kind `{0}`")]
    UnknownKind(String),
    #[error("unknown drunkard variant `{0}`")]
    UnknownVariant(String),
    #[error("unknown maze algorithm `{0}`")]
    UnknownAlgorithm(String),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -- Tests ---------------------------------------------------------
