use glam::Vec3;
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use crate::config::{ConfigError, WorldConfig};
use crate::noise::{HeightGrid, NoiseField, seed_from_clock};

/// Collision box of a single terrain column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCell {
    /// World-space position the block is drawn at.
    pub origin: Vec3,
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub front: f32,
    pub back: f32,
}

impl MapCell {
    pub fn new(origin: Vec3, footprint: f32) -> Self {
        let half = footprint / 2.0;
        Self {
            origin,
            top: origin.y + footprint,
            left: origin.x - half,
            right: origin.x + half,
            front: origin.z - half,
            back: origin.z + half,
        }
    }

    /// True when `(x, z)` lies inside the horizontal footprint.
    pub fn covers(&self, x: f32, z: f32) -> bool {
        (self.left..=self.right).contains(&x) && (self.front..=self.back).contains(&z)
    }
}

/// Grid index for a world coordinate; may fall outside `[0, size)`.
///
/// Coordinates far off the map saturate to `±2 * size` so the index math
/// stays in range for any finite input.
pub fn grid_index(coord: f32, size: usize) -> i64 {
    let limit = size as f32 * 2.0;
    coord.floor().clamp(-limit, limit) as i64 + (size / 2) as i64
}

/// Per-cell collision boxes derived from a height grid, row-major `(x, z)`.
#[derive(Debug, Clone)]
pub struct MapGrid {
    size: usize,
    cells: Vec<MapCell>,
}

impl MapGrid {
    pub fn from_heights(heights: &HeightGrid, footprint: f32, elevation_offset: f32) -> Self {
        let size = heights.size();
        let init = -((size / 2) as f32);
        let mut cells = Vec::with_capacity(size * size);
        for x in 0..size {
            for z in 0..size {
                let origin = Vec3::new(
                    init + x as f32,
                    heights.get(x, z) + elevation_offset,
                    init + z as f32,
                );
                cells.push(MapCell::new(origin, footprint));
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the world center to the playable edge.
    pub fn half_extent(&self) -> f32 {
        (self.size / 2) as f32
    }

    pub fn cell(&self, x: usize, z: usize) -> Option<&MapCell> {
        if x < self.size && z < self.size {
            self.cells.get(x * self.size + z)
        } else {
            None
        }
    }

    /// Cell at signed grid coordinates, `None` outside the grid.
    pub fn cell_at(&self, x: i64, z: i64) -> Option<&MapCell> {
        let x = usize::try_from(x).ok()?;
        let z = usize::try_from(z).ok()?;
        self.cell(x, z)
    }

    /// Cell under a world-space position.
    pub fn cell_under(&self, position: Vec3) -> Option<&MapCell> {
        self.cell_at(
            grid_index(position.x, self.size),
            grid_index(position.z, self.size),
        )
    }

    pub fn cells(&self) -> impl Iterator<Item = &MapCell> {
        self.cells.iter()
    }
}

/// Generated terrain: the height grid and the collision map built from it.
pub struct World {
    pub heightmap: HeightGrid,
    pub map: MapGrid,
    seed: Option<u64>,
}

impl World {
    pub fn generate(config: &WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(seed_from_clock);
        let mut rng = StdRng::seed_from_u64(seed);
        let field = NoiseField::random(config.size, &mut rng)?.with_gain(config.gain);
        let heightmap = field.generate_noise(config.octaves)?;
        info!(
            "generated {}x{} terrain, {} octaves, seed {seed}, tallest column {}",
            config.size,
            config.size,
            config.octaves,
            heightmap.max_height()
        );
        let mut world = Self::from_heights(heightmap, config);
        world.seed = Some(seed);
        Ok(world)
    }

    pub fn from_heights(heightmap: HeightGrid, config: &WorldConfig) -> Self {
        let map = MapGrid::from_heights(&heightmap, config.footprint, config.elevation_offset);
        Self {
            heightmap,
            map,
            seed: None,
        }
    }

    /// RNG seed the terrain was generated from, if it was generated.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
