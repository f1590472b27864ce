//! Value-noise heightfield generation.
//!
//! A square grid of uniform seed values is smoothed by bilinear interpolation
//! between lattice points and summed over octaves, then quantized into whole
//! block heights.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::{ConfigError, HEIGHT_GAIN};

/// Square grid of elevation samples, row-major, indexed `(x, z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    size: usize,
    cells: Vec<f32>,
}

impl HeightGrid {
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for x in 0..size {
            for z in 0..size {
                cells.push(f(x, z));
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.cells[x * self.size + z]
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.cells.iter().copied()
    }

    pub fn max_height(&self) -> f32 {
        self.values().fold(f32::NEG_INFINITY, f32::max)
    }

    fn map(mut self, f: impl Fn(f32) -> f32) -> Self {
        for cell in &mut self.cells {
            *cell = f(*cell);
        }
        self
    }
}

/// Scales a raw sample and rounds it to a whole block step.
pub fn quantize(value: f32, gain: f32) -> f32 {
    (value * gain).round()
}

/// Seed for the terrain RNG taken from the wall clock, so every run differs.
pub fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

pub struct NoiseField {
    size: usize,
    gain: f32,
    /// Row-major, indexed `[y * size + x]`.
    seed: Vec<f32>,
}

impl NoiseField {
    /// Builds a field whose seed grid is drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, ConfigError> {
        check_size(size)?;
        let mut field = Self {
            size,
            gain: HEIGHT_GAIN,
            seed: Vec::new(),
        };
        field.generate_seed(rng);
        Ok(field)
    }

    /// Builds a field seeded from `seed`, a `StdRng` seed value.
    pub fn seeded(size: usize, seed: u64) -> Result<Self, ConfigError> {
        Self::random(size, &mut StdRng::seed_from_u64(seed))
    }

    /// Builds a field from an explicit seed grid (`size * size` values).
    pub fn from_seed(size: usize, seed: Vec<f32>) -> Result<Self, ConfigError> {
        check_size(size)?;
        if seed.len() != size * size {
            return Err(ConfigError::SeedLength {
                expected: size * size,
                actual: seed.len(),
            });
        }
        Ok(Self {
            size,
            gain: HEIGHT_GAIN,
            seed,
        })
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Refills the seed grid with independent uniform values in `[0, 1)`.
    pub fn generate_seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let cells = self.size * self.size;
        self.seed.clear();
        self.seed.extend((0..cells).map(|_| rng.random::<f32>()));
    }

    fn seed_at(&self, x: usize, y: usize) -> f32 {
        self.seed[y * self.size + x]
    }

    /// Smoothed samples in `[0, 1]` before quantization.
    pub fn sample(&self, octaves: u32) -> Result<HeightGrid, ConfigError> {
        if octaves == 0 {
            return Err(ConfigError::NoOctaves);
        }
        let n = self.size;
        // Every octave samples the same N/2 lattice; only the weight halves.
        let spacing = n / 2;

        Ok(HeightGrid::from_fn(n, |i, j| {
            let cur_x = (i / spacing) * spacing;
            let next_x = (cur_x + spacing) % n;
            let cur_y = (j / spacing) * spacing;
            let next_y = (cur_y + spacing) % n;

            let fx = (i - cur_x) as f32 / spacing as f32;
            let fy = (j - cur_y) as f32 / spacing as f32;

            let a = lerp(self.seed_at(cur_x, cur_y), self.seed_at(next_x, cur_y), fx);
            let b = lerp(self.seed_at(cur_x, next_y), self.seed_at(next_x, next_y), fx);
            let layer = lerp(a, b, fy);

            let mut total = 0.0;
            let mut weight = 0.0;
            let mut scale = 1.0;
            for _ in 0..octaves {
                total += layer * scale;
                weight += scale;
                scale /= 2.0;
            }
            total / weight
        }))
    }

    /// Quantizes every cell to `round(value * gain)`.
    pub fn normalize(&self, grid: HeightGrid) -> HeightGrid {
        let gain = self.gain;
        grid.map(|value| quantize(value, gain))
    }

    /// Full pipeline: smoothed samples, quantized to block heights.
    pub fn generate_noise(&self, octaves: u32) -> Result<HeightGrid, ConfigError> {
        let raw = self.sample(octaves)?;
        Ok(self.normalize(raw))
    }
}

fn check_size(size: usize) -> Result<(), ConfigError> {
    if size < 2 {
        Err(ConfigError::InvalidWorldSize(size))
    } else {
        Ok(())
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_complete_and_finite() {
        for size in [2, 3, 4, 17, 64] {
            let field = NoiseField::seeded(size, 7).unwrap();
            let grid = field.generate_noise(6).unwrap();
            assert_eq!(grid.size(), size);
            assert_eq!(grid.values().count(), size * size);
            assert!(grid.values().all(f32::is_finite));
        }
    }

    #[test]
    fn constant_seed_gives_flat_terrain() {
        let field = NoiseField::from_seed(4, vec![0.5; 16]).unwrap();
        let grid = field.generate_noise(1).unwrap();
        assert!(grid.values().all(|h| h == 10.0));
    }

    #[test]
    fn heights_are_whole_blocks_within_gain() {
        let field = NoiseField::seeded(32, 99).unwrap();
        let grid = field.generate_noise(4).unwrap();
        for h in grid.values() {
            assert_eq!(h, h.round());
            assert!((0.0..=HEIGHT_GAIN).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn lattice_points_reproduce_seed() {
        let seed: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();
        let field = NoiseField::from_seed(4, seed.clone()).unwrap();
        let raw = field.sample(1).unwrap();
        // (x, z) = (2, 0) is a lattice point: seed row 0, column 2.
        assert_eq!(raw.get(0, 0), seed[0]);
        assert_eq!(raw.get(2, 0), seed[2]);
        assert_eq!(raw.get(0, 2), seed[2 * 4]);
    }

    #[test]
    fn octaves_share_one_lattice() {
        let field = NoiseField::seeded(16, 3).unwrap();
        let one = field.sample(1).unwrap();
        let many = field.sample(6).unwrap();
        for (a, b) in one.values().zip(many.values()) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn rounding_step_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let x: f32 = rng.random();
            let once = quantize(x, HEIGHT_GAIN);
            assert_eq!(once.round(), once);
        }
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(
            NoiseField::seeded(0, 1).err(),
            Some(ConfigError::InvalidWorldSize(0))
        );
        assert_eq!(
            NoiseField::seeded(1, 1).err(),
            Some(ConfigError::InvalidWorldSize(1))
        );
        assert_eq!(
            NoiseField::from_seed(4, vec![0.0; 3]).err(),
            Some(ConfigError::SeedLength { expected: 16, actual: 3 })
        );
    }

    #[test]
    fn zero_octaves_is_an_error() {
        let field = NoiseField::seeded(4, 1).unwrap();
        assert_eq!(field.generate_noise(0), Err(ConfigError::NoOctaves));
    }

    #[test]
    fn same_seed_same_terrain() {
        let a = NoiseField::seeded(16, 42).unwrap().generate_noise(6).unwrap();
        let b = NoiseField::seeded(16, 42).unwrap().generate_noise(6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn regenerating_seed_replaces_values() {
        let mut field = NoiseField::from_seed(4, vec![0.5; 16]).unwrap();
        field.generate_seed(&mut StdRng::seed_from_u64(5));
        let grid = field.sample(1).unwrap();
        assert!(grid.values().any(|v| v != 0.5));
    }
}
