use glam::Vec3;

pub const DEFAULT_WORLD_SIZE: usize = 128;
pub const DEFAULT_OCTAVES: u32 = 6;
pub const HEIGHT_GAIN: f32 = 20.0;
pub const BLOCK_FOOTPRINT: f32 = 2.0;
pub const ELEVATION_OFFSET: f32 = -20.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("world size must be at least 2, got {0}")]
    InvalidWorldSize(usize),
    #[error("octave count must be at least 1")]
    NoOctaves,
    #[error("seed grid needs {expected} values, got {actual}")]
    SeedLength { expected: usize, actual: usize },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub size: usize,
    pub octaves: u32,
    pub gain: f32,
    pub footprint: f32,
    pub elevation_offset: f32,
    /// Pins the seed grid RNG. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_WORLD_SIZE,
            octaves: DEFAULT_OCTAVES,
            gain: HEIGHT_GAIN,
            footprint: BLOCK_FOOTPRINT,
            elevation_offset: ELEVATION_OFFSET,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < 2 {
            return Err(ConfigError::InvalidWorldSize(self.size));
        }
        if self.octaves == 0 {
            return Err(ConfigError::NoOctaves);
        }
        positive("gain", self.gain)?;
        positive("footprint", self.footprint)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub camera_speed: f32,
    pub camera_start: Vec3,
    pub orbit_distance: f32,
    pub orbit_target: Vec3,

    pub cow_start: Vec3,
    pub cow_fall_speed: f32,
    pub cow_size: Vec3,

    pub shell_start: Vec3,
    pub shell_speed: f32,
    pub shell_turn_speed: f32,
    pub shell_fall_speed: f32,
    pub shell_radius: f32,

    /// Leaf path: start, end, and the two control points.
    pub leaf_path: [Vec3; 4],
    pub leaf_speed: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            camera_speed: 10.0,
            camera_start: Vec3::new(-1.0, 1.0, 5.0),
            orbit_distance: 2.5,
            orbit_target: Vec3::new(0.0, ELEVATION_OFFSET, 0.0),

            cow_start: Vec3::new(-2.0, 0.0, -2.0),
            cow_fall_speed: 5.0,
            cow_size: Vec3::splat(2.0),

            shell_start: Vec3::new(6.0, 0.0, 6.0),
            shell_speed: 4.0,
            shell_turn_speed: 2.0,
            shell_fall_speed: 5.0,
            shell_radius: 1.0,

            leaf_path: [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, -4.0, 0.0),
                Vec3::new(-10.0, -6.0, 0.0),
                Vec3::new(0.0, -10.0, 0.0),
            ],
            leaf_speed: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("camera_speed", self.camera_speed)?;
        positive("orbit_distance", self.orbit_distance)?;
        positive("cow_fall_speed", self.cow_fall_speed)?;
        positive("shell_speed", self.shell_speed)?;
        positive("shell_fall_speed", self.shell_fall_speed)?;
        positive("shell_radius", self.shell_radius)?;
        positive("leaf_speed", self.leaf_speed)?;
        if self.cow_size.min_element() <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "cow_size",
                value: self.cow_size.min_element(),
            });
        }
        Ok(())
    }
}
