//! Voxel terrain demo core: value-noise heightfield generation, positional
//! collision against the resulting block map, and the per-frame scene state
//! built on top of them.

pub mod actor;
pub mod bezier;
pub mod camera;
pub mod camera_controller;
pub mod collision;
pub mod config;
pub mod model;
pub mod noise;
pub mod simulation;
pub mod world;

pub use bezier::cubic_bezier;
pub use collision::{collide_with_actor, collide_with_map, is_grounded, spheres_overlap};
pub use config::{ConfigError, SimulationConfig, WorldConfig};
pub use noise::{HeightGrid, NoiseField};
pub use simulation::{FrameInput, Simulation, Status};
pub use world::{MapCell, MapGrid, World};
