//! Per-frame scene state and the order in which it is updated.
//!
//! The simulation owns every piece of mutable frame state: the camera, the
//! actors, the leaf path and one rollback cache per actor the camera can
//! bump into. Terrain is read-only once the simulation is built.

use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::actor::Actor;
use crate::bezier::BezierPath;
use crate::camera::{Camera, CameraMode, Movement};
use crate::collision::{Bounds, MapContact, RollbackCache, collide_with_actor, collide_with_map};
use crate::config::{ConfigError, SimulationConfig};
use crate::world::World;

/// Input gathered for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub movement: Option<Movement>,
    pub look_delta: Vec2,
    pub zoom_delta: f32,
    pub toggle_mode: bool,
    /// -1 backward, 1 forward.
    pub shell_drive: f32,
    /// -1 left, 1 right.
    pub shell_turn: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// The camera reached the shell.
    Won,
}

pub struct Simulation {
    pub world: World,
    pub camera: Camera,
    pub cow: Actor,
    pub shell: Actor,
    pub leaf: BezierPath,
    leaf_position: Vec3,
    cow_rollback: RollbackCache,
    shell_rollback: RollbackCache,
    config: SimulationConfig,
    status: Status,
}

impl Simulation {
    pub fn new(world: World, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let camera = Camera::new(
            config.camera_start,
            config.orbit_target,
            config.orbit_distance,
            config.camera_speed,
        );
        let cow = Actor::new(config.cow_start, Bounds::cuboid(config.cow_size));
        let shell = Actor::new(
            config.shell_start,
            Bounds::Sphere {
                radius: config.shell_radius,
            },
        );
        let [start, end, c0, c1] = config.leaf_path;
        let leaf = BezierPath::new(start, end, [c0, c1], config.leaf_speed);

        Ok(Self {
            world,
            camera,
            cow,
            shell,
            leaf,
            leaf_position: start,
            cow_rollback: RollbackCache::new(),
            shell_rollback: RollbackCache::new(),
            config,
            status: Status::Running,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn leaf_position(&self) -> Vec3 {
        self.leaf_position
    }

    /// Advances the scene by `dt` seconds.
    pub fn step(&mut self, dt: f32, input: &FrameInput) -> Status {
        if self.status == Status::Won {
            return self.status;
        }
        let map = &self.world.map;

        if input.toggle_mode {
            self.camera.toggle_mode();
            debug!("camera mode {:?}", self.camera.mode);
        }
        self.camera.turn(input.look_delta);
        self.camera.zoom(input.zoom_delta);
        self.camera.travel(input.movement, dt);
        if self.camera.mode == CameraMode::Free {
            let contact = collide_with_map(&mut self.camera.position, map);
            if contact != MapContact::None {
                debug!("camera clamped by terrain: {contact:?}");
            }
        }

        let was = self.cow.support();
        let now = self.cow.fall(map, self.config.cow_fall_speed, dt);
        if was != now {
            debug!("cow {now:?} at {}", self.cow.position);
        }

        self.shell.drive(
            input.shell_drive,
            input.shell_turn,
            self.config.shell_speed,
            self.config.shell_turn_speed,
            dt,
        );
        collide_with_map(&mut self.shell.position, map);
        let was = self.shell.support();
        let now = self.shell.fall(map, self.config.shell_fall_speed, dt);
        if was != now {
            debug!("shell {now:?} at {}", self.shell.position);
        }

        if collide_with_actor(
            &mut self.camera.position,
            self.cow.position,
            self.cow.bounds,
            &mut self.cow_rollback,
        ) {
            debug!("camera rolled back out of the cow");
        }
        if collide_with_actor(
            &mut self.camera.position,
            self.shell.position,
            self.shell.bounds,
            &mut self.shell_rollback,
        ) {
            info!("camera reached the shell, you win");
            self.status = Status::Won;
        }

        self.leaf_position = self.leaf.advance(dt);
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Support;
    use crate::config::WorldConfig;
    use crate::noise::HeightGrid;
    use glam::Vec4;

    /// Flat terrain whose block tops sit at y = -8.
    fn simulation(config: SimulationConfig) -> Simulation {
        let world = World::from_heights(HeightGrid::from_fn(32, |_, _| 10.0), &WorldConfig::default());
        Simulation::new(world, config).unwrap()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn rejects_invalid_config() {
        let world = World::from_heights(HeightGrid::from_fn(4, |_, _| 0.0), &WorldConfig::default());
        let config = SimulationConfig {
            shell_radius: -1.0,
            ..Default::default()
        };
        assert!(Simulation::new(world, config).is_err());
    }

    #[test]
    fn cow_lands_on_the_terrain() {
        let mut sim = simulation(SimulationConfig::default());
        for _ in 0..100 {
            sim.step(0.05, &idle());
        }
        assert_eq!(sim.cow.support(), Support::Grounded);
        assert_eq!(sim.cow.position.y, -8.0);
        assert_eq!(sim.shell.support(), Support::Grounded);
    }

    #[test]
    fn camera_cannot_sink_into_terrain() {
        let mut sim = simulation(SimulationConfig {
            camera_start: Vec3::new(10.0, -15.0, 10.0),
            ..Default::default()
        });
        sim.step(0.01, &idle());
        assert_eq!(sim.camera.position, Vec4::new(10.0, -8.0, 10.0, 1.0));
    }

    #[test]
    fn camera_is_pushed_out_of_the_cow() {
        let mut sim = simulation(SimulationConfig {
            camera_start: Vec3::new(-2.0, 2.0, 0.5),
            cow_start: Vec3::new(-2.0, 0.0, -2.0),
            ..Default::default()
        });
        // Cow drops to rest with its box spanning y in (-9, -7).
        for _ in 0..100 {
            sim.step(0.05, &idle());
        }
        sim.camera.position = Vec4::new(-2.0, -7.5, 0.5, 1.0);
        sim.step(0.0, &idle());
        let safe = sim.camera.position;

        sim.camera.position = Vec4::new(-2.0, -7.5, -2.5, 1.0);
        sim.step(0.0, &idle());
        assert_eq!(sim.camera.position, safe);
        assert_eq!(sim.status(), Status::Running);
    }

    #[test]
    fn touching_the_shell_wins() {
        let mut sim = simulation(SimulationConfig::default());
        for _ in 0..100 {
            sim.step(0.05, &idle());
        }
        let shell = sim.shell.position;
        sim.camera.position = (shell + Vec3::new(0.0, 0.5, 0.0)).extend(1.0);
        assert_eq!(sim.step(0.0, &idle()), Status::Won);

        // Further frames are ignored once won.
        let camera = sim.camera.position;
        let input = FrameInput {
            movement: Some(Movement::Forward),
            ..idle()
        };
        assert_eq!(sim.step(1.0, &input), Status::Won);
        assert_eq!(sim.camera.position, camera);
    }

    #[test]
    fn shell_drives_and_stays_on_the_map() {
        let mut sim = simulation(SimulationConfig::default());
        let drive = FrameInput {
            shell_drive: 1.0,
            ..idle()
        };
        for _ in 0..400 {
            sim.step(0.05, &drive);
        }
        let half = sim.world.map.half_extent();
        assert!(sim.shell.position.z >= -half);
        assert!(sim.shell.position.y >= -8.0);
    }

    #[test]
    fn leaf_loops_along_its_path() {
        let mut sim = simulation(SimulationConfig::default());
        let start = SimulationConfig::default().leaf_path[0];
        sim.step(5.0, &idle());
        assert_eq!(sim.leaf_position(), start);
        sim.step(6.0, &idle());
        sim.step(0.1, &idle());
        assert!(sim.leaf_position().abs_diff_eq(start, 1e-6));
    }

    #[test]
    fn look_mode_leaves_free_position_alone() {
        let mut sim = simulation(SimulationConfig {
            camera_start: Vec3::new(10.0, -15.0, 10.0),
            ..Default::default()
        });
        let toggle = FrameInput {
            toggle_mode: true,
            ..idle()
        };
        sim.step(0.01, &toggle);
        assert_eq!(sim.camera.mode, CameraMode::Look);
        assert_eq!(sim.camera.position.y, -15.0);
    }
}
