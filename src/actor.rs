use glam::Vec3;

use crate::collision::{Bounds, ground_height, is_grounded};
use crate::world::MapGrid;

/// Whether an actor is resting on terrain this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Falling,
    Grounded,
}

/// A mobile, non-player object in the scene: the cow or the shell.
#[derive(Debug, Clone)]
pub struct Actor {
    pub position: Vec3,
    /// Heading around +Y in radians.
    pub yaw: f32,
    pub bounds: Bounds,
    support: Support,
}

impl Actor {
    pub fn new(position: Vec3, bounds: Bounds) -> Self {
        Self {
            position,
            yaw: 0.0,
            bounds,
            support: Support::Falling,
        }
    }

    pub fn support(&self) -> Support {
        self.support
    }

    /// Drops the actor at `fall_speed` until it meets the ground, then rests
    /// it on the highest block top beneath it. Returns the new support state.
    pub fn fall(&mut self, map: &MapGrid, fall_speed: f32, dt: f32) -> Support {
        if !is_grounded(self.position, map) {
            self.position.y -= fall_speed * dt;
        }
        self.support = match ground_height(self.position, map) {
            Some(top) if self.position.y <= top => {
                self.position.y = top;
                Support::Grounded
            }
            _ => Support::Falling,
        };
        self.support
    }

    /// Unit vector the actor faces on the ground plane.
    pub fn heading(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Turns by `turn` and moves `drive` along the heading, both scaled by `dt`.
    pub fn drive(&mut self, drive: f32, turn: f32, speed: f32, turn_speed: f32, dt: f32) {
        self.yaw += turn * turn_speed * dt;
        self.position += self.heading() * drive * speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::HeightGrid;

    fn flat_map(height: f32) -> MapGrid {
        MapGrid::from_heights(&HeightGrid::from_fn(16, |_, _| height), 2.0, 0.0)
    }

    fn cube() -> Bounds {
        Bounds::cuboid(Vec3::splat(2.0))
    }

    #[test]
    fn falls_until_grounded_then_rests_on_top() {
        let map = flat_map(4.0);
        let mut cow = Actor::new(Vec3::new(-2.0, 12.0, -2.0), cube());

        assert_eq!(cow.fall(&map, 5.0, 0.5), Support::Falling);
        assert_eq!(cow.position.y, 9.5);

        assert_eq!(cow.fall(&map, 5.0, 0.5), Support::Falling);
        assert_eq!(cow.fall(&map, 5.0, 0.5), Support::Grounded);
        assert_eq!(cow.position.y, 6.0);

        assert_eq!(cow.fall(&map, 5.0, 0.5), Support::Grounded);
        assert_eq!(cow.position.y, 6.0);
    }

    #[test]
    fn leaves_ground_when_moved_off_a_ledge() {
        let heights = HeightGrid::from_fn(16, |x, _| if x < 8 { 10.0 } else { 0.0 });
        let map = MapGrid::from_heights(&heights, 2.0, 0.0);
        let mut shell = Actor::new(Vec3::new(-1.0, 12.0, 0.0), Bounds::Sphere { radius: 1.0 });
        assert_eq!(shell.fall(&map, 5.0, 0.1), Support::Grounded);

        // Four columns past the cliff edge the lookback window sees only low ground.
        shell.position.x = 4.0;
        assert_eq!(shell.fall(&map, 5.0, 0.1), Support::Falling);
        assert!(shell.position.y < 12.0);
    }

    #[test]
    fn outside_the_map_keeps_falling() {
        let map = flat_map(0.0);
        let mut cow = Actor::new(Vec3::new(100.0, 0.0, 0.0), cube());
        assert_eq!(cow.fall(&map, 5.0, 1.0), Support::Falling);
        assert_eq!(cow.position.y, -5.0);
    }

    #[test]
    fn drive_follows_heading() {
        let mut shell = Actor::new(Vec3::ZERO, Bounds::Sphere { radius: 1.0 });
        shell.drive(1.0, 0.0, 4.0, 2.0, 0.5);
        assert!(shell.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));

        shell.drive(0.0, 1.0, 4.0, std::f32::consts::FRAC_PI_2, 1.0);
        shell.drive(1.0, 0.0, 4.0, 2.0, 0.5);
        assert!(shell.position.abs_diff_eq(Vec3::new(2.0, 0.0, -2.0), 1e-5));
    }
}
