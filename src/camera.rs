use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Pitch limit, kept just short of straight up/down so `look_to` stays valid.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.001;
const MOUSE_SENSITIVITY: f32 = 0.0005;
const ZOOM_SENSITIVITY: f32 = 0.1;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Free,
    Look,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Spherical angles: `theta` around +Y from -Z, `phi` above the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Angles {
    pub theta: f32,
    pub phi: f32,
}

impl Angles {
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            -self.phi.cos() * self.theta.sin(),
            -self.phi.sin(),
            -self.phi.cos() * self.theta.cos(),
        )
    }

    fn turn(&mut self, delta: Vec2) {
        self.theta -= MOUSE_SENSITIVITY * delta.x;
        self.phi = (self.phi + MOUSE_SENSITIVITY * delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

pub struct Camera {
    pub mode: CameraMode,
    pub position: Vec4,
    pub free: Angles,
    pub look: Angles,
    pub target: Vec3,
    pub distance: f32,
    pub speed: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, distance: f32, speed: f32) -> Self {
        Self {
            mode: CameraMode::Free,
            position: position.extend(1.0),
            free: Angles::default(),
            look: Angles::default(),
            target,
            distance,
            speed,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Free => CameraMode::Look,
            CameraMode::Look => CameraMode::Free,
        };
    }

    pub fn turn(&mut self, delta: Vec2) {
        match self.mode {
            CameraMode::Free => self.free.turn(delta),
            CameraMode::Look => self.look.turn(delta),
        }
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - ZOOM_SENSITIVITY * scroll).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Moves the free-flight position; has no effect in look mode.
    pub fn travel(&mut self, movement: Option<Movement>, dt: f32) {
        let Some(movement) = movement else {
            return;
        };
        if self.mode != CameraMode::Free {
            return;
        }
        let forward = self.free.direction();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let step = self.speed * dt;
        let offset = match movement {
            Movement::Forward => forward * step,
            Movement::Backward => -forward * step,
            Movement::Left => -right * step,
            Movement::Right => right * step,
        };
        self.position += offset.extend(0.0);
    }

    pub fn eye_position(&self) -> Vec3 {
        match self.mode {
            CameraMode::Free => self.position.truncate(),
            CameraMode::Look => self.target - self.look.direction() * self.distance,
        }
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        match self.mode {
            CameraMode::Free => Mat4::look_to_rh(self.eye_position(), self.free.direction(), Vec3::Y),
            CameraMode::Look => Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y),
        }
    }
}

pub struct Projection {
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: FRAC_PI_3,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::new(-1.0, 1.0, 5.0), Vec3::new(0.0, -20.0, 0.0), 2.5, 10.0)
    }

    #[test]
    fn default_angles_face_negative_z() {
        assert!(Angles::default().direction().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn forward_and_strafe_follow_view() {
        let mut camera = camera();
        camera.travel(Some(Movement::Forward), 0.5);
        assert!(camera.position.abs_diff_eq(Vec4::new(-1.0, 1.0, 0.0, 1.0), 1e-5));

        camera.travel(Some(Movement::Right), 0.1);
        assert!(camera.position.abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 1.0), 1e-5));

        camera.travel(None, 1.0);
        assert!(camera.position.abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.turn(Vec2::new(0.0, 1.0e6));
        assert_eq!(camera.free.phi, PITCH_LIMIT);
        camera.turn(Vec2::new(0.0, -1.0e7));
        assert_eq!(camera.free.phi, -PITCH_LIMIT);
        assert!(camera.build_view_matrix().is_finite());
    }

    #[test]
    fn look_mode_orbits_target_and_ignores_travel() {
        let mut camera = camera();
        camera.toggle_mode();
        assert_eq!(camera.mode, CameraMode::Look);

        let before = camera.position;
        camera.travel(Some(Movement::Forward), 1.0);
        assert_eq!(camera.position, before);

        let eye = camera.eye_position();
        assert!((eye.distance(camera.target) - 2.5).abs() < 1e-5);

        camera.turn(Vec2::new(1000.0, 0.0));
        assert!(camera.free.theta == 0.0);
        assert!(camera.look.theta != 0.0);
    }

    #[test]
    fn zoom_is_bounded() {
        let mut camera = camera();
        camera.zoom(10.0);
        assert!((camera.distance - 1.5).abs() < 1e-6);
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1.0e5);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn projection_survives_zero_height() {
        let mut projection = Projection::new(800, 600, 0.1, 200.0);
        projection.resize(800, 0);
        assert!(projection.build_projection_matrix().is_finite());
    }
}
