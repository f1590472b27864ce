use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::Movement;
use crate::simulation::FrameInput;

/// Collects window input between frames and hands it to the simulation.
#[derive(Default)]
pub struct CameraController {
    movement: Option<Movement>,
    shell_forward: bool,
    shell_backward: bool,
    shell_left: bool,
    shell_right: bool,

    mouse_delta: Vec2,
    zoom_delta: f32,
    toggle_mode: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event was consumed.
    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => match key_event.physical_key {
                PhysicalKey::Code(code) => {
                    self.process_key(code, key_event.state == ElementState::Pressed)
                }
                PhysicalKey::Unidentified(_) => false,
            },
            WindowEvent::MouseWheel { delta, .. } => {
                self.zoom_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                true
            }
            _ => false,
        }
    }

    pub fn process_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        let movement = match code {
            KeyCode::KeyW => Some(Movement::Forward),
            KeyCode::KeyS => Some(Movement::Backward),
            KeyCode::KeyA => Some(Movement::Left),
            KeyCode::KeyD => Some(Movement::Right),
            _ => None,
        };
        if let Some(movement) = movement {
            if pressed {
                self.movement = Some(movement);
            } else if self.movement == Some(movement) {
                self.movement = None;
            }
            return true;
        }

        match code {
            KeyCode::KeyP => {
                if pressed {
                    self.toggle_mode = true;
                }
            }
            KeyCode::ArrowUp => self.shell_forward = pressed,
            KeyCode::ArrowDown => self.shell_backward = pressed,
            KeyCode::KeyJ | KeyCode::ArrowLeft => self.shell_left = pressed,
            KeyCode::KeyK | KeyCode::ArrowRight => self.shell_right = pressed,
            _ => return false,
        }
        true
    }

    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.mouse_delta += Vec2::new(delta_x as f32, delta_y as f32);
    }

    /// Drains the accumulated deltas into this frame's input.
    pub fn take_input(&mut self) -> FrameInput {
        let axis = |positive: bool, negative: bool| positive as i8 as f32 - negative as i8 as f32;
        let input = FrameInput {
            movement: self.movement,
            look_delta: self.mouse_delta,
            zoom_delta: self.zoom_delta,
            toggle_mode: self.toggle_mode,
            shell_drive: axis(self.shell_forward, self.shell_backward),
            shell_turn: axis(self.shell_right, self.shell_left),
        };
        self.mouse_delta = Vec2::ZERO;
        self.zoom_delta = 0.0;
        self.toggle_mode = false;
        input
    }
}
