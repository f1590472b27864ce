mod renderer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use renderer::{ModelPaths, State};
use voxel_terrain::config::{DEFAULT_OCTAVES, DEFAULT_WORLD_SIZE};
use voxel_terrain::{Simulation, SimulationConfig, Status, World, WorldConfig};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

/// Walk a procedurally generated block terrain.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Blocks along each side of the square world (at least 2).
    #[arg(long, default_value_t = DEFAULT_WORLD_SIZE)]
    size: usize,

    /// Noise octaves averaged into the heightfield.
    #[arg(long, default_value_t = DEFAULT_OCTAVES)]
    octaves: u32,

    /// Fixed seed for reproducible terrain; the clock is used when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// OBJ model drawn for the cow.
    #[arg(long)]
    cow_model: Option<PathBuf>,

    /// OBJ model drawn for the leaf.
    #[arg(long)]
    leaf_model: Option<PathBuf>,
}

struct App {
    window: Option<Arc<Window>>,
    state: Option<State>,
    simulation: Option<Simulation>,
    models: ModelPaths,
}

impl App {
    fn new(simulation: Simulation, models: ModelPaths) -> Self {
        Self {
            window: None,
            state: None,
            simulation: Some(simulation),
            models,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(simulation) = self.simulation.take() else {
            return;
        };
        let window_attributes = Window::default_attributes().with_title("Voxel Terrain");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(State::new(window, simulation, &self.models)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                error!("failed to create renderer: {e:?}");
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(state) = self.state.as_mut() {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.mouse_motion(delta);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let window = match self.window.as_ref() {
            Some(w) => w,
            None => return,
        };
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        if id != window.id() {
            return;
        }

        if !state.input(&event) {
            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            logical_key: Key::Named(NamedKey::Escape),
                            ..
                        },
                    ..
                } => {
                    event_loop.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    state.resize(physical_size);
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.surface_lost(),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => error!("{e:?}"),
                },
                _ => {}
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            if state.update() == Status::Won {
                info!("shell reached, exiting");
                event_loop.exit();
                return;
            }
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let world_config = WorldConfig {
        size: args.size,
        octaves: args.octaves,
        seed: args.seed,
        ..Default::default()
    };
    let world = World::generate(&world_config).context("invalid world configuration")?;
    let simulation =
        Simulation::new(world, SimulationConfig::default()).context("invalid simulation configuration")?;
    let models = ModelPaths {
        cow: args.cow_model,
        leaf: args.leaf_model,
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(simulation, models);
    event_loop.run_app(&mut app)?;
    Ok(())
}
