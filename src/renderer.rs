use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use glam::{Mat4, Quat, Vec3};
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use voxel_terrain::camera::Projection;
use voxel_terrain::camera_controller::CameraController;
use voxel_terrain::collision::Bounds;
use voxel_terrain::model::{self, Drawable, InstanceRaw, Mesh, MeshData, Vertex};
use voxel_terrain::{MapGrid, Simulation, Status};

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.55, g: 0.75, b: 0.95, a: 1.0 };
const COW_COLOR: [f32; 4] = [0.95, 0.95, 0.9, 1.0];
const SHELL_COLOR: [f32; 4] = [0.85, 0.15, 0.1, 1.0];
const LEAF_COLOR: [f32; 4] = [0.3, 0.6, 0.1, 1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    fn update_view_proj(&mut self, simulation: &Simulation, projection: &Projection) {
        self.view_proj = (projection.build_projection_matrix() * simulation.camera.build_view_matrix())
            .to_cols_array_2d();
    }
}

/// Optional OBJ files replacing the cube stand-ins.
#[derive(Debug, Clone, Default)]
pub struct ModelPaths {
    pub cow: Option<PathBuf>,
    pub leaf: Option<PathBuf>,
}

/// A mesh drawn at one position that moves every frame.
struct ActorDraw {
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    color: [f32; 4],
}

impl ActorDraw {
    fn new(device: &wgpu::Device, mesh: Mesh, color: [f32; 4]) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&[InstanceRaw::new(Mat4::IDENTITY, color)]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            mesh,
            instance_buffer,
            color,
        }
    }

    fn place(&self, queue: &wgpu::Queue, transform: Mat4) {
        let instance = InstanceRaw::new(transform, self.color);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[instance]));
    }
}

fn terrain_color(height: f32, max_height: f32) -> [f32; 4] {
    let t = if max_height > 0.0 { (height / max_height).clamp(0.0, 1.0) } else { 0.0 };
    [0.25 + 0.35 * t, 0.45 + 0.35 * t, 0.15 + 0.1 * t, 1.0]
}

fn terrain_instances(map: &MapGrid, heights: &voxel_terrain::HeightGrid) -> Vec<InstanceRaw> {
    let max_height = heights.max_height();
    // Both grids are row-major over (x, z).
    map.cells()
        .zip(heights.values())
        .map(|(cell, height)| {
            let extent = Vec3::new(cell.right - cell.left, cell.top - cell.origin.y, cell.back - cell.front);
            let center = Vec3::new(cell.origin.x, cell.origin.y + extent.y / 2.0, cell.origin.z);
            InstanceRaw::new(
                Mat4::from_scale_rotation_translation(extent, Quat::IDENTITY, center),
                terrain_color(height, max_height),
            )
        })
        .collect()
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    block_mesh: Mesh,
    terrain_instances: wgpu::Buffer,
    num_terrain_instances: u32,
    cow: ActorDraw,
    shell: ActorDraw,
    leaf: ActorDraw,
    simulation: Simulation,
    controller: CameraController,
    projection: Projection,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    last_frame: Instant,
    frame_timer: Instant,
    frames: u32,
}

impl State {
    pub async fn new(window: Arc<Window>, simulation: Simulation, models: &ModelPaths) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor { ..Default::default() });
        let surface = instance.create_surface(window).context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("no suitable GPU adapter")?;
        info!("using adapter {}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let projection = Projection::new(config.width, config.height, 0.1, 300.0);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&simulation, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let cube = MeshData::cube();
        let block_mesh = Mesh::upload(&device, &cube, "Block");
        let instances = terrain_instances(&simulation.world.map, &simulation.world.heightmap);
        let terrain_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let num_terrain_instances = instances.len() as u32;

        let cow_mesh = Mesh::upload(&device, &model::load_or_cube(models.cow.as_deref()), "Cow");
        let shell_mesh = Mesh::upload(&device, &cube, "Shell");
        let leaf_mesh = Mesh::upload(&device, &model::load_or_cube(models.leaf.as_deref()), "Leaf");
        let cow = ActorDraw::new(&device, cow_mesh, COW_COLOR);
        let shell = ActorDraw::new(&device, shell_mesh, SHELL_COLOR);
        let leaf = ActorDraw::new(&device, leaf_mesh, LEAF_COLOR);

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let now = Instant::now();
        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            block_mesh,
            terrain_instances,
            num_terrain_instances,
            cow,
            shell,
            leaf,
            simulation,
            controller: CameraController::new(),
            projection,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            depth_view,
            last_frame: now,
            frame_timer: now,
            frames: 0,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.projection.resize(new_size.width, new_size.height);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_events(event)
    }

    pub fn mouse_motion(&mut self, delta: (f64, f64)) {
        self.controller.process_mouse_motion(delta.0, delta.1);
    }

    pub fn update(&mut self) -> Status {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frames += 1;
        let since = now.duration_since(self.frame_timer).as_secs_f32();
        if since >= 1.0 {
            info!("{:.3} ms/frame", since * 1000.0 / self.frames as f32);
            self.frames = 0;
            self.frame_timer = now;
        }

        let input = self.controller.take_input();
        let status = self.simulation.step(dt, &input);

        self.camera_uniform.update_view_proj(&self.simulation, &self.projection);
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));

        let cow = &self.simulation.cow;
        let cow_scale = match cow.bounds {
            Bounds::Box { half_extents } => half_extents * 2.0,
            Bounds::Sphere { radius } => Vec3::splat(radius * 2.0),
        };
        self.cow.place(
            &self.queue,
            Mat4::from_scale_rotation_translation(cow_scale, Quat::from_rotation_y(-cow.yaw), cow.position),
        );
        let shell = &self.simulation.shell;
        self.shell.place(
            &self.queue,
            Mat4::from_scale_rotation_translation(
                Vec3::splat(0.8),
                Quat::from_rotation_y(-shell.yaw),
                shell.position,
            ),
        );
        self.leaf.place(&self.queue, Mat4::from_translation(self.simulation.leaf_position()));

        status
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.draw_mesh(&self.block_mesh, &self.terrain_instances, self.num_terrain_instances);
            for actor in [&self.cow, &self.shell, &self.leaf] {
                render_pass.draw_mesh(&actor.mesh, &actor.instance_buffer, 1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    pub fn surface_lost(&mut self) {
        warn!("surface lost, reconfiguring");
        self.resize(self.size);
    }
}
