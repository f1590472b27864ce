use std::path::Path;

use glam::{Mat4, Vec3};
use log::warn;
use wgpu::util::DeviceExt;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("OBJ file {0} contains no meshes")]
    Empty(String),
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            5 => Float32x4, 6 => Float32x4, 7 => Float32x4, 8 => Float32x4, 9 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBS,
        }
    }
}

/// Triangle mesh in CPU memory, ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit cube centered on the origin, one flat-shaded quad per face.
    pub fn cube() -> Self {
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in FACES {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                let position = normal * 0.5 + u * su + v * sv;
                mesh.vertices.push(Vertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    pub fn from_obj_models(models: &[tobj::Model]) -> Self {
        let mut data = Self::default();
        for model in models {
            let mesh = &model.mesh;
            let mut part = Self::default();
            for (i, position) in mesh.positions.chunks_exact(3).enumerate() {
                let normal = mesh
                    .normals
                    .get(i * 3..i * 3 + 3)
                    .map_or([0.0, 1.0, 0.0], |n| [n[0], n[1], n[2]]);
                part.vertices.push(Vertex {
                    position: [position[0], position[1], position[2]],
                    normal,
                });
            }
            part.indices.extend_from_slice(&mesh.indices);
            if mesh.normals.is_empty() {
                part.compute_normals();
            }

            let base = data.vertices.len() as u32;
            data.vertices.extend(part.vertices);
            data.indices.extend(part.indices.iter().map(|i| base + i));
        }
        data
    }

    /// Area-weighted smooth normals from the triangle list.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(self.vertices[i as usize].position));
            let face = (b - a).cross(c - a);
            for &i in tri {
                normals[i as usize] += face;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.try_normalize().unwrap_or(Vec3::Y).to_array();
        }
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, ModelError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    if models.is_empty() {
        return Err(ModelError::Empty(path.display().to_string()));
    }
    Ok(MeshData::from_obj_models(&models))
}

/// Loads an optional OBJ model, falling back to a cube when absent or broken.
pub fn load_or_cube(path: Option<&Path>) -> MeshData {
    match path {
        Some(path) => load_obj(path).unwrap_or_else(|e| {
            warn!("using a cube for {}: {e}", path.display());
            MeshData::cube()
        }),
        None => MeshData::cube(),
    }
}

pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData, name: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_indices: data.indices.len() as u32,
        }
    }
}

pub trait Drawable<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh, instance_buffer: &'a wgpu::Buffer, instances: u32);
}

impl<'a, 'b> Drawable<'a> for wgpu::RenderPass<'b>
where
    'a: 'b,
{
    fn draw_mesh(&mut self, mesh: &'a Mesh, instance_buffer: &'a wgpu::Buffer, instances: u32) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instance_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_indices, 0, 0..instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 0.0 -1.0
f 1 2 3
";

    #[test]
    fn cube_faces_point_outward() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for vertex in &cube.vertices {
            let position = Vec3::from(vertex.position);
            let normal = Vec3::from(vertex.normal);
            assert!((position.dot(normal) - 0.5).abs() < 1e-6);
            assert!(position.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise() {
        let cube = MeshData::cube();
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(cube.vertices[i as usize].position));
            let normal = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }

    #[test]
    fn obj_without_normals_gets_computed_ones() {
        let mut reader = Cursor::new(TRIANGLE_OBJ.as_bytes());
        let (models, _) =
            tobj::load_obj_buf(&mut reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
                .unwrap();
        let mesh = MeshData::from_obj_models(&models);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        for vertex in &mesh.vertices {
            assert!(Vec3::from(vertex.normal).abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn flat_obj_keeps_its_own_normals() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 0.0 1.0
vn 0.0 1.0 0.0
f 1//1 2//1 3//1
";
        let mut reader = Cursor::new(obj.as_bytes());
        let (models, _) =
            tobj::load_obj_buf(&mut reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
                .unwrap();
        let mesh = MeshData::from_obj_models(&models);
        // Winding alone would give -Y here; the file's +Y normals win.
        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn missing_model_falls_back_to_cube() {
        let mesh = load_or_cube(Some(Path::new("does/not/exist.obj")));
        assert_eq!(mesh.vertices.len(), MeshData::cube().vertices.len());
        assert!(load_obj("does/not/exist.obj").is_err());
    }
}
