use std::ops::Range;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use wgpu::Device;

use crate::gfx::geometry::GeometryData;

use super::vertex::Vertex3D;

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
    pub vertex_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        let vertex_count = vertices.len() as u32;

        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
            vertex_count,
        }
    }

    fn init_gpu_resources(&mut self, device: &Device) {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
    }
}

/// Per-object uniform data. Must match the Object struct in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    transform: [[f32; 4]; 4],
    /// x: receives-shadow flag (0.0 or 1.0), rest padding
    params: [f32; 4],
}

pub struct ObjectGpuResources {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// A renderable scene object: meshes plus transform and shadow flags
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Matrix4<f32>,
    pub material_id: Option<String>,
    pub visible: bool,
    /// Whether this object is drawn into the shadow map
    pub casts_shadow: bool,
    /// Whether the main pass darkens this object where the light is occluded
    pub receives_shadow: bool,
    pub gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            transform: Matrix4::identity(),
            material_id: None,
            visible: true,
            casts_shadow: false,
            receives_shadow: false,
            gpu_resources: None,
        }
    }

    /// Builds an object from procedurally generated geometry
    pub fn from_geometry(name: &str, geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(name, vec![Mesh::new(vertices, indices)])
    }

    pub fn with_material(mut self, material_id: &str) -> Self {
        self.material_id = Some(material_id.to_string());
        self
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.transform = Matrix4::from_translation(translation);
        self
    }

    pub fn with_cast_shadow(mut self, casts: bool) -> Self {
        self.casts_shadow = casts;
        self
    }

    pub fn with_receive_shadow(mut self, receives: bool) -> Self {
        self.receives_shadow = receives;
        self
    }

    /// Translation component of the current transform
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.transform.w.x, self.transform.w.y, self.transform.w.z)
    }

    fn uniform(&self) -> ObjectUniform {
        let transform: &[f32; 16] = self.transform.as_ref();
        ObjectUniform {
            transform: [
                [transform[0], transform[1], transform[2], transform[3]],
                [transform[4], transform[5], transform[6], transform[7]],
                [transform[8], transform[9], transform[10], transform[11]],
                [transform[12], transform[13], transform[14], transform[15]],
            ],
            params: [if self.receives_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }

    /// Syncs the transform and shadow flags to the GPU
    pub fn update_uniform(&mut self, queue: &wgpu::Queue) {
        if let Some(gpu_resources) = &self.gpu_resources {
            queue.write_buffer(
                &gpu_resources.uniform_buffer,
                0,
                bytemuck::bytes_of(&self.uniform()),
            );
        }
    }

    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device);
        }

        let uniform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Object Uniform Buffer"),
                contents: bytemuck::bytes_of(&self.uniform()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            uniform_buffer,
            bind_group,
        });
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let vertex_buffer = match &mesh.vertex_buffer {
            Some(buffer) => buffer,
            None => return, // Skip drawing if not uploaded
        };
        let index_buffer = match &mesh.index_buffer {
            Some(buffer) => buffer,
            None => return,
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object) {
        for mesh in &object.meshes {
            self.draw_mesh_instanced(mesh, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn from_geometry_carries_mesh_counts() {
        let object = Object::from_geometry("cube", &generate_box(1.0, 1.0, 1.0));
        assert_eq!(object.meshes.len(), 1);
        assert_eq!(object.meshes[0].index_count, 36);
        assert_eq!(object.meshes[0].vertex_count, 24);
    }

    #[test]
    fn translation_round_trips_through_transform() {
        let object = Object::from_geometry("cube", &generate_box(1.0, 1.0, 1.0))
            .with_translation(Vector3::new(0.0, 0.5, 0.0));
        assert_eq!(object.translation(), Vector3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn shadow_flags_default_off() {
        let object = Object::from_geometry("cube", &generate_box(1.0, 1.0, 1.0));
        assert!(!object.casts_shadow);
        assert!(!object.receives_shadow);
    }
}
