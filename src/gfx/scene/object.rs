use cgmath::{Matrix4, Rad, Vector3};
use wgpu::Device;

use crate::{
    config::ObjectConfig,
    gfx::geometry::{GeometryData, PrimitiveDescriptor},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::vertex::Vertex3D;

/// CPU geometry plus its GPU buffers once uploaded
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
    pub vertex_count: u32,
}

impl Mesh {
    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self {
            index_count: indices.len() as u32,
            vertex_count: vertices.len() as u32,
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn init_gpu_resources(&mut self, device: &Device, label: &str) {
        self.vertex_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }
}

/// Per-object uniform: the model matrix
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

pub type TransformUBO = UniformBuffer<TransformUniform>;

/// Layout shared by every object's transform bind group (slot 1)
pub fn transform_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_vertex(binding_types::uniform())
        .create(device, "Transform Bind Group")
}

pub struct ObjectGpuResources {
    pub transform_ubo: TransformUBO,
    pub transform_bind_group: wgpu::BindGroup,
}

/// Angular rates in radians per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationRates {
    pub x: f32,
    pub y: f32,
}

/// A mesh placed in the scene and spun at fixed rates
///
/// Objects carry no material; every draw uses the scene's single material.
pub struct SceneObject {
    pub name: String,
    pub primitive: PrimitiveDescriptor,
    pub mesh: Mesh,
    pub position: Vector3<f32>,
    pub rates: RotationRates,
    /// Current rotation around X and Y, derived from elapsed time
    pub rotation: (Rad<f32>, Rad<f32>),
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>,
}

impl SceneObject {
    pub fn from_config(config: &ObjectConfig) -> Self {
        let geometry = config.primitive.generate();
        log::debug!(
            "Generated {} '{}': {} vertices, {} triangles",
            config.primitive.kind(),
            config.name,
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        Self {
            name: config.name.clone(),
            primitive: config.primitive,
            mesh: Mesh::from_geometry(&geometry),
            position: Vector3::from(config.position),
            rates: RotationRates {
                x: config.rotation_rates[0],
                y: config.rotation_rates[1],
            },
            rotation: (Rad(0.0), Rad(0.0)),
            visible: true,
            gpu_resources: None,
        }
    }

    /// Sets the rotation for `elapsed` seconds since start
    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.rotation = (Rad(elapsed * self.rates.x), Rad(elapsed * self.rates.y));
    }

    /// Translation, then X rotation, then Y rotation (XYZ Euler order)
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(self.rotation.0)
            * Matrix4::from_angle_y(self.rotation.1)
    }

    pub fn init_gpu_resources(&mut self, device: &Device, layout: &BindGroupLayoutWithDesc) {
        self.mesh.init_gpu_resources(device, &self.name);

        let transform_ubo = TransformUBO::new_with_data(
            device,
            &TransformUniform {
                model: self.model_matrix().into(),
            },
        );
        let transform_bind_group = BindGroupBuilder::new(layout)
            .resource(transform_ubo.binding_resource())
            .create(device, &format!("{} Transform Bind Group", self.name));

        self.gpu_resources = Some(ObjectGpuResources {
            transform_ubo,
            transform_bind_group,
        });
    }

    /// Sync the model matrix to the GPU if resources exist
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let model = self.model_matrix().into();
        if let Some(gpu_resources) = &mut self.gpu_resources {
            gpu_resources
                .transform_ubo
                .update_content(queue, TransformUniform { model });
        }
    }

    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_object(&mut self, object: &'a SceneObject);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Not uploaded yet
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_object(&mut self, object: &'b SceneObject) {
        let Some(transform) = object.get_transform_bind_group() else {
            return;
        };
        self.set_bind_group(1, transform, &[]);
        self.draw_mesh(&object.mesh);
    }
}
