//! Global uniform bindings for camera and environment state
//!
//! Slot 0 in every pipeline. Holds per-frame data shared by the background and
//! the standard material: the camera matrices, the eye position and the
//! ambient term used when no environment map is installed.

use cgmath::SquareMatrix;

use crate::{
    gfx::camera::{camera_utils::Camera, OrbitCamera},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of the translation-free view-projection (clip → world direction)
    pub inv_rotation_view_proj: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
    /// rgb: fallback ambient light, w: 1 when an environment map is bound
    pub ambient: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &OrbitCamera, ambient: [f32; 3], has_environment: bool) -> Self {
        let inv_rotation_view_proj = camera
            .rotation_view_projection()
            .invert()
            .unwrap_or_else(cgmath::Matrix4::identity);

        Self {
            view_proj: camera.build_view_projection_matrix().into(),
            inv_rotation_view_proj: inv_rotation_view_proj.into(),
            eye_position: [camera.eye.x, camera.eye.y, camera.eye.z, 1.0],
            ambient: [
                ambient[0],
                ambient[1],
                ambient[2],
                if has_environment { 1.0 } else { 0.0 },
            ],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Manages the bind group layout and bind group for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Matrix4, Vector3, Vector4};

    #[test]
    fn uniform_size_is_a_multiple_of_sixteen() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 160);
    }

    #[test]
    fn environment_flag_and_eye_are_packed() {
        let camera = OrbitCamera::from_position(Vector3::new(1.0, 1.0, 2.0), Vector3::new(0.0, 0.0, 0.0), 1.5);
        let with = GlobalUniform::new(&camera, [0.2, 0.2, 0.2], true);
        let without = GlobalUniform::new(&camera, [0.2, 0.2, 0.2], false);
        assert_eq!(with.ambient[3], 1.0);
        assert_eq!(without.ambient[3], 0.0);
        assert_relative_eq!(with.eye_position[2], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn screen_center_unprojects_to_the_view_direction() {
        let camera = OrbitCamera::from_position(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 0.0), 1.0);
        let uniform = GlobalUniform::new(&camera, [0.0; 3], true);
        let inverse = Matrix4::from(uniform.inv_rotation_view_proj);

        let world = inverse * Vector4::new(0.0, 0.0, 1.0, 1.0);
        let direction = Vector3::new(world.x, world.y, world.z) / world.w;
        let length = (direction.x * direction.x + direction.y * direction.y + direction.z * direction.z).sqrt();

        // Looking from +Z toward the origin
        assert_relative_eq!(direction.x / length, 0.0, epsilon = 1e-4);
        assert_relative_eq!(direction.y / length, 0.0, epsilon = 1e-4);
        assert_relative_eq!(direction.z / length, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn screen_edge_unprojects_at_half_the_field_of_view() {
        let camera = OrbitCamera::from_position(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 0.0), 1.0);
        let uniform = GlobalUniform::new(&camera, [0.0; 3], true);
        let inverse = Matrix4::from(uniform.inv_rotation_view_proj);

        let world = inverse * Vector4::new(0.0, 1.0, 1.0, 1.0);
        assert!(world.w.abs() > f32::EPSILON);
        let direction = Vector3::new(world.x, world.y, world.z) / world.w;

        assert_relative_eq!(direction.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(direction.y / -direction.z, (37.5f32).to_radians().tan(), epsilon = 1e-3);
    }
}
