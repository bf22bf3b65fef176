//! The shared standard material
//!
//! One `MaterialConfig` exists per run and is owned by the scene; every object
//! is drawn with it. `MaterialBindings` holds its GPU side: a uniform block
//! and the four texture slots (color, alpha, ambient occlusion, normal).

use serde::{Deserialize, Serialize};
use wgpu::Device;

use crate::{
    assets::TextureKey,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::texture_resource::TextureResource;

pub const FLAG_COLOR_MAP: u32 = 1;
pub const FLAG_ALPHA_MAP: u32 = 1 << 1;
pub const FLAG_AO_MAP: u32 = 1 << 2;
pub const FLAG_NORMAL_MAP: u32 = 1 << 3;
pub const FLAG_TRANSPARENT: u32 = 1 << 4;
pub const FLAG_DOUBLE_SIDED: u32 = 1 << 5;

/// Physically based material parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub double_sided: bool,
    pub color_map: Option<TextureKey>,
    pub alpha_map: Option<TextureKey>,
    pub occlusion_map: Option<TextureKey>,
    pub ao_intensity: f32,
    pub normal_map: Option<TextureKey>,
    pub normal_scale: [f32; 2],
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
            transparent: false,
            opacity: 1.0,
            double_sided: false,
            color_map: None,
            alpha_map: None,
            occlusion_map: None,
            ao_intensity: 1.0,
            normal_map: None,
            normal_scale: [1.0, 1.0],
        }
    }
}

impl MaterialConfig {
    /// Untextured, double-sided, fairly glossy half-metal
    pub fn basic() -> Self {
        Self::default()
            .with_double_sided(true)
            .with_metalness(0.5)
            .with_roughness(0.15)
    }

    /// Door-textured, transparent variant lit by an environment map
    pub fn richer() -> Self {
        Self {
            transparent: true,
            color_map: Some(TextureKey::DoorColor),
            alpha_map: Some(TextureKey::DoorAlpha),
            occlusion_map: Some(TextureKey::DoorAmbientOcclusion),
            normal_map: Some(TextureKey::DoorNormal),
            normal_scale: [0.5, 0.5],
            ..Self::default()
        }
        .with_double_sided(true)
        .with_metalness(0.7)
        .with_roughness(0.2)
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.set_roughness(roughness);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.set_metalness(metalness);
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = clamp_unit(roughness);
    }

    pub fn set_metalness(&mut self, metalness: f32) {
        self.metalness = clamp_unit(metalness);
    }

    /// Texture slots in binding order: color, alpha, occlusion, normal
    pub fn texture_slots(&self) -> [Option<TextureKey>; 4] {
        [
            self.color_map,
            self.alpha_map,
            self.occlusion_map,
            self.normal_map,
        ]
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let mut flags = 0;
        if self.color_map.is_some() {
            flags |= FLAG_COLOR_MAP;
        }
        if self.alpha_map.is_some() {
            flags |= FLAG_ALPHA_MAP;
        }
        if self.occlusion_map.is_some() {
            flags |= FLAG_AO_MAP;
        }
        if self.normal_map.is_some() {
            flags |= FLAG_NORMAL_MAP;
        }
        if self.transparent {
            flags |= FLAG_TRANSPARENT;
        }
        if self.double_sided {
            flags |= FLAG_DOUBLE_SIDED;
        }

        MaterialUniform {
            base_color: self.base_color,
            roughness: self.roughness,
            metalness: self.metalness,
            opacity: self.opacity,
            ao_intensity: self.ao_intensity,
            normal_scale: self.normal_scale,
            flags,
            _padding: 0,
        }
    }
}

/// NaN becomes 0
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// GPU uniform data for the material
/// MUST match the `Material` struct in `standard.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub ao_intensity: f32,
    pub normal_scale: [f32; 2],
    pub flags: u32,
    _padding: u32,
}

pub type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Material bind group management
///
/// Layout: uniform, then a (texture, sampler) pair per slot in
/// [`MaterialConfig::texture_slots`] order.
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let mut builder =
            BindGroupLayoutBuilder::new().next_binding_fragment(binding_types::uniform());
        for _ in 0..4 {
            builder = builder
                .next_binding_fragment(binding_types::texture_2d())
                .next_binding_fragment(binding_types::sampler(
                    wgpu::SamplerBindingType::Filtering,
                ));
        }

        MaterialBindings {
            bind_group_layout: builder.create(device, "Material Bind Group"),
            bind_group: None,
        }
    }

    pub fn create_bind_group(
        &mut self,
        device: &Device,
        ubo: &MaterialUBO,
        textures: [&TextureResource; 4],
    ) {
        let mut builder = BindGroupBuilder::new(&self.bind_group_layout).resource(ubo.binding_resource());
        for texture in textures {
            builder = builder.texture(&texture.view).sampler(&texture.sampler);
        }
        self.bind_group = Some(builder.create(device, "Material Bind Group"));
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}
