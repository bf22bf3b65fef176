//! Bind group for the equirectangular environment map (slot 3)
//!
//! The texture is swapped as a whole when the installed environment changes:
//! a new `TextureResource` and a new bind group are created together and the
//! old ones dropped, so no frame ever binds half of a swap.

use crate::{
    assets::EnvironmentImage,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
    },
};

use super::texture_resource::TextureResource;

pub struct EnvironmentBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    _texture: TextureResource,
    bind_group: wgpu::BindGroup,
    generation: Option<u64>,
}

impl EnvironmentBindings {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d_unfilterable())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::NonFiltering,
            ))
            .create(device, "Environment Bind Group");

        let texture = TextureResource::create_empty_environment(device, queue);
        let bind_group = Self::build(device, &bind_group_layout, &texture);

        Self {
            bind_group_layout,
            _texture: texture,
            bind_group,
            generation: None,
        }
    }

    fn build(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        texture: &TextureResource,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, "Environment Bind Group")
    }

    /// Uploads `image` unless `generation` is already bound
    ///
    /// Returns true when a new texture was uploaded.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        generation: u64,
        image: &EnvironmentImage,
    ) -> bool {
        if self.generation == Some(generation) {
            return false;
        }

        let texture = TextureResource::create_environment(device, queue, image, "Environment Map");
        let bind_group = Self::build(device, &self.bind_group_layout, &texture);
        self._texture = texture;
        self.bind_group = bind_group;
        self.generation = Some(generation);
        log::debug!(
            "Uploaded environment texture {}x{} (generation {generation})",
            image.width,
            image.height
        );
        true
    }

    pub fn is_bound(&self) -> bool {
        self.generation.is_some()
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
