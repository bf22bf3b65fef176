//! WGPU-based rendering engine for the material showcase
//!
//! Owns the surface, device and queue, the depth buffer, the pipelines and the
//! bind groups for globals, material and environment. Each frame draws the
//! environment background, then every scene object with the shared material,
//! then an optional UI overlay.

use wgpu::TextureFormat;
use winit::dpi::PhysicalSize;

use crate::{
    assets::{DecodedTexture, EnvironmentSlot, TextureKey, TextureSet, MAX_ENVIRONMENT_DIMENSION},
    error::ShowcaseError,
    gfx::{
        camera::OrbitCamera,
        resources::{
            EnvironmentBindings, GlobalBindings, GlobalUBO, GlobalUniform, MaterialBindings,
            MaterialConfig, MaterialUBO, TextureResource,
        },
        scene::{object::transform_bind_group_layout, object::DrawObject, scene::Scene},
    },
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const STANDARD_SHADER: &str = "standard.wgsl";
const BACKGROUND_SHADER: &str = "background.wgsl";
const BACKGROUND_PIPELINE: &str = "Background";

/// Placeholder key per material slot when the material leaves it empty
const SLOT_DEFAULTS: [TextureKey; 4] = [
    TextureKey::DoorColor,
    TextureKey::DoorAlpha,
    TextureKey::DoorAmbientOcclusion,
    TextureKey::DoorNormal,
];

/// Name of the standard pipeline variant for a material
///
/// Transparent materials blend; double-sided ones disable back-face culling.
pub fn standard_pipeline_name(material: &MaterialConfig) -> &'static str {
    match (material.transparent, material.double_sided) {
        (false, false) => "Standard",
        (false, true) => "StandardDoubleSided",
        (true, false) => "StandardBlend",
        (true, true) => "StandardBlendDoubleSided",
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: BindGroupLayoutWithDesc,
    material_ubo: MaterialUBO,
    material_bindings: MaterialBindings,
    // Kept alive for the material bind group
    _material_textures: Vec<TextureResource>,
    environment_bindings: EnvironmentBindings,
    fallback_ambient: [f32; 3],
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Uploads the material maps the material references (placeholders for
    /// the rest) and builds every pipeline variant up front.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: PhysicalSize<u32>,
        textures: &TextureSet,
        material: &MaterialConfig,
        fallback_ambient: [f32; 3],
    ) -> Result<RenderEngine, ShowcaseError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: MAX_ENVIRONMENT_DIMENSION,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let transform_layout = transform_bind_group_layout(&device);

        let material_ubo = MaterialUBO::new_with_data(&device, &material.to_uniform());
        let material_textures: Vec<TextureResource> = material
            .texture_slots()
            .iter()
            .zip(SLOT_DEFAULTS)
            .map(|(slot, default_key)| match slot {
                Some(key) => TextureResource::create_from_decoded(
                    &device,
                    &queue,
                    textures.get(*key),
                    &format!("{key:?}"),
                ),
                None => TextureResource::create_from_decoded(
                    &device,
                    &queue,
                    &DecodedTexture::placeholder(default_key),
                    "Empty Material Slot",
                ),
            })
            .collect();
        let mut material_bindings = MaterialBindings::new(&device);
        material_bindings.create_bind_group(
            &device,
            &material_ubo,
            [
                &material_textures[0],
                &material_textures[1],
                &material_textures[2],
                &material_textures[3],
            ],
        );

        let environment_bindings = EnvironmentBindings::new(&device, &queue);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader(STANDARD_SHADER, include_str!("standard.wgsl"));
        pipeline_manager.load_shader(BACKGROUND_SHADER, include_str!("background.wgsl"));

        // Background ignores depth so objects always draw over it
        pipeline_manager.register_pipeline(
            BACKGROUND_PIPELINE,
            PipelineConfig::default_with_shader(BACKGROUND_SHADER)
                .with_label("BACKGROUND")
                .with_cull_mode(None)
                .with_depth(TextureResource::DEPTH_FORMAT, false, wgpu::CompareFunction::Always)
                .with_color_target(format, Some(wgpu::BlendState::REPLACE))
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    environment_bindings.bind_group_layouts().clone(),
                ])
                .with_no_vertex_buffers(),
        );

        let standard_layouts = vec![
            global_bindings.bind_group_layouts().clone(),
            transform_layout.layout.clone(),
            material_bindings.bind_group_layouts().clone(),
            environment_bindings.bind_group_layouts().clone(),
        ];
        for transparent in [false, true] {
            for double_sided in [false, true] {
                let variant = MaterialConfig {
                    transparent,
                    double_sided,
                    ..MaterialConfig::default()
                };
                let name = standard_pipeline_name(&variant);
                let blend = if transparent {
                    wgpu::BlendState::ALPHA_BLENDING
                } else {
                    wgpu::BlendState::REPLACE
                };
                pipeline_manager.register_pipeline(
                    name,
                    PipelineConfig::default_with_shader(STANDARD_SHADER)
                        .with_label(name)
                        .with_cull_mode(if double_sided {
                            None
                        } else {
                            Some(wgpu::Face::Back)
                        })
                        .with_depth(TextureResource::DEPTH_FORMAT, true, wgpu::CompareFunction::Less)
                        .with_color_target(format, Some(blend))
                        .with_bind_group_layouts(standard_layouts.clone()),
                );
            }
        }

        if let Err(error) = pipeline_manager.create_all_pipelines() {
            log::error!("Pipeline creation failed: {error}");
        }
        let stats = pipeline_manager.get_stats();
        log::debug!(
            "{} of {} pipelines ready ({} shaders)",
            stats.total_pipelines,
            stats.registered_pipelines,
            stats.loaded_shaders
        );

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_layout,
            material_ubo,
            material_bindings,
            _material_textures: material_textures,
            environment_bindings,
            fallback_ambient,
        })
    }

    /// Uploads vertex/index buffers and transform bind groups for every object
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.transform_layout);
    }

    /// Renders one frame with an optional UI overlay
    ///
    /// Surface loss is recovered by reconfiguring; the frame is then skipped.
    pub fn render_frame<F>(
        &mut self,
        scene: &mut Scene,
        camera: &OrbitCamera,
        environment: &EnvironmentSlot,
        ui_callback: Option<F>,
    ) where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        if let Some(installed) = environment.current() {
            if self.environment_bindings.sync(
                &self.device,
                &self.queue,
                environment.generation(),
                &installed.image,
            ) {
                log::info!("Environment '{}' bound", installed.name);
            }
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(error) => {
                log::warn!("Skipping frame: {error}");
                return;
            }
        };

        let has_environment = self.environment_bindings.is_bound();
        self.global_ubo.update_content(
            &self.queue,
            GlobalUniform::new(camera, self.fallback_ambient, has_environment),
        );

        let draws = scene.draw_list();
        if let Some(first) = draws.first() {
            // Every command carries the same material; unchanged values skip the write
            self.material_ubo.update_content(&self.queue, first.material);
        }
        scene.update_all_transforms(&self.queue);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let Some(globals) = self.global_bindings.bind_groups() else {
                return;
            };
            render_pass.set_bind_group(0, globals, &[]);

            if has_environment {
                if let Some(pipeline) = self.pipeline_manager.pipeline(BACKGROUND_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, self.environment_bindings.bind_groups(), &[]);
                    render_pass.draw(0..3, 0..1);
                }
            }

            let pipeline_name = standard_pipeline_name(&scene.material);
            if let (Some(pipeline), Some(material)) = (
                self.pipeline_manager.pipeline(pipeline_name),
                self.material_bindings.bind_groups(),
            ) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(2, material, &[]);
                render_pass.set_bind_group(3, self.environment_bindings.bind_groups(), &[]);

                for draw in &draws {
                    render_pass.draw_object(&scene.objects[draw.object_index]);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero sizes (minimised windows) are ignored.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }

        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
        log::debug!("Surface resized to {}x{}", size.width, size.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used by the UI renderer to match the surface
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pick_their_pipeline_variant() {
        assert_eq!(
            standard_pipeline_name(&MaterialConfig::basic()),
            "StandardDoubleSided"
        );
        assert_eq!(
            standard_pipeline_name(&MaterialConfig::richer()),
            "StandardBlendDoubleSided"
        );
        assert_eq!(
            standard_pipeline_name(&MaterialConfig::default()),
            "Standard"
        );
    }
}
