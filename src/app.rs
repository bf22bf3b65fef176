use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    animation::{AnimationDriver, FrameRenderer},
    assets::{EnvironmentCatalog, EnvironmentLoader, TextureSet},
    config::ShowcaseConfig,
    context::SceneContext,
    error::ShowcaseError,
    gfx::RenderEngine,
    parameters::ParameterEdit,
    ui::{material_panel, PanelInfo, PanelSnapshot, UiManager},
    viewport::ViewportState,
};

/// Window, renderer, panel and animation loop for one showcase run
pub struct ShowcaseApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ShowcaseConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    textures: TextureSet,
    context: SceneContext,
    loader: EnvironmentLoader,
    driver: AnimationDriver,
    startup_error: Option<ShowcaseError>,
}

impl ShowcaseApp {
    /// Builds everything that does not need a window
    ///
    /// Textures are decoded here; missing ones fall back to placeholders.
    pub fn new(config: ShowcaseConfig) -> Result<Self, ShowcaseError> {
        let event_loop = EventLoop::new()?;

        let catalog = EnvironmentCatalog::new(&config.assets_root);
        let textures = TextureSet::load(&config.assets_root);
        if textures.placeholder_count() > 0 {
            log::warn!(
                "{} textures missing under {}",
                textures.placeholder_count(),
                config.assets_root.display()
            );
        }

        let viewport = ViewportState::new(
            config.window.width as f64,
            config.window.height as f64,
            1.0,
        );
        let context = SceneContext::new(&config, &catalog, viewport);
        let loader = EnvironmentLoader::new(catalog, config.environment.policy);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                textures,
                context,
                loader,
                driver: AnimationDriver::new(),
                startup_error: None,
            },
        })
    }

    /// Runs until the window closes or Escape is pressed
    pub fn run(mut self) -> Result<(), ShowcaseError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.startup_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ShowcaseError) {
        log::error!("Startup failed: {error}");
        self.startup_error = Some(error);
        event_loop.exit();
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let mut viewport = self.context.viewport;
        if !viewport.resize(size, scale_factor) {
            return;
        }
        self.context.set_viewport(viewport);

        let surface = viewport.surface_size();
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(surface);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.update_display_size(surface.width, surface.height);
        }
    }

    fn request_environment(&mut self, name: &str) {
        if let Err(error) = self.loader.request(name) {
            log::warn!("{error}");
        }
    }

    fn redraw(&mut self) {
        let (Some(render_engine), Some(ui_manager), Some(window)) = (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        self.loader.poll(&mut self.context.environment);

        let mut edits = Vec::new();
        let mut target = FrameTarget {
            render_engine,
            ui_manager,
            window,
            info: PanelInfo {
                elapsed: self.driver.elapsed(),
                frames_rendered: self.driver.frames_rendered() + 1,
                has_environment: self.context.environment.current().is_some(),
            },
            edits: &mut edits,
        };
        self.driver.tick(&mut self.context, &mut target);

        // Edits made while drawing this frame show up in the next one
        let requests = self.context.apply_edits(edits);
        for request in requests {
            self.request_environment(&request.name);
        }
    }
}

/// Renders the scene and the panel, collecting the panel's edits
struct FrameTarget<'a> {
    render_engine: &'a mut RenderEngine,
    ui_manager: &'a mut UiManager,
    window: &'a Window,
    info: PanelInfo,
    edits: &'a mut Vec<ParameterEdit>,
}

impl FrameRenderer for FrameTarget<'_> {
    fn render_frame(&mut self, ctx: &mut SceneContext) {
        let snapshot = PanelSnapshot::capture(&ctx.scene.material, &ctx.parameters);
        let parameters = &ctx.parameters;
        let ui_manager = &mut *self.ui_manager;
        let edits = &mut *self.edits;
        let window = self.window;
        let info = self.info;

        self.render_engine.render_frame(
            &mut ctx.scene,
            &ctx.camera.camera,
            &ctx.environment,
            Some(|device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.draw(device, queue, encoder, window, view, |ui| {
                    edits.extend(material_panel(ui, snapshot, parameters, info));
                });
            }),
        );
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => return self.fail(event_loop, error.into()),
        };

        let viewport = ViewportState::from_physical(window.inner_size(), window.scale_factor());
        self.context.set_viewport(viewport);
        let surface_size = viewport.surface_size();

        let render_engine = match pollster::block_on(RenderEngine::new(
            window.clone(),
            surface_size,
            &self.textures,
            &self.context.scene.material,
            self.config.environment.fallback_ambient,
        )) {
            Ok(render_engine) => render_engine,
            Err(error) => return self.fail(event_loop, error),
        };
        render_engine.prepare_scene(&mut self.context.scene);

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );
        ui_manager.update_display_size(surface_size.width, surface_size.height);

        let stats = self.context.scene.get_statistics();
        log::info!(
            "Scene ready: {} objects, {} triangles, surface {}x{}",
            stats.object_count,
            stats.total_triangles,
            surface_size.width,
            surface_size.height
        );

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);

        if let Some(name) = self.context.parameters.selected_environment().map(str::to_owned) {
            self.request_environment(&name);
        }
        self.driver.start();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Quitting and modifier tracking must not depend on UI focus
        match &event {
            WindowEvent::KeyboardInput { event: key, .. }
                if is_quit_key(key.physical_key, key.state) =>
            {
                self.driver.stop();
                event_loop.exit();
                return;
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.context.camera.process_modifiers(modifiers.state());
            }
            _ => (),
        }

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.context.camera.process_keyboard_event(&event);
            }
            WindowEvent::Resized(size) => {
                self.resize(size, window.scale_factor());
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.resize(window.inner_size(), scale_factor);
            }
            WindowEvent::CloseRequested => {
                self.driver.stop();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.window.is_none() {
            return;
        }

        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_input() {
                return;
            }
        }

        self.context.camera.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.driver.is_running() {
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn is_quit_key(key: PhysicalKey, state: ElementState) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed
}
