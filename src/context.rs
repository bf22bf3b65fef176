use crate::{
    assets::{EnvironmentCatalog, EnvironmentSlot},
    config::ShowcaseConfig,
    gfx::{camera::CameraManager, scene::Scene},
    parameters::{EnvironmentRequest, ParameterEdit, ParameterStore},
    viewport::ViewportState,
};

/// Everything a frame reads, built once at startup and passed by reference
pub struct SceneContext {
    pub scene: Scene,
    pub camera: CameraManager,
    pub viewport: ViewportState,
    pub parameters: ParameterStore,
    pub environment: EnvironmentSlot,
}

impl SceneContext {
    pub fn new(config: &ShowcaseConfig, catalog: &EnvironmentCatalog, viewport: ViewportState) -> Self {
        let scene = Scene::from_config(&config.scene);
        let camera = CameraManager::from_config(&config.camera, viewport.aspect());
        let parameters =
            ParameterStore::new(catalog, config.scene.initial_environment.as_deref());

        Self {
            scene,
            camera,
            viewport,
            parameters,
            environment: EnvironmentSlot::default(),
        }
    }

    /// Applies panel edits collected during the last frame
    pub fn apply_edits(&mut self, edits: Vec<ParameterEdit>) -> Vec<EnvironmentRequest> {
        self.parameters.apply_all(edits, &mut self.scene.material)
    }

    /// Keeps camera aspect in step with the viewport
    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.camera
            .set_aspect(viewport.width as f32, viewport.height as f32);
    }
}
