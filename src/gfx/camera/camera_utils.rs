use cgmath::Matrix4;
use serde::{Deserialize, Serialize};
use winit::{
    event::{DeviceEvent, KeyEvent},
    keyboard::ModifiersState,
};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// Viewpoint and orbit controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
            damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
        }
    }
}

pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let camera = OrbitCamera::from_config(config, aspect);
        let mut controller = CameraController::new(config.rotate_speed, config.zoom_speed)
            .with_pan_speed(config.pan_speed);
        if config.damping {
            controller = controller.with_damping(config.damping_factor);
        }
        Self::new(camera, controller)
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event, &mut self.camera);
    }

    pub fn process_modifiers(&mut self, modifiers: ModifiersState) {
        self.controller.process_modifiers(modifiers);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.controller
            .process_keyed_events(event, &mut self.camera);
    }

    /// Per-frame controller update (releases damped motion)
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.camera.resize_projection(width, height);
    }

    pub fn get_view_proj_matrix(&self) -> cgmath::Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_places_camera_at_one_one_two() {
        let manager = CameraManager::from_config(&CameraConfig::default(), 1200.0 / 800.0);
        let camera = &manager.camera;
        assert_relative_eq!(camera.eye.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.eye.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.eye.z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.fovy.0, 75f32.to_radians(), epsilon = 1e-6);
        assert_eq!((camera.znear, camera.zfar), (0.1, 100.0));
        assert!(manager.controller.damping_enabled);
        assert_eq!(manager.controller.damping_factor, 0.05);
    }

    #[test]
    fn set_aspect_ignores_degenerate_sizes() {
        let mut manager = CameraManager::from_config(&CameraConfig::default(), 1.5);
        manager.set_aspect(0.0, 600.0);
        assert_eq!(manager.camera.aspect, 1.5);
        manager.set_aspect(1000.0, 500.0);
        assert_eq!(manager.camera.aspect, 2.0);
    }

    #[test]
    fn origin_projects_to_the_screen_center() {
        let manager = CameraManager::from_config(&CameraConfig::default(), 1.0);
        let clip = manager.get_view_proj_matrix() * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
