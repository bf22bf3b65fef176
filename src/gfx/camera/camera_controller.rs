use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Turns mouse input into orbit, pan and zoom
///
/// Rotation and pan are accumulated as pending deltas and released over
/// several frames by [`CameraController::update`] when damping is enabled:
/// each frame applies `damping_factor` of what is left. Zoom is immediate.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_enabled: bool,
    pub damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: (f32, f32),
}

/// Remaining motion below this is dropped
const SETTLE_EPSILON: f32 = 1e-6;

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping_enabled: false,
            damping_factor: 0.05,
            is_shift_held: false,
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: (0.0, 0.0),
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_enabled = true;
        self.damping_factor = damping_factor.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn with_pan_speed(mut self, pan_speed: f32) -> Self {
        self.pan_speed = pan_speed;
        self
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / 40.0
                    }
                };
                camera.scale_distance((1.0 + self.zoom_speed).powf(scroll_amount));
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        self.pending_pan.0 -= delta.0 as f32 * self.pan_speed;
                        self.pending_pan.1 += delta.1 as f32 * self.pan_speed;
                    } else {
                        self.pending_yaw -= delta.0 as f32 * self.rotate_speed;
                        self.pending_pitch += delta.1 as f32 * self.rotate_speed;
                    }
                }
            }
            _ => (),
        }
    }

    /// Tracks Shift from the window's modifier state, which arrives even
    /// while the UI holds keyboard focus
    pub fn process_modifiers(&mut self, modifiers: ModifiersState) {
        self.is_shift_held = modifiers.shift_key();
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => {
                if self.is_shift_held {
                    log::info!("Resetting camera to its initial position");
                    self.clear_pending();
                    camera.reset_to_default();
                }
            }
            _ => (),
        }
    }

    /// Per-frame update; must run once per rendered frame for damping
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let factor = if self.damping_enabled {
            self.damping_factor
        } else {
            1.0
        };

        if self.pending_yaw != 0.0 {
            camera.add_yaw(self.pending_yaw * factor);
        }
        if self.pending_pitch != 0.0 {
            camera.add_pitch(self.pending_pitch * factor);
        }
        if self.pending_pan != (0.0, 0.0) {
            camera.pan((self.pending_pan.0 * factor, self.pending_pan.1 * factor));
        }

        let keep = 1.0 - factor;
        self.pending_yaw = settle(self.pending_yaw * keep);
        self.pending_pitch = settle(self.pending_pitch * keep);
        self.pending_pan = (
            settle(self.pending_pan.0 * keep),
            settle(self.pending_pan.1 * keep),
        );
    }

    /// True while damped motion is still being released
    pub fn is_moving(&self) -> bool {
        self.pending_yaw != 0.0 || self.pending_pitch != 0.0 || self.pending_pan != (0.0, 0.0)
    }

    fn clear_pending(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = (0.0, 0.0);
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < SETTLE_EPSILON {
        0.0
    } else {
        value
    }
}
