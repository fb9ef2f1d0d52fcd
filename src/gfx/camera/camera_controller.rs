use winit::{
    event::{DeviceEvent, ElementState},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Orbit angle per pixel of mouse motion at rotate speed 1.0
pub const RADIANS_PER_PIXEL: f32 = 0.005;

/// Remaining motion below which damping is considered settled
const SETTLE_EPSILON: f32 = 1e-5;

/// Drag-to-orbit controller with inertial damping
///
/// Zoom and pan are deliberately absent: the product stays framed the way
/// the scene was composed.
pub struct CameraController {
    pub rotate_speed: f32,
    /// Fraction of the pending motion applied per frame; 0 disables damping
    pub damping: f32,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, damping: f32) -> Self {
        Self {
            rotate_speed,
            damping: damping.clamp(0.0, 1.0),
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, window: &Window) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.set_dragging(*state == ElementState::Pressed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.drag(delta.0 as f32, delta.1 as f32);
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    pub fn set_dragging(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
    }

    /// Queues orbit motion for a mouse delta in pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.pending_yaw += -dx * RADIANS_PER_PIXEL * self.rotate_speed;
        self.pending_pitch += dy * RADIANS_PER_PIXEL * self.rotate_speed;
    }

    /// Applies queued motion to the camera; returns true while still moving
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if self.pending_yaw.abs() < SETTLE_EPSILON && self.pending_pitch.abs() < SETTLE_EPSILON {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            return false;
        }

        let factor = if self.damping > 0.0 { self.damping } else { 1.0 };
        camera.add_yaw(self.pending_yaw * factor);
        camera.add_pitch(self.pending_pitch * factor);
        self.pending_yaw *= 1.0 - factor;
        self.pending_pitch *= 1.0 - factor;
        true
    }

    /// Drops any motion still in flight
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
    }
}
