use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// How much pending input survives each frame. Zero disables damping.
const DAMPING_FACTOR: f32 = 0.8;

/// Velocity below which pending input is considered settled.
const REST_EPSILON: f32 = 1e-4;

/// Maps pointer input onto an [`OrbitCamera`]
///
/// Input events accumulate as pending velocities; [`CameraController::update`]
/// applies them to the camera once per frame and decays them, so drags and
/// scrolls ease out over a few frames instead of stopping dead.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    pan_velocity: (f32, f32),
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            is_shift_held: false,
            is_mouse_pressed: false,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            pan_velocity: (0.0, 0.0),
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, window: &Window) {
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
                        *scroll as f32
                    }
                };
                self.zoom_velocity += scroll_amount * self.zoom_speed;
                window.request_redraw();
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move orbit target)
                        self.pan_velocity.0 += -delta.0 as f32 * self.pan_speed;
                        self.pan_velocity.1 += delta.1 as f32 * self.pan_speed;
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around target)
                        self.yaw_velocity += -delta.0 as f32 * self.rotate_speed;
                        self.pitch_velocity += delta.1 as f32 * self.rotate_speed;
                    }
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
            state,
            ..
        } = event
        {
            self.is_shift_held = *state == ElementState::Pressed;
        }
    }

    /// Advances the damping state by one frame, applying pending input
    ///
    /// Called exactly once per rendered frame. Returns true while any motion
    /// is still in flight.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if !self.is_moving() {
            return false;
        }

        camera.add_yaw(self.yaw_velocity);
        camera.add_pitch(self.pitch_velocity);
        camera.add_distance(self.zoom_velocity);
        if self.pan_velocity != (0.0, 0.0) {
            camera.pan(self.pan_velocity);
        }

        self.yaw_velocity *= DAMPING_FACTOR;
        self.pitch_velocity *= DAMPING_FACTOR;
        self.zoom_velocity *= DAMPING_FACTOR;
        self.pan_velocity.0 *= DAMPING_FACTOR;
        self.pan_velocity.1 *= DAMPING_FACTOR;

        if !self.is_moving() {
            self.settle();
        }
        true
    }

    fn is_moving(&self) -> bool {
        self.yaw_velocity.abs() > REST_EPSILON
            || self.pitch_velocity.abs() > REST_EPSILON
            || self.zoom_velocity.abs() > REST_EPSILON
            || self.pan_velocity.0.abs() > REST_EPSILON
            || self.pan_velocity.1.abs() > REST_EPSILON
    }

    fn settle(&mut self) {
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
        self.pan_velocity = (0.0, 0.0);
    }

    #[cfg(test)]
    pub(crate) fn impulse_yaw(&mut self, velocity: f32) {
        self.yaw_velocity += velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.4, 0.2, Vector3::new(0.0, 1.6, 0.0), 1.5)
    }

    #[test]
    fn update_with_no_pending_input_leaves_camera_untouched() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();
        let before = cam.yaw;

        assert!(!controller.update(&mut cam));
        assert_eq!(cam.yaw, before);
    }

    #[test]
    fn pending_rotation_decays_to_rest() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();
        controller.impulse_yaw(0.1);

        let mut frames = 0;
        while controller.update(&mut cam) {
            frames += 1;
            assert!(frames < 200, "damping never settled");
        }
        assert!(frames > 1, "damping should spread motion over frames");
        assert!(!controller.update(&mut cam));
    }

    #[test]
    fn yaw_impulse_rotates_camera_in_its_direction() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();
        let before = cam.yaw;
        controller.impulse_yaw(0.1);
        controller.update(&mut cam);
        assert!(cam.yaw > before);
    }
}
