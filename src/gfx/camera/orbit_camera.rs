use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting a target point
///
/// The eye position is derived from `distance`, `pitch` and `yaw` around
/// `target`, so the view direction always passes through the orbit target.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    /// Creates an orbit camera around `target` with a 70 degree vertical
    /// field of view and 0.1 / 1000.0 clip planes.
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // derived in update()
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(70.0).into(),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the orbit target relative to the current view direction
    ///
    /// `delta.0` moves along the camera's right axis, `delta.1` along its up
    /// axis. Eye and target move together so the view direction is preserved.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance for a consistent feel at any zoom level
        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.eye += movement;
        self.target += movement;
    }

    /// Updates the eye position after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    /// Recomputes the projection aspect ratio from viewport dimensions
    ///
    /// Zero-sized dimensions (minimized window) are ignored; a zero aspect
    /// ratio would make the perspective projection panic.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(100.0),
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.4, 0.2, Vector3::new(0.0, 1.6, 0.0), 1.0)
    }

    #[test]
    fn resize_sets_exact_aspect_ratio() {
        let mut cam = camera();
        for (w, h) in [(1200u32, 800u32), (1, 1), (1920, 1080), (800, 1200)] {
            cam.resize_projection(w, h);
            assert_eq!(cam.aspect, w as f32 / h as f32);
        }
    }

    #[test]
    fn resize_with_identical_dimensions_is_idempotent() {
        let mut cam = camera();
        cam.resize_projection(1024, 768);
        cam.update_view_proj();
        let first = cam.uniform;

        cam.resize_projection(1024, 768);
        cam.update_view_proj();
        assert_eq!(first.view_proj, cam.uniform.view_proj);
        assert_eq!(first.view_position, cam.uniform.view_position);
    }

    #[test]
    fn minimized_window_resize_keeps_previous_projection() {
        let mut cam = camera();
        cam.resize_projection(1024, 768);
        cam.update_view_proj();
        let before = cam.uniform;

        cam.resize_projection(0, 0);
        cam.resize_projection(0, 768);
        cam.resize_projection(1024, 0);
        assert_eq!(cam.aspect, 1024.0 / 768.0);

        // a valid projection must still come out of the next frame
        cam.update_view_proj();
        assert_eq!(before.view_proj, cam.uniform.view_proj);
    }

    #[test]
    fn eye_sits_at_orbit_distance_from_target() {
        let cam = camera();
        let d = (cam.eye - cam.target).magnitude();
        assert!((d - cam.distance).abs() < 1e-5);
    }

    #[test]
    fn projection_uses_seventy_degree_fov() {
        let cam = camera();
        let expected: Rad<f32> = Deg(70.0).into();
        assert_eq!(cam.fovy, expected);
        assert_eq!(cam.znear, 0.1);
        assert_eq!(cam.zfar, 1000.0);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut cam = camera();
        cam.add_pitch(10.0);
        assert!(cam.pitch < std::f32::consts::PI / 2.0);
        cam.add_pitch(-20.0);
        assert!(cam.pitch > -std::f32::consts::PI / 2.0);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut cam = camera();
        let view_dir = (cam.target - cam.eye).normalize();
        cam.pan((1.0, 0.5));
        let panned_dir = (cam.target - cam.eye).normalize();
        assert!((view_dir - panned_dir).magnitude() < 1e-5);
    }
}
