use cgmath::Vector3;
use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    geometry::{generate_box, generate_plane},
    resources::{
        global_bindings::PointLight,
        material::{Material, MaterialManager},
    },
};

use super::object::Object;

/// Dimensions of the fixed stage content
const GROUND_SIZE: f32 = 10.0;
const CUBE_SIZE: f32 = 1.0;

/// Main scene: camera plus controls, one light, objects and materials
///
/// Constructed exactly once per mount. The camera manager, light and objects
/// form a cohesive set for the whole mounted lifetime; the render loop is the
/// only mutator besides the resize handler.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub light: PointLight,
    pub background: wgpu::Color,
    pub material_manager: MaterialManager,
}

impl Scene {
    /// Creates an empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            light: PointLight::default(),
            background: wgpu::Color::BLACK,
            material_manager: MaterialManager::new(),
        }
    }

    /// Builds the fixed stage: green backdrop, a white point light overhead,
    /// a shadow-receiving ground plane and a shadow-casting cube resting on it.
    pub fn stage(camera_manager: CameraManager) -> Self {
        let mut scene = Self::new(camera_manager);

        // 0x008000 backdrop
        scene.background = wgpu::Color {
            r: 0.0,
            g: 0.5,
            b: 0.0,
            a: 1.0,
        };

        scene.light = PointLight {
            position: [0.0, 2.0, 0.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            range: 100.0,
        };

        scene
            .material_manager
            .add_material(Material::new("ground", [1.0, 1.0, 1.0, 1.0], 0.0, 1.0));
        scene
            .material_manager
            .add_material(Material::new("cube", [1.0, 1.0, 1.0, 1.0], 0.0, 0.8));

        let ground =
            Object::from_geometry("ground", &generate_plane(GROUND_SIZE, GROUND_SIZE, 1, 1))
                .with_material("ground")
                .with_receive_shadow(true);
        scene.objects.push(ground);

        // Resting on the plane: base at y = 0 means center at half the height
        let cube = Object::from_geometry("cube", &generate_box(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE))
            .with_material("cube")
            .with_translation(Vector3::new(0.0, CUBE_SIZE / 2.0, 0.0))
            .with_cast_shadow(true);
        scene.objects.push(cube);

        scene
    }

    /// Per-frame step: advance controls damping and refresh camera matrices
    pub fn update(&mut self) {
        self.camera_manager.update();
    }

    /// Uploads GPU resources for all objects and materials
    ///
    /// Must be called once the device is available and before rendering.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        object_layout: &wgpu::BindGroupLayout,
    ) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, object_layout);
        }
        self.material_manager.update_all_gpu_resources(device, queue);
    }

    /// Material assigned to the object, or the default material
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.material_id.as_ref())
    }

    /// Objects drawn into the shadow map
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter().filter(|o| o.visible && o.casts_shadow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, OrbitCamera};
    use cgmath::Vector3;

    fn stage() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::new(0.0, 1.6, 0.0), 1.5);
        let controller = CameraController::new(0.005, 0.1);
        Scene::stage(CameraManager::new(camera, controller))
    }

    #[test]
    fn stage_has_exactly_one_plane_and_one_cube_in_order() {
        let scene = stage();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[0].name, "ground");
        assert_eq!(scene.objects[1].name, "cube");
    }

    #[test]
    fn cube_rests_on_the_ground_plane() {
        let scene = stage();
        let cube = &scene.objects[1];
        // base exactly at y = 0 for a unit cube: center at height / 2
        assert_eq!(cube.translation(), Vector3::new(0.0, CUBE_SIZE / 2.0, 0.0));
    }

    #[test]
    fn shadow_flags_match_stage_roles() {
        let scene = stage();
        assert!(scene.objects[0].receives_shadow);
        assert!(!scene.objects[0].casts_shadow);
        assert!(scene.objects[1].casts_shadow);
        assert!(!scene.objects[1].receives_shadow);
        assert_eq!(scene.shadow_casters().count(), 1);
    }

    #[test]
    fn light_sits_above_the_origin() {
        let scene = stage();
        assert_eq!(scene.light.position, [0.0, 2.0, 0.0]);
        assert_eq!(scene.light.color, [1.0, 1.0, 1.0]);
        assert_eq!(scene.light.intensity, 1.0);
        assert_eq!(scene.light.range, 100.0);
    }

    #[test]
    fn backdrop_is_green() {
        let scene = stage();
        assert_eq!(scene.background.g, 0.5);
        assert_eq!(scene.background.r, 0.0);
        assert_eq!(scene.background.b, 0.0);
    }

    #[test]
    fn controls_orbit_the_camera_target() {
        let scene = stage();
        // camera and controls are a pair bound to the same target point
        assert_eq!(
            scene.camera_manager.camera.target,
            Vector3::new(0.0, 1.6, 0.0)
        );
    }
}
