//! Global uniform bindings for camera and light data
//!
//! Manages the uniform buffer and bind group for per-frame global state
//! shared by every object: camera matrices plus the point light, including
//! the light's view-projection matrix for shadow mapping.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::{
    gfx::camera::{camera_utils::CameraUniform, orbit_camera::OPENGL_TO_WGPU_MATRIX},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content. Must match the Globals struct in the
/// shaders exactly, including field order and padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    light_range: f32,
    light_color: [f32; 3],
    light_intensity: f32,
    light_view_proj: [[f32; 4]; 4],
}

/// A point light source
///
/// Created once when the stage is built and never mutated afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    /// Falloff radius beyond which the light contributes nothing
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 0.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            range: 100.0,
        }
    }
}

impl PointLight {
    /// View-projection matrix used to render the shadow map from this light
    ///
    /// Looks from the light towards the scene origin. The up vector falls
    /// back to +Z when the light sits directly above the origin.
    pub fn build_view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        let position = Point3::new(self.position[0], self.position[1], self.position[2]);
        let direction = -position.to_vec();

        let up = if direction.cross(Vector3::unit_y()).magnitude2() < 1e-6 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let view = cgmath::Matrix4::look_at_rh(position, Point3::origin(), up);
        let proj = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(cgmath::Deg(120.0), 1.0, 0.1, self.range);
        proj * view
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and light data
///
/// Called each frame so shaders see the current camera matrices; the light
/// half only changes if the scene's light does.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: &PointLight,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_position: light.position,
        light_range: light.range,
        light_color: light.color,
        light_intensity: light.intensity,
        light_view_proj: light.build_view_projection_matrix().into(),
    };

    ubo.update_content(queue, content);
}

/// Manages the bind group layout and bind group for global uniforms
///
/// Bound to slot 0 in every render pipeline.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // camera + light
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group; must run before any rendering
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn overhead_light_builds_a_valid_matrix() {
        // light straight above the origin would degenerate with a +Y up vector
        let light = PointLight::default();
        let m = light.build_view_projection_matrix();
        assert!(m.determinant().abs() > 1e-6);
    }

    #[test]
    fn origin_projects_inside_the_light_frustum() {
        let light = PointLight::default();
        let m = light.build_view_projection_matrix();
        let clip = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!(ndc.z >= 0.0 && ndc.z <= 1.0);
    }
}
