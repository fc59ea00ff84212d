//! # Graphics Module
//!
//! Everything the hosted scene needs to draw itself:
//!
//! - **Camera System** ([`camera`]) - orbit camera with damped controls
//! - **Geometry** ([`geometry`]) - procedural box and plane primitives
//! - **Rendering** ([`rendering`]) - shadow and main passes on wgpu
//! - **Scene Management** ([`scene`]) - objects, light and materials
//! - **Resource Management** ([`resources`]) - uniforms, materials, textures

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
