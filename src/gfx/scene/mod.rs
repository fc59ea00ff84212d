//! # Scene Management Module
//!
//! The scene graph: camera plus controls, the light, the renderable objects
//! and their materials.
//!
//! - [`Scene`] - scene container owning camera, light, objects and materials
//! - [`Object`] - individual 3D object with meshes, transform and shadow flags
//! - [`Vertex3D`] - GPU vertex format with position and normal

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Object};
pub use scene::Scene;
pub use vertex::Vertex3D;
