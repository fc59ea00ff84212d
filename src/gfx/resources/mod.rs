//! GPU resource management: global uniforms, materials and textures

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, PointLight};
pub use material::{Material, MaterialManager};
pub use texture_resource::TextureResource;
