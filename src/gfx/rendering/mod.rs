//! Rendering functionality built on wgpu

pub mod render_engine;

pub use render_engine::{RenderEngine, RenderEngineError};
