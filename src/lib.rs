//! # plinth
//!
//! A small windowed 3D scene host built on wgpu and winit.
//!
//! Mounting the application opens a window and stages a fixed scene: a
//! green backdrop, a point light, a shadow-receiving ground plane and a
//! shadow-casting unit cube resting on it, viewed through an orbit camera
//! with damped mouse controls. The frame loop renders continuously until
//! the window closes, at which point every GPU resource is released.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     plinth::default().run()
//! }
//! ```

pub mod app;
pub mod gfx;
pub mod wgpu_utils;

pub use app::PlinthApp;
pub use gfx::{OrbitCamera, RenderEngine, Scene};

/// Creates the scene host with its built-in stage
pub fn default() -> PlinthApp {
    pollster::block_on(PlinthApp::new())
}
