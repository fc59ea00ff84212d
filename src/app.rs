use std::sync::Arc;

use anyhow::Context;
use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera},
    RenderEngine, Scene,
};

/// Height of the orbit target above the ground plane
const EYE_HEIGHT: f32 = 1.6;

/// The hosted scene application
///
/// Owns the event loop and the mounted state. Construct with
/// [`PlinthApp::new`] (or [`crate::default`]) and call [`PlinthApp::run`].
pub struct PlinthApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    frame_loop: FrameLoop,
}

impl PlinthApp {
    /// Create the application with the fixed stage scene
    ///
    /// Nothing touches the GPU yet; the renderer is created when the event
    /// loop delivers the mount (`resumed`) callback.
    pub async fn new() -> Self {
        let _ = env_logger::try_init();

        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let mut camera = OrbitCamera::new(
            5.0,
            0.35,
            0.5,
            Vector3::new(0.0, EYE_HEIGHT, 0.0),
            1.5,
        );
        camera.bounds.min_distance = Some(1.0);
        let controller = CameraController::new(0.005, 0.1);

        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::stage(camera_manager);

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                frame_loop: FrameLoop::new(),
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl AppState {
    /// Tears down the mounted state: stops the frame loop so later resize
    /// and redraw events are ignored, and drops the render engine, releasing
    /// its GPU resources. Safe to call more than once.
    fn unmount(&mut self) {
        if self.frame_loop.is_running() {
            log::info!(
                "unmounting after {} rendered frames",
                self.frame_loop.frames()
            );
        }
        self.frame_loop.stop();
        self.render_engine.take();
        self.window.take();
    }

    fn frame_step(&mut self, event_loop: &ActiveEventLoop) {
        if !self.frame_loop.tick() {
            return;
        }
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        // one render and one controls update per tick, in lock-step
        self.scene.update();
        render_engine.update(
            self.scene.camera_manager.camera.uniform,
            &self.scene.light,
        );

        match render_engine.render_frame(&self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                render_engine.reconfigure_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                self.unmount();
                event_loop.exit();
            }
            Err(err) => log::warn!("frame skipped: {err}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("plinth")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();

        let window_clone = window.clone();
        let render_engine = match pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height).await
        }) {
            Ok(engine) => engine,
            Err(err) => {
                log::error!("failed to initialize renderer: {err}");
                event_loop.exit();
                return;
            }
        };

        self.scene.init_gpu_resources(
            render_engine.device(),
            render_engine.queue(),
            render_engine.object_bind_group_layout(),
        );
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        self.render_engine = Some(render_engine);
        self.frame_loop.start();
        log::info!("scene mounted at {width}x{height}");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if matches!(
                    event.physical_key,
                    winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                ) {
                    self.unmount();
                    event_loop.exit();
                    return;
                }
                self.scene.camera_manager.process_keyboard_event(&event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                // ignored once unmounted: the listener is gone with the loop
                if !self.frame_loop.is_running() {
                    return;
                }
                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };
                log::debug!("resized to {width}x{height}");
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                self.frame_step(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // self-rescheduling frame chain: request the next redraw while mounted
        if !self.frame_loop.is_running() {
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}

/// Lifecycle phase of the hosted scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unmounted,
    Running,
}

/// Explicit frame loop state
///
/// The running flag is the frame chain's stop condition: ticks count only
/// while mounted, and stopping is what ends the chain rather than dropped
/// closures or callback garbage collection.
struct FrameLoop {
    phase: Phase,
    frames: u64,
}

impl FrameLoop {
    fn new() -> Self {
        Self {
            phase: Phase::Unmounted,
            frames: 0,
        }
    }

    fn start(&mut self) {
        self.phase = Phase::Running;
    }

    fn stop(&mut self) {
        self.phase = Phase::Unmounted;
    }

    fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Counts one frame; returns false (and counts nothing) when stopped
    fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.frames += 1;
        true
    }

    fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unmounted_with_zero_frames() {
        let frame_loop = FrameLoop::new();
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.frames(), 0);
    }

    #[test]
    fn n_ticks_count_n_frames() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start();
        for _ in 0..17 {
            assert!(frame_loop.tick());
        }
        assert_eq!(frame_loop.frames(), 17);
    }

    #[test]
    fn ticks_are_ignored_while_unmounted() {
        let mut frame_loop = FrameLoop::new();
        assert!(!frame_loop.tick());
        frame_loop.start();
        frame_loop.tick();
        frame_loop.stop();
        assert!(!frame_loop.tick());
        assert_eq!(frame_loop.frames(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.start();
        frame_loop.stop();
        frame_loop.stop();
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn two_state_machine_round_trip() {
        let mut frame_loop = FrameLoop::new();
        assert_eq!(frame_loop.phase, Phase::Unmounted);
        frame_loop.start();
        assert_eq!(frame_loop.phase, Phase::Running);
        frame_loop.stop();
        assert_eq!(frame_loop.phase, Phase::Unmounted);
    }
}
