//! Backdrop builder and runner.
//!
//! Use method chaining to configure, then call `.run()` to open the window
//! and animate until it is closed.
//!
//! ```ignore
//! use driftfield::Backdrop;
//!
//! Backdrop::new()
//!     .with_title("portfolio")
//!     .with_seed(7)
//!     .run()?;
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::BackdropError;
use crate::field::{FieldConfig, ParticleField, Spawner};
use crate::gpu::GpuState;
use crate::particle::Particle;
use crate::spawn::SpawnContext;
use crate::time::Time;
use crate::visuals::VisualConfig;

/// A particle backdrop builder.
pub struct Backdrop {
    title: String,
    size: (u32, u32),
    field_config: FieldConfig,
    visuals: VisualConfig,
    seed: Option<u64>,
    spawner: Option<Spawner>,
}

impl Backdrop {
    /// Create a backdrop with default settings.
    pub fn new() -> Self {
        Self {
            title: "Driftfield".to_string(),
            size: (1280, 720),
            field_config: FieldConfig::default(),
            visuals: VisualConfig::default(),
            seed: None,
            spawner: None,
        }
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the logical window size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Seed the particle spawn deterministically. Identical seed and surface
    /// dimensions reproduce the same backdrop.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Tune the field parameters (density, attraction, damping, link radius).
    pub fn with_field(mut self, configure: impl FnOnce(&mut FieldConfig)) -> Self {
        configure(&mut self.field_config);
        self
    }

    /// Tune the colors.
    pub fn with_visuals(mut self, configure: impl FnOnce(&mut VisualConfig)) -> Self {
        configure(&mut self.visuals);
        self
    }

    /// Replace the default spawner. Called once per particle, including on
    /// every resize regeneration.
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> Particle + Send + Sync + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    /// Open the window and animate. Blocks until the window is closed.
    ///
    /// Fails fast if the event loop, window, or GPU cannot be brought up.
    /// A backdrop that silently never appears is a bug, not a degradation.
    pub fn run(self) -> Result<(), BackdropError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    backdrop: Backdrop,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: Option<ParticleField>,
    time: Time,
    /// The explicit cancellation flag: once false, the redraw loop stops
    /// re-requesting frames.
    running: bool,
    init_error: Option<BackdropError>,
}

impl App {
    fn new(backdrop: Backdrop) -> Self {
        Self {
            backdrop,
            window: None,
            gpu: None,
            field: None,
            time: Time::new(),
            running: true,
            init_error: None,
        }
    }

    fn halt(&mut self) {
        self.running = false;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.backdrop.size;
        let window_attrs = Window::default_attributes()
            .with_title(self.backdrop.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                self.init_error = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        // The field mirrors the physical surface, not the logical size.
        let size = window.inner_size();
        let mut field = match self.backdrop.seed {
            Some(seed) => ParticleField::with_seed(
                size.width as f32,
                size.height as f32,
                self.backdrop.field_config,
                seed,
            ),
            None => ParticleField::new(size.width as f32, size.height as f32, self.backdrop.field_config),
        };
        if let Some(spawner) = self.backdrop.spawner.take() {
            field.set_spawner(spawner);
        }

        let gpu = pollster::block_on(GpuState::new(
            window,
            &self.backdrop.visuals,
            field.particle_count(),
            field.link_capacity(),
        ));
        match gpu {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.field = Some(field);
            }
            Err(e) => {
                log::error!("failed to initialize GPU: {}", e);
                self.init_error = Some(e.into());
                self.halt();
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.halt();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    if let Some(field) = &mut self.field {
                        field.resize(physical_size.width as f32, physical_size.height as f32);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(field) = &mut self.field {
                    field.set_pointer(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(gpu), Some(field)) = (&mut self.gpu, &mut self.field) {
                    field.step();
                    match gpu.render(field) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                            width: gpu.config.width,
                            height: gpu.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("out of GPU memory, stopping backdrop");
                            self.halt();
                            event_loop.exit();
                        }
                        // A failed frame is skipped; the next frame is a
                        // fresh attempt.
                        Err(e) => log::error!("render error: {:?}", e),
                    }

                    if self.time.tick() {
                        if let Some(window) = &self.window {
                            window.set_title(&format!(
                                "{} - {:.0} fps",
                                self.backdrop.title,
                                self.time.fps(),
                            ));
                        }
                        log::debug!("frame {} at {:.0} fps", self.time.frame(), self.time.fps());
                    }
                }

                if self.running {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_builder_defaults() {
        let b = Backdrop::new();
        assert_eq!(b.size, (1280, 720));
        assert_eq!(b.title, "Driftfield");
        assert!(b.seed.is_none());
        assert!(b.spawner.is_none());
    }

    #[test]
    fn test_builder_chains() {
        let b = Backdrop::new()
            .with_title("demo")
            .with_size(800, 600)
            .with_seed(42)
            .with_field(|f| f.damping = 0.95)
            .with_spawner(|_ctx| Particle {
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                radius: 1.0,
                opacity: 0.5,
            });
        assert_eq!(b.title, "demo");
        assert_eq!(b.size, (800, 600));
        assert_eq!(b.seed, Some(42));
        assert_eq!(b.field_config.damping, 0.95);
        assert!(b.spawner.is_some());
    }

    #[test]
    fn test_halt_clears_running_flag() {
        let mut app = App::new(Backdrop::new());
        assert!(app.running);
        app.halt();
        assert!(!app.running);
    }
}
