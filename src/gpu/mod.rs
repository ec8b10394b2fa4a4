//! GPU plumbing: surface, device, and the per-frame two-pass render.
//!
//! The simulation lives entirely on the CPU. Each frame the field's particle
//! instances and connection segments are uploaded and drawn in two passes:
//! connection lines first, particle glows on top, over a cleared background.

mod connections;
mod particles;

use std::sync::Arc;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::field::ParticleField;
use crate::visuals::VisualConfig;
use connections::{ConnectionInstance, ConnectionPipeline};
use particles::ParticlePipeline;

/// Shared shader uniforms: pixel-space orthographic projection plus clock.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    time: f32,
    delta_time: f32,
    _padding: [f32; 2],
}

/// Projection mapping surface pixels (origin top-left, y down) to clip space.
fn pixel_projection(width: u32, height: u32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0)
}

pub(crate) struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub(crate) config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    particles: ParticlePipeline,
    links: ConnectionPipeline,
    background: wgpu::Color,
    start_time: Instant,
    last_frame_time: Instant,
    link_saturation_warned: bool,
}

impl GpuState {
    pub(crate) async fn new(
        window: Arc<Window>,
        visuals: &VisualConfig,
        particle_capacity: usize,
        link_capacity: usize,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms {
            view_proj: pixel_projection(config.width, config.height).to_cols_array_2d(),
            time: 0.0,
            delta_time: 0.0,
            _padding: [0.0; 2],
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let particles = ParticlePipeline::new(
            &device,
            &uniform_buffer,
            config.format,
            visuals.particle_color,
            particle_capacity,
        );
        let links = ConnectionPipeline::new(
            &device,
            &uniform_buffer,
            config.format,
            visuals.link_color,
            link_capacity,
        );

        let background = wgpu::Color {
            r: f64::from(visuals.background.x),
            g: f64::from(visuals.background.y),
            b: f64::from(visuals.background.z),
            a: 1.0,
        };

        let now = Instant::now();

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            particles,
            links,
            background,
            start_time: now,
            last_frame_time: now,
            link_saturation_warned: false,
        })
    }

    pub(crate) fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn update_uniforms(&mut self) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let uniforms = Uniforms {
            view_proj: pixel_projection(self.config.width, self.config.height).to_cols_array_2d(),
            time: self.start_time.elapsed().as_secs_f32(),
            delta_time,
            _padding: [0.0; 2],
        };

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw one frame of the field.
    pub(crate) fn render(&mut self, field: &ParticleField) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms();

        let instances: Vec<_> = field.particles().iter().map(|p| p.instance()).collect();
        let link_capacity = field.link_capacity();
        let segments: Vec<ConnectionInstance> = field
            .connections(link_capacity)
            .iter()
            .map(ConnectionInstance::from)
            .collect();

        if link_capacity > 0 && segments.len() >= link_capacity && !self.link_saturation_warned {
            log::warn!(
                "connection buffer saturated at {} segments; densest links are dropped from drawing",
                link_capacity,
            );
            self.link_saturation_warned = true;
        }

        self.particles.ensure_capacity(&self.device, instances.len());
        self.links
            .ensure_capacity(&self.device, &self.uniform_buffer, link_capacity);
        self.particles.upload(&self.queue, &instances);
        self.links.upload(&self.queue, &segments);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Lines beneath glows.
            self.links.draw(&mut render_pass, segments.len() as u32);
            self.particles.draw(&mut render_pass, instances.len() as u32);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
