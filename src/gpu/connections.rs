//! Connection rendering between nearby particles.
//!
//! The field computes the segment list on the CPU each frame; this module
//! only draws it. Segments live in a storage buffer as two `vec4`s each
//! (endpoints, then alpha) and are expanded to one-pixel-wide quads in the
//! vertex shader.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::field::Connection;

/// Fragment parameters for the connection pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct RenderParams {
    color: [f32; 3],
    _pad: f32,
}

/// Storage-buffer form of a connection: `endpoints` = (ax, ay, bx, by),
/// `misc.x` = alpha.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ConnectionInstance {
    endpoints: [f32; 4],
    misc: [f32; 4],
}

impl From<&Connection> for ConnectionInstance {
    fn from(link: &Connection) -> Self {
        Self {
            endpoints: [link.a.x, link.a.y, link.b.x, link.b.y],
            misc: [link.alpha, 0.0, 0.0, 0.0],
        }
    }
}

/// Pipeline and segment buffer for the connection pass.
pub struct ConnectionPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    segment_buffer: wgpu::Buffer,
    capacity: usize,
    params_buffer: wgpu::Buffer,
}

impl ConnectionPipeline {
    pub fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        surface_format: wgpu::TextureFormat,
        color: Vec3,
        capacity: usize,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Connection Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let params = RenderParams {
            color: color.to_array(),
            _pad: 0.0,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Connection Render Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Connection Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let segment_buffer = create_segment_buffer(device, capacity);
        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            uniform_buffer,
            &segment_buffer,
            &params_buffer,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Connection Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Connection Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            segment_buffer,
            capacity,
            params_buffer,
        }
    }

    /// Grow the segment buffer (and rebuild its bind group) if this frame's
    /// link capacity outgrew it.
    pub fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        capacity: usize,
    ) {
        if capacity > self.capacity {
            self.segment_buffer = create_segment_buffer(device, capacity);
            self.bind_group = create_bind_group(
                device,
                &self.bind_group_layout,
                uniform_buffer,
                &self.segment_buffer,
                &self.params_buffer,
            );
            self.capacity = capacity;
        }
    }

    /// Upload this frame's segments.
    pub fn upload(&self, queue: &wgpu::Queue, segments: &[ConnectionInstance]) {
        if !segments.is_empty() {
            queue.write_buffer(&self.segment_buffer, 0, bytemuck::cast_slice(segments));
        }
    }

    /// Record the line draw into an open render pass.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, count: u32) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..count);
    }
}

fn create_segment_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Connection Segment Buffer"),
        size: (capacity.max(1) * std::mem::size_of::<ConnectionInstance>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    segment_buffer: &wgpu::Buffer,
    params_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Connection Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: segment_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params_buffer.as_entire_binding(),
            },
        ],
    })
}

const SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
};

struct RenderParams {
    color: vec3<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> segments: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> render_params: RenderParams;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) alpha: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    var out: VertexOutput;

    let endpoints = segments[instance_index * 2u];
    let misc = segments[instance_index * 2u + 1u];

    let pos_a = endpoints.xy;
    let pos_b = endpoints.zw;
    let alpha = misc.x;

    if alpha < 0.0001 {
        out.clip_position = vec4<f32>(0.0, 0.0, -1000.0, 1.0);
        out.alpha = 0.0;
        return out;
    }

    // Expand the segment to a quad one pixel wide.
    let dir = pos_b - pos_a;
    var perp = vec2<f32>(0.0, 0.5);
    if length(dir) > 0.0001 {
        perp = normalize(vec2<f32>(-dir.y, dir.x)) * 0.5;
    }

    var pos: vec2<f32>;
    switch vertex_index {
        case 0u: { pos = pos_a - perp; }
        case 1u: { pos = pos_a + perp; }
        case 2u: { pos = pos_b - perp; }
        case 3u: { pos = pos_a + perp; }
        case 4u: { pos = pos_b - perp; }
        default: { pos = pos_b + perp; }
    }

    out.clip_position = uniforms.view_proj * vec4<f32>(pos, 0.0, 1.0);
    out.alpha = alpha;

    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(render_params.color, in.alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_connection_shader_validates() {
        let module = naga::front::wgsl::parse_str(SHADER).expect("WGSL should parse");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator.validate(&module).expect("WGSL should validate");
    }

    #[test]
    fn test_instance_packs_endpoints_and_alpha() {
        let link = Connection {
            a: Vec2::new(1.0, 2.0),
            b: Vec2::new(3.0, 4.0),
            alpha: 0.05,
        };
        let inst = ConnectionInstance::from(&link);
        assert_eq!(inst.endpoints, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(inst.misc[0], 0.05);
    }
}
