use anyhow::{bail, Context, Result};
use wgpu::util::DeviceExt;

use crate::mesh::GridMesh;
use crate::shader::{ShaderProgram, UniformSlot, POSITION_ATTRIBUTE};

use super::RenderTarget;

/// How the wireframe is rasterized.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WireframeMode {
    /// Triangle list drawn with `PolygonMode::Line`.
    PolygonLine,
    /// Line list over the unique triangle edges; used when the device lacks
    /// `Features::POLYGON_MODE_LINE`.
    EdgeList,
}

impl WireframeMode {
    pub fn for_features(features: wgpu::Features) -> Self {
        if features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            WireframeMode::PolygonLine
        } else {
            WireframeMode::EdgeList
        }
    }

    fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            WireframeMode::PolygonLine => wgpu::PrimitiveTopology::TriangleList,
            WireframeMode::EdgeList => wgpu::PrimitiveTopology::LineList,
        }
    }

    fn polygon_mode(self) -> wgpu::PolygonMode {
        match self {
            WireframeMode::PolygonLine => wgpu::PolygonMode::Line,
            WireframeMode::EdgeList => wgpu::PolygonMode::Fill,
        }
    }
}

/// Uniform buffer plus where `var` lives inside it.
struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    var: Option<UniformSlot>,
}

/// Draws the grid mesh with a linked shader program.
///
/// All GPU objects are created once in `new`; per frame only the `var`
/// uniform is written.
pub struct GridRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform: Option<UniformBinding>,
    mode: WireframeMode,

    // Keeps the modules alive for the pipeline's lifetime.
    _program: ShaderProgram,
}

impl GridRenderer {
    /// Uploads `mesh` as static buffers and builds the pipeline for `program`.
    ///
    /// Fails when the program does not expose `s_vPosition` as a `vec3`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        features: wgpu::Features,
        program: ShaderProgram,
        mesh: &GridMesh,
    ) -> Result<Self> {
        let iface = *program.interface();

        let position = iface
            .position
            .with_context(|| format!("vertex stage does not declare `{POSITION_ATTRIBUTE}`"))?;
        if position.format != Some(wgpu::VertexFormat::Float32x3) {
            bail!(
                "`{POSITION_ATTRIBUTE}` must be a vec3 of floats, found {:?}",
                position.format
            );
        }

        let mode = WireframeMode::for_features(features);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridplane grid vbo"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let edges;
        let index_bytes = match mode {
            WireframeMode::PolygonLine => mesh.index_bytes(),
            WireframeMode::EdgeList => {
                edges = mesh.wireframe_edges();
                bytemuck::cast_slice::<u32, u8>(&edges)
            }
        };
        let index_count = u32::try_from(index_bytes.len() / std::mem::size_of::<u32>())
            .context("index buffer too large")?;

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gridplane grid ibo"),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut bind_group_layouts = Vec::new();
        let uniform = match iface.uniform_block {
            None => None,
            Some(block) => {
                // Uniform buffer sizes must be a multiple of 16.
                let size = u64::from(block.size.max(4)).next_multiple_of(16);

                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("gridplane uniform bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: block.binding,
                        visibility: block.visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("gridplane uniform ubo"),
                    size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("gridplane uniform bind group"),
                    layout: &layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: block.binding,
                        resource: buffer.as_entire_binding(),
                    }],
                });

                bind_group_layouts.push(layout);
                Some(UniformBinding {
                    buffer,
                    bind_group,
                    var: iface.var,
                })
            }
        };

        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gridplane pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let attributes = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: position.location,
        }];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gridplane grid pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: program.vertex_module(),
                entry_point: Some("main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: program.fragment_module(),
                entry_point: Some("main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: mode.topology(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Mixed winding is expected; never cull.
                cull_mode: None,
                polygon_mode: mode.polygon_mode(),
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!(
            "grid renderer ready: {}x{} cells, {} indices",
            mesh.resolution(),
            mesh.resolution(),
            index_count
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count,
            uniform,
            mode,
            _program: program,
        })
    }

    #[inline]
    pub fn mode(&self) -> WireframeMode {
        self.mode
    }

    /// Uploads the animation scalar. No-op when the program has no `var`.
    pub fn set_var(&self, queue: &wgpu::Queue, value: f32) {
        let Some(uniform) = self.uniform.as_ref() else { return };
        let Some(slot) = uniform.var else { return };
        queue.write_buffer(&uniform.buffer, u64::from(slot.offset), bytemuck::bytes_of(&value));
    }

    /// Records the grid draw into `target`, keeping its existing contents.
    pub fn render(&self, target: &mut RenderTarget<'_>) {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gridplane grid pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(
            0.0,
            0.0,
            target.size.width.max(1) as f32,
            target.size.height.max(1) as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(&self.pipeline);
        if let Some(uniform) = self.uniform.as_ref() {
            rpass.set_bind_group(0, &uniform.bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_mode_feature_selects_polygon_line() {
        let mode = WireframeMode::for_features(wgpu::Features::POLYGON_MODE_LINE);
        assert_eq!(mode, WireframeMode::PolygonLine);
        assert_eq!(mode.topology(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(mode.polygon_mode(), wgpu::PolygonMode::Line);
    }

    #[test]
    fn missing_feature_falls_back_to_edges() {
        let mode = WireframeMode::for_features(wgpu::Features::empty());
        assert_eq!(mode, WireframeMode::EdgeList);
        assert_eq!(mode.topology(), wgpu::PrimitiveTopology::LineList);
        assert_eq!(mode.polygon_mode(), wgpu::PolygonMode::Fill);
    }
}
