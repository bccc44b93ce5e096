use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::gfx::{AttribFormat, GraphicsError, VertexAttrib};

/// GL clip space has depth in `-1..1`; wgpu expects `0..1`.
#[rustfmt::skip]
const GL_TO_WGPU_DEPTH: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// Shader inputs of the built-in effect.
const EFFECT_INPUTS: [(u32, AttribFormat); 2] =
    [(0, AttribFormat::Float32x3), (1, AttribFormat::Float32x4)];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct TransformsUniform {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
}

impl TransformsUniform {
    pub fn from_gl(projection: &Mat4, model_view: &Mat4) -> Self {
        Self {
            projection: (GL_TO_WGPU_DEPTH * *projection).to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
        }
    }
}

impl Default for TransformsUniform {
    fn default() -> Self {
        Self::from_gl(&Mat4::IDENTITY, &Mat4::IDENTITY)
    }
}

/// Attributes sourced from one vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct LayoutGroup {
    pub stride: u32,
    pub attribs: Vec<VertexAttrib>,
}

/// Checks that `layout` feeds every input of the built-in effect.
pub(super) fn check_layout(layout: &[LayoutGroup]) -> Result<(), GraphicsError> {
    for group in layout {
        for a in &group.attribs {
            if a.offset % 4 != 0 || a.offset + a.format.size_in_bytes() > group.stride {
                return Err(GraphicsError::InvalidDraw(format!(
                    "attribute {} at offset {} does not fit stride {}",
                    a.location, a.offset, group.stride
                )));
            }
        }
    }

    for (location, format) in EFFECT_INPUTS {
        let found = layout
            .iter()
            .flat_map(|g| g.attribs.iter())
            .find(|a| a.location == location);
        match found {
            Some(a) if a.format == format => {}
            Some(a) => {
                return Err(GraphicsError::InvalidDraw(format!(
                    "attribute {location} is {:?}, effect expects {format:?}",
                    a.format
                )));
            }
            None => {
                return Err(GraphicsError::InvalidDraw(format!(
                    "attribute {location} is not enabled"
                )));
            }
        }
    }
    Ok(())
}

fn vertex_format(format: AttribFormat) -> wgpu::VertexFormat {
    match format {
        AttribFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        AttribFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// Render pipelines for the built-in effect, one per vertex layout.
pub(super) struct EffectPipelines {
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    cache: HashMap<(wgpu::TextureFormat, Vec<LayoutGroup>), wgpu::RenderPipeline>,
}

impl EffectPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadspin transform-color shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/transform_color.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quadspin transforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(uniform_size()),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadspin effect pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        Self {
            shader,
            bind_group_layout,
            pipeline_layout,
            cache: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &[LayoutGroup],
    ) {
        let key = (format, layout.to_vec());
        if self.cache.contains_key(&key) {
            return;
        }

        log::debug!("building effect pipeline for {format:?}, {} vertex buffer(s)", layout.len());

        let attributes: Vec<Vec<wgpu::VertexAttribute>> = layout
            .iter()
            .map(|g| {
                g.attribs
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: vertex_format(a.format),
                        offset: u64::from(a.offset),
                        shader_location: a.location,
                    })
                    .collect()
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = layout
            .iter()
            .zip(&attributes)
            .map(|(g, attrs)| wgpu::VertexBufferLayout {
                array_stride: u64::from(g.stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quadspin effect pipeline"),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            multiview_mask: None,
            cache: None,
        });

        self.cache.insert(key, pipeline);
    }

    pub fn get(
        &self,
        format: wgpu::TextureFormat,
        layout: &[LayoutGroup],
    ) -> Option<&wgpu::RenderPipeline> {
        self.cache.get(&(format, layout.to_vec()))
    }
}

fn uniform_size() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<TransformsUniform>() as u64)
        .unwrap_or(NonZeroU64::MIN)
}

/// Uniform buffer holding one `TransformsUniform` per draw of a frame,
/// addressed with dynamic offsets.
pub(super) struct TransformSlots {
    alignment: u64,
    capacity: usize,
    buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
}

impl TransformSlots {
    pub fn new(alignment: u32) -> Self {
        Self {
            alignment: u64::from(alignment.max(1)),
            capacity: 0,
            buffer: None,
            bind_group: None,
        }
    }

    fn stride(&self) -> u64 {
        let size = std::mem::size_of::<TransformsUniform>() as u64;
        size.div_ceil(self.alignment) * self.alignment
    }

    /// Dynamic offset of slot `index`.
    pub fn offset(&self, index: usize) -> u32 {
        (self.stride() * index as u64) as u32
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Writes `slots` into consecutive slots, growing the buffer if needed.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        slots: &[TransformsUniform],
    ) {
        if slots.is_empty() {
            return;
        }
        if slots.len() > self.capacity || self.buffer.is_none() {
            self.grow(device, layout, slots.len());
        }
        let Some(buffer) = self.buffer.as_ref() else { return };

        let stride = self.stride() as usize;
        let mut bytes = vec![0u8; stride * slots.len()];
        for (i, slot) in slots.iter().enumerate() {
            let start = i * stride;
            bytes[start..start + std::mem::size_of::<TransformsUniform>()]
                .copy_from_slice(bytemuck::bytes_of(slot));
        }
        queue.write_buffer(buffer, 0, &bytes);
    }

    fn grow(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, required: usize) {
        let capacity = required.next_power_of_two().max(4);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadspin transforms ubo"),
            size: self.stride() * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadspin transforms bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(uniform_size()),
                }),
            }],
        });

        self.buffer = Some(buffer);
        self.bind_group = Some(bind_group);
        self.capacity = capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(attribs: Vec<VertexAttrib>) -> LayoutGroup {
        LayoutGroup { stride: 28, attribs }
    }

    const POS: VertexAttrib = VertexAttrib {
        location: 0,
        format: AttribFormat::Float32x3,
        stride: 28,
        offset: 0,
    };
    const COLOR: VertexAttrib = VertexAttrib {
        location: 1,
        format: AttribFormat::Float32x4,
        stride: 28,
        offset: 12,
    };

    #[test]
    fn depth_correction_maps_gl_range() {
        let near = GL_TO_WGPU_DEPTH * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = GL_TO_WGPU_DEPTH * glam::Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
    }

    #[test]
    fn interleaved_position_color_is_accepted() {
        assert_eq!(check_layout(&[group(vec![POS, COLOR])]), Ok(()));
    }

    #[test]
    fn missing_color_is_rejected() {
        assert!(matches!(
            check_layout(&[group(vec![POS])]),
            Err(GraphicsError::InvalidDraw(_))
        ));
    }

    #[test]
    fn attribute_past_stride_is_rejected() {
        let mut color = COLOR;
        color.offset = 16;
        assert!(check_layout(&[group(vec![POS, color])]).is_err());
    }

    #[test]
    fn slot_offsets_respect_alignment() {
        let slots = TransformSlots::new(256);
        assert_eq!(slots.offset(0), 0);
        assert_eq!(slots.offset(1), 256);

        let tight = TransformSlots::new(64);
        assert_eq!(tight.offset(1), 128);
    }
}
