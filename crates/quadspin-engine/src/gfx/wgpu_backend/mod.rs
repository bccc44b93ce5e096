//! GL object model on top of wgpu.
//!
//! wgpu has no contexts, no bind points and no mutable global state, so this
//! backend keeps those in [`GlState`] and translates at the edges:
//! - `buffer_data` creates an immutable wgpu buffer from the uploaded bytes;
//! - vertex arrays become a vertex layout, which selects a cached pipeline;
//! - `clear` / `set_transforms` / `draw_indexed` are recorded and encoded into
//!   a single render pass by [`WgpuGraphics::present`].
//!
//! wgpu has no 8-bit index format; `u8` index data is widened to `u16` the
//! first time it is drawn as such.

mod pipeline;

use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::{ColorRgba, Viewport};
use crate::device::{FrameSkipped, Gpu};

use super::state::GlState;
use super::{
    BufferTarget, ContextId, GraphicsApi, GraphicsError, IndexType, ResourceId, VertexAttrib,
};
use pipeline::{check_layout, EffectPipelines, LayoutGroup, TransformSlots, TransformsUniform};

struct GpuBuffer {
    bytes: Vec<u8>,
    buffer: wgpu::Buffer,
    widened_u16: Option<wgpu::Buffer>,
}

impl GpuBuffer {
    fn new(device: &wgpu::Device, target: BufferTarget, data: &[u8]) -> Self {
        // Zero-sized buffers cannot be bound.
        let contents: &[u8] = if data.is_empty() { &[0; 4] } else { data };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match target {
                BufferTarget::Array => "quadspin vertex buffer",
                BufferTarget::ElementArray => "quadspin index buffer",
            }),
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX,
        });

        Self {
            bytes: data.to_vec(),
            buffer,
            widened_u16: None,
        }
    }

    fn as_u16_indices(&mut self, device: &wgpu::Device) -> &wgpu::Buffer {
        let bytes = &self.bytes;
        self.widened_u16.get_or_insert_with(|| {
            let wide: Vec<u16> = bytes.iter().map(|&b| u16::from(b)).collect();
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quadspin widened index buffer"),
                contents: bytemuck::cast_slice(&wide),
                usage: wgpu::BufferUsages::INDEX,
            })
        })
    }
}

struct DrawOp {
    layout: Vec<LayoutGroup>,
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_format: wgpu::IndexFormat,
    index_count: u32,
    transforms: TransformsUniform,
}

#[derive(Default)]
struct FrameRecording {
    clear: Option<ColorRgba>,
    draws: Vec<DrawOp>,
}

/// [`GraphicsApi`] backed by a window surface.
pub struct WgpuGraphics<'w> {
    gpu: Gpu<'w>,
    gl: GlState<GpuBuffer>,
    pipelines: EffectPipelines,
    slots: TransformSlots,
    transforms: TransformsUniform,
    frame: FrameRecording,
    last: FrameRecording,
}

impl<'w> WgpuGraphics<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let pipelines = EffectPipelines::new(gpu.device());
        let slots = TransformSlots::new(gpu.uniform_offset_alignment());
        Self {
            gpu,
            gl: GlState::default(),
            pipelines,
            slots,
            transforms: TransformsUniform::default(),
            frame: FrameRecording::default(),
            last: FrameRecording::default(),
        }
    }

    /// Current drawable size in physical pixels.
    pub fn viewport(&self) -> Viewport {
        let size = self.gpu.size();
        Viewport::new(size.width as f32, size.height as f32)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Encodes everything recorded since the last call into one render pass
    /// and presents it.
    ///
    /// When no swapchain texture is available nothing is shown and the reason
    /// is returned; the caller decides whether to continue.
    pub fn present(&mut self) -> Result<(), FrameSkipped> {
        let recording = std::mem::take(&mut self.frame);
        let shown = self.encode(&recording);
        self.last = recording;
        shown
    }

    /// Presents the most recently presented recording again, without any new
    /// calls. Used while the app is paused, when the surface still needs
    /// content (after a resize, say).
    pub fn present_last(&mut self) -> Result<(), FrameSkipped> {
        let last = std::mem::take(&mut self.last);
        let shown = self.encode(&last);
        self.last = last;
        shown
    }

    fn encode(&mut self, recording: &FrameRecording) -> Result<(), FrameSkipped> {
        let frame = self.gpu.acquire()?;
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quadspin frame encoder"),
            });

        let transforms: Vec<TransformsUniform> =
            recording.draws.iter().map(|d| d.transforms).collect();
        self.slots.upload(
            self.gpu.device(),
            self.gpu.queue(),
            self.pipelines.bind_group_layout(),
            &transforms,
        );

        let format = self.gpu.surface_format();
        let clear = recording.clear.unwrap_or(ColorRgba::BLACK);

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quadspin pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(bind_group) = self.slots.bind_group() {
                for (i, draw) in recording.draws.iter().enumerate() {
                    let Some(pipeline) = self.pipelines.get(format, &draw.layout) else {
                        log::warn!("no pipeline for recorded draw {i}; skipped");
                        continue;
                    };

                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(0, bind_group, &[self.slots.offset(i)]);
                    for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                        rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                    }
                    rpass.set_index_buffer(draw.index_buffer.slice(..), draw.index_format);
                    rpass.draw_indexed(0..draw.index_count, 0, 0..1);
                }
            }
        }

        self.gpu.present(frame, encoder.finish());
        Ok(())
    }
}

/// Groups attributes by source buffer and stride, in location order.
fn group_attribs(
    attribs: &[super::state::BoundAttrib],
) -> (Vec<ResourceId>, Vec<LayoutGroup>) {
    let mut sources: Vec<ResourceId> = Vec::new();
    let mut groups: Vec<LayoutGroup> = Vec::new();

    for bound in attribs {
        let stride = bound.attrib.stride;
        let existing = sources
            .iter()
            .zip(&groups)
            .position(|(src, g)| *src == bound.buffer && g.stride == stride);
        match existing {
            Some(i) => groups[i].attribs.push(bound.attrib),
            None => {
                sources.push(bound.buffer);
                groups.push(LayoutGroup {
                    stride,
                    attribs: vec![bound.attrib],
                });
            }
        }
    }
    (sources, groups)
}

impl GraphicsApi for WgpuGraphics<'_> {
    fn create_context(&mut self) -> Result<ContextId, GraphicsError> {
        self.gl.create_context()
    }

    fn make_current(&mut self, ctx: ContextId) -> Result<(), GraphicsError> {
        self.gl.make_current(ctx)
    }

    fn destroy_context(&mut self, ctx: ContextId) -> Result<(), GraphicsError> {
        // Dropping the state releases every wgpu buffer it still owns.
        let state = self.gl.destroy_context(ctx)?;
        if state.live_objects() > 0 {
            log::warn!(
                "context {ctx} destroyed with {} live objects",
                state.live_objects()
            );
        }
        Ok(())
    }

    fn create_vertex_array(&mut self) -> Result<ResourceId, GraphicsError> {
        self.gl.current_mut()?.create_vertex_array()
    }

    fn create_buffer(&mut self) -> Result<ResourceId, GraphicsError> {
        self.gl.current_mut()?.create_buffer()
    }

    fn bind_vertex_array(&mut self, id: Option<ResourceId>) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.bind_vertex_array(id)
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        id: Option<ResourceId>,
    ) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.bind_buffer(target, id)
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> Result<(), GraphicsError> {
        let cx = self.gl.current_mut()?;
        cx.require_binding(target)?;
        cx.store(target, GpuBuffer::new(self.gpu.device(), target, data))
    }

    fn vertex_attrib(&mut self, attrib: VertexAttrib) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.vertex_attrib(attrib)
    }

    fn delete_vertex_array(&mut self, id: ResourceId) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.delete_vertex_array(id)
    }

    fn delete_buffer(&mut self, id: ResourceId) -> Result<(), GraphicsError> {
        // Draws already recorded hold their own handle to the wgpu buffer.
        self.gl.current_mut()?.delete_buffer(id).map(drop)
    }

    fn clear(&mut self, color: ColorRgba) -> Result<(), GraphicsError> {
        self.gl.current()?;
        self.frame.clear = Some(color);
        // A clear discards whatever was drawn before it in this frame.
        self.frame.draws.clear();
        Ok(())
    }

    fn set_transforms(
        &mut self,
        projection: &Mat4,
        model_view: &Mat4,
    ) -> Result<(), GraphicsError> {
        self.gl.current()?;
        self.transforms = TransformsUniform::from_gl(projection, model_view);
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        index_type: IndexType,
    ) -> Result<(), GraphicsError> {
        let device = self.gpu.device();
        let format = self.gpu.surface_format();
        let cx = self.gl.current_mut()?;

        let (_, vao) = cx.bound_vertex_array()?;
        let ibo = vao
            .element_buffer
            .ok_or(GraphicsError::NothingBound("element array buffer"))?;
        let (sources, layout) = group_attribs(&vao.attribs);
        check_layout(&layout)?;

        let vertex_buffers = sources
            .iter()
            .map(|id| {
                cx.storage(*id).map(|b| b.buffer.clone()).ok_or_else(|| {
                    GraphicsError::InvalidDraw(format!("vertex buffer {id} has no data"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let indices = cx.storage_mut(ibo).ok_or_else(|| {
            GraphicsError::InvalidDraw(format!("element buffer {ibo} has no data"))
        })?;
        let needed = index_count as usize * index_type.size_in_bytes();
        if needed > indices.bytes.len() {
            return Err(GraphicsError::InvalidDraw(format!(
                "{index_count} indices need {needed} bytes, buffer {ibo} holds {}",
                indices.bytes.len()
            )));
        }

        let index_buffer = match index_type {
            IndexType::U8 => indices.as_u16_indices(device).clone(),
            IndexType::U16 => indices.buffer.clone(),
        };

        self.pipelines.ensure(device, format, &layout);
        self.frame.draws.push(DrawOp {
            layout,
            vertex_buffers,
            index_buffer,
            index_format: wgpu::IndexFormat::Uint16,
            index_count,
            transforms: self.transforms,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::gfx::state::BoundAttrib;
    use crate::geometry::Vertex;

    fn rid(raw: u32) -> ResourceId {
        ResourceId::new(NonZeroU32::new(raw).unwrap())
    }

    #[test]
    fn interleaved_attribs_share_one_vertex_buffer() {
        let attribs: Vec<BoundAttrib> = Vertex::ATTRIBS
            .iter()
            .map(|&attrib| BoundAttrib { attrib, buffer: rid(2) })
            .collect();

        let (sources, layout) = group_attribs(&attribs);
        assert_eq!(sources, vec![rid(2)]);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].stride, Vertex::STRIDE);
        assert_eq!(layout[0].attribs, Vertex::ATTRIBS.to_vec());
    }

    #[test]
    fn separate_buffers_get_separate_slots() {
        let attribs = vec![
            BoundAttrib { attrib: Vertex::ATTRIBS[0], buffer: rid(2) },
            BoundAttrib { attrib: Vertex::ATTRIBS[1], buffer: rid(3) },
        ];
        let (sources, layout) = group_attribs(&attribs);
        assert_eq!(sources, vec![rid(2), rid(3)]);
        assert_eq!(layout.len(), 2);
    }
}
