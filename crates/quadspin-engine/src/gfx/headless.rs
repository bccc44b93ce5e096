//! In-memory graphics backend.
//!
//! Keeps buffer contents on the CPU, validates every name and binding the way a
//! GL driver would, and records the call stream so callers can assert on it.
//! Draw calls are checked against the bound buffers: every index must address a
//! vertex that exists in each attribute's source buffer.

use glam::Mat4;

use crate::coords::ColorRgba;

use super::state::GlState;
use super::{
    BufferTarget, ContextId, GraphicsApi, GraphicsError, IndexType, ResourceId, VertexAttrib,
};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    CreateContext(ContextId),
    MakeCurrent(ContextId),
    DestroyContext(ContextId),
    CreateVertexArray(ResourceId),
    CreateBuffer(ResourceId),
    BindVertexArray(Option<ResourceId>),
    BindBuffer(BufferTarget, Option<ResourceId>),
    BufferData { target: BufferTarget, len: usize },
    VertexAttrib(VertexAttrib),
    DeleteVertexArray(ResourceId),
    DeleteBuffer(ResourceId),
    Clear(ColorRgba),
    SetTransforms { projection: Mat4, model_view: Mat4 },
    DrawIndexed { index_count: u32, index_type: IndexType },
}

/// Headless [`GraphicsApi`] implementation.
#[derive(Default)]
pub struct HeadlessGraphics {
    gl: GlState<Vec<u8>>,
    calls: Vec<GfxCall>,
    allocations: usize,
    allocation_limit: Option<usize>,
    transforms: Option<(Mat4, Mat4)>,
    clear_color: Option<ColorRgba>,
    draws: usize,
}

impl HeadlessGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every object creation after `limit` successful ones.
    ///
    /// Contexts, vertex arrays and buffers all count.
    pub fn with_allocation_limit(limit: usize) -> Self {
        Self {
            allocation_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GfxCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn live_contexts(&self) -> usize {
        self.gl.context_count()
    }

    /// Buffers and vertex arrays alive across all contexts.
    pub fn live_objects(&self) -> usize {
        self.gl.live_objects()
    }

    pub fn current_context(&self) -> Option<ContextId> {
        self.gl.current_id()
    }

    /// Binding of `target` in the current context.
    pub fn binding(&self, target: BufferTarget) -> Option<ResourceId> {
        self.gl.current().ok().and_then(|cx| cx.binding(target))
    }

    pub fn bound_vertex_array(&self) -> Option<ResourceId> {
        self.gl.current().ok().and_then(|cx| cx.vertex_array_binding)
    }

    /// Contents of a buffer in the current context.
    pub fn buffer_contents(&self, id: ResourceId) -> Option<&[u8]> {
        self.gl
            .current()
            .ok()
            .and_then(|cx| cx.storage(id))
            .map(Vec::as_slice)
    }

    /// Last `(projection, model_view)` pair handed to [`GraphicsApi::set_transforms`].
    pub fn transforms(&self) -> Option<(Mat4, Mat4)> {
        self.transforms
    }

    pub fn clear_color(&self) -> Option<ColorRgba> {
        self.clear_color
    }

    /// Number of successful draw calls.
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    fn allocate(&mut self) -> Result<(), GraphicsError> {
        if self.allocation_limit.is_some_and(|limit| self.allocations >= limit) {
            log::warn!("headless: allocation limit reached");
            return Err(GraphicsError::OutOfMemory);
        }
        self.allocations += 1;
        Ok(())
    }

    fn validate_draw(&self, index_count: u32, index_type: IndexType) -> Result<(), GraphicsError> {
        let cx = self.gl.current()?;
        let (_, vao) = cx.bound_vertex_array()?;

        let ibo = vao
            .element_buffer
            .ok_or(GraphicsError::NothingBound("element array buffer"))?;
        let index_bytes = cx.storage(ibo).ok_or_else(|| {
            GraphicsError::InvalidDraw(format!("element buffer {ibo} has no data"))
        })?;

        let needed = index_count as usize * index_type.size_in_bytes();
        if needed > index_bytes.len() {
            return Err(GraphicsError::InvalidDraw(format!(
                "{index_count} indices need {needed} bytes, buffer {ibo} holds {}",
                index_bytes.len()
            )));
        }
        if index_count % 3 != 0 {
            return Err(GraphicsError::InvalidDraw(format!(
                "{index_count} indices do not form whole triangles"
            )));
        }
        if vao.attribs.is_empty() {
            return Err(GraphicsError::InvalidDraw("no vertex attributes enabled".into()));
        }

        let indices = index_type.decode(&index_bytes[..needed]);
        let max_index = indices.iter().copied().max().unwrap_or(0) as usize;

        for bound in &vao.attribs {
            let data = cx.storage(bound.buffer).ok_or_else(|| {
                GraphicsError::InvalidDraw(format!("vertex buffer {} has no data", bound.buffer))
            })?;
            let a = bound.attrib;
            let end = max_index * a.stride as usize + (a.offset + a.format.size_in_bytes()) as usize;
            if end > data.len() {
                return Err(GraphicsError::InvalidDraw(format!(
                    "index {max_index} reads past the end of vertex buffer {} (attribute {})",
                    bound.buffer, a.location
                )));
            }
        }
        Ok(())
    }
}

impl GraphicsApi for HeadlessGraphics {
    fn create_context(&mut self) -> Result<ContextId, GraphicsError> {
        self.allocate()?;
        let ctx = self.gl.create_context()?;
        self.calls.push(GfxCall::CreateContext(ctx));
        Ok(ctx)
    }

    fn make_current(&mut self, ctx: ContextId) -> Result<(), GraphicsError> {
        self.gl.make_current(ctx)?;
        self.calls.push(GfxCall::MakeCurrent(ctx));
        Ok(())
    }

    fn destroy_context(&mut self, ctx: ContextId) -> Result<(), GraphicsError> {
        let state = self.gl.destroy_context(ctx)?;
        if state.live_objects() > 0 {
            log::warn!(
                "headless: context {ctx} destroyed with {} live objects",
                state.live_objects()
            );
        }
        self.calls.push(GfxCall::DestroyContext(ctx));
        Ok(())
    }

    fn create_vertex_array(&mut self) -> Result<ResourceId, GraphicsError> {
        self.gl.current()?;
        self.allocate()?;
        let id = self.gl.current_mut()?.create_vertex_array()?;
        self.calls.push(GfxCall::CreateVertexArray(id));
        Ok(id)
    }

    fn create_buffer(&mut self) -> Result<ResourceId, GraphicsError> {
        self.gl.current()?;
        self.allocate()?;
        let id = self.gl.current_mut()?.create_buffer()?;
        self.calls.push(GfxCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_vertex_array(&mut self, id: Option<ResourceId>) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.bind_vertex_array(id)?;
        self.calls.push(GfxCall::BindVertexArray(id));
        Ok(())
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        id: Option<ResourceId>,
    ) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.bind_buffer(target, id)?;
        self.calls.push(GfxCall::BindBuffer(target, id));
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.store(target, data.to_vec())?;
        self.calls.push(GfxCall::BufferData {
            target,
            len: data.len(),
        });
        Ok(())
    }

    fn vertex_attrib(&mut self, attrib: VertexAttrib) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.vertex_attrib(attrib)?;
        self.calls.push(GfxCall::VertexAttrib(attrib));
        Ok(())
    }

    fn delete_vertex_array(&mut self, id: ResourceId) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.delete_vertex_array(id)?;
        self.calls.push(GfxCall::DeleteVertexArray(id));
        Ok(())
    }

    fn delete_buffer(&mut self, id: ResourceId) -> Result<(), GraphicsError> {
        self.gl.current_mut()?.delete_buffer(id)?;
        self.calls.push(GfxCall::DeleteBuffer(id));
        Ok(())
    }

    fn clear(&mut self, color: ColorRgba) -> Result<(), GraphicsError> {
        self.gl.current()?;
        self.clear_color = Some(color);
        self.calls.push(GfxCall::Clear(color));
        Ok(())
    }

    fn set_transforms(
        &mut self,
        projection: &Mat4,
        model_view: &Mat4,
    ) -> Result<(), GraphicsError> {
        self.gl.current()?;
        self.transforms = Some((*projection, *model_view));
        self.calls.push(GfxCall::SetTransforms {
            projection: *projection,
            model_view: *model_view,
        });
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        index_type: IndexType,
    ) -> Result<(), GraphicsError> {
        self.validate_draw(index_count, index_type)?;
        self.draws += 1;
        self.calls.push(GfxCall::DrawIndexed {
            index_count,
            index_type,
        });
        Ok(())
    }
}
