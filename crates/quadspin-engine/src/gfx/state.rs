//! GL object model shared by the backends.
//!
//! Tracks contexts, the names alive in each, and the current bindings. Buffer
//! storage is backend-specific (`B`); everything else follows GL rules:
//! - the element-array binding belongs to the bound vertex array;
//! - an attribute captures the array buffer bound when it is specified;
//! - deleting a bound object unbinds it.

use std::collections::HashMap;
use std::num::NonZeroU32;

use super::{BufferTarget, ContextId, GraphicsError, ResourceId, VertexAttrib};

/// Attribute pointer plus the buffer it reads from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BoundAttrib {
    pub attrib: VertexAttrib,
    pub buffer: ResourceId,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct VertexArrayState {
    pub element_buffer: Option<ResourceId>,
    pub attribs: Vec<BoundAttrib>,
}

pub(crate) struct ContextState<B> {
    next_name: u32,
    /// `None` until the first `buffer_data`.
    pub buffers: HashMap<ResourceId, Option<B>>,
    pub vertex_arrays: HashMap<ResourceId, VertexArrayState>,
    pub array_binding: Option<ResourceId>,
    pub vertex_array_binding: Option<ResourceId>,
    /// Element binding made while no vertex array is bound.
    pub loose_element_binding: Option<ResourceId>,
}

impl<B> ContextState<B> {
    fn new() -> Self {
        Self {
            next_name: 1,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            array_binding: None,
            vertex_array_binding: None,
            loose_element_binding: None,
        }
    }

    fn next_name(&mut self) -> Result<ResourceId, GraphicsError> {
        let raw = NonZeroU32::new(self.next_name).ok_or(GraphicsError::OutOfMemory)?;
        self.next_name = self.next_name.checked_add(1).unwrap_or(0);
        Ok(ResourceId::new(raw))
    }

    pub fn create_buffer(&mut self) -> Result<ResourceId, GraphicsError> {
        let id = self.next_name()?;
        self.buffers.insert(id, None);
        Ok(id)
    }

    pub fn create_vertex_array(&mut self) -> Result<ResourceId, GraphicsError> {
        let id = self.next_name()?;
        self.vertex_arrays.insert(id, VertexArrayState::default());
        Ok(id)
    }

    pub fn live_objects(&self) -> usize {
        self.buffers.len() + self.vertex_arrays.len()
    }

    pub fn bind_vertex_array(&mut self, id: Option<ResourceId>) -> Result<(), GraphicsError> {
        if let Some(id) = id {
            if !self.vertex_arrays.contains_key(&id) {
                return Err(GraphicsError::UnknownResource(id));
            }
        }
        self.vertex_array_binding = id;
        Ok(())
    }

    pub fn bind_buffer(
        &mut self,
        target: BufferTarget,
        id: Option<ResourceId>,
    ) -> Result<(), GraphicsError> {
        if let Some(id) = id {
            if !self.buffers.contains_key(&id) {
                return Err(GraphicsError::UnknownResource(id));
            }
        }
        match target {
            BufferTarget::Array => self.array_binding = id,
            BufferTarget::ElementArray => match self.bound_vertex_array_mut() {
                Some(vao) => vao.element_buffer = id,
                None => self.loose_element_binding = id,
            },
        }
        Ok(())
    }

    pub fn binding(&self, target: BufferTarget) -> Option<ResourceId> {
        match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => match self.vertex_array_binding {
                Some(vao) => self.vertex_arrays.get(&vao).and_then(|v| v.element_buffer),
                None => self.loose_element_binding,
            },
        }
    }

    /// Returns the id bound to `target` or a `NothingBound` error.
    pub fn require_binding(&self, target: BufferTarget) -> Result<ResourceId, GraphicsError> {
        self.binding(target)
            .ok_or(GraphicsError::NothingBound(target.label()))
    }

    pub fn store(&mut self, target: BufferTarget, storage: B) -> Result<(), GraphicsError> {
        let id = self.require_binding(target)?;
        let slot = self
            .buffers
            .get_mut(&id)
            .ok_or(GraphicsError::UnknownResource(id))?;
        *slot = Some(storage);
        Ok(())
    }

    pub fn storage(&self, id: ResourceId) -> Option<&B> {
        self.buffers.get(&id).and_then(|b| b.as_ref())
    }

    pub fn storage_mut(&mut self, id: ResourceId) -> Option<&mut B> {
        self.buffers.get_mut(&id).and_then(|b| b.as_mut())
    }

    pub fn vertex_attrib(&mut self, attrib: VertexAttrib) -> Result<(), GraphicsError> {
        let buffer = self.require_binding(BufferTarget::Array)?;
        let vao = self
            .bound_vertex_array_mut()
            .ok_or(GraphicsError::NothingBound("vertex array"))?;

        vao.attribs.retain(|a| a.attrib.location != attrib.location);
        vao.attribs.push(BoundAttrib { attrib, buffer });
        vao.attribs.sort_by_key(|a| a.attrib.location);
        Ok(())
    }

    pub fn bound_vertex_array(&self) -> Result<(ResourceId, &VertexArrayState), GraphicsError> {
        let id = self
            .vertex_array_binding
            .ok_or(GraphicsError::NothingBound("vertex array"))?;
        let vao = self
            .vertex_arrays
            .get(&id)
            .ok_or(GraphicsError::UnknownResource(id))?;
        Ok((id, vao))
    }

    fn bound_vertex_array_mut(&mut self) -> Option<&mut VertexArrayState> {
        let id = self.vertex_array_binding?;
        self.vertex_arrays.get_mut(&id)
    }

    pub fn delete_vertex_array(&mut self, id: ResourceId) -> Result<(), GraphicsError> {
        self.vertex_arrays
            .remove(&id)
            .ok_or(GraphicsError::UnknownResource(id))?;
        if self.vertex_array_binding == Some(id) {
            self.vertex_array_binding = None;
        }
        Ok(())
    }

    pub fn delete_buffer(&mut self, id: ResourceId) -> Result<Option<B>, GraphicsError> {
        let storage = self
            .buffers
            .remove(&id)
            .ok_or(GraphicsError::UnknownResource(id))?;

        if self.array_binding == Some(id) {
            self.array_binding = None;
        }
        if self.loose_element_binding == Some(id) {
            self.loose_element_binding = None;
        }
        // Only the bound vertex array drops its reference; others keep a
        // dangling name, as in GL.
        if let Some(vao) = self.bound_vertex_array_mut() {
            if vao.element_buffer == Some(id) {
                vao.element_buffer = None;
            }
        }
        Ok(storage)
    }
}

/// All contexts of one backend plus the current-context pointer.
pub(crate) struct GlState<B> {
    next_context: u32,
    contexts: HashMap<ContextId, ContextState<B>>,
    current: Option<ContextId>,
}

impl<B> Default for GlState<B> {
    fn default() -> Self {
        Self {
            next_context: 1,
            contexts: HashMap::new(),
            current: None,
        }
    }
}

impl<B> GlState<B> {
    pub fn create_context(&mut self) -> Result<ContextId, GraphicsError> {
        let raw = NonZeroU32::new(self.next_context).ok_or(GraphicsError::OutOfMemory)?;
        self.next_context = self.next_context.checked_add(1).unwrap_or(0);

        let id = ContextId::new(raw);
        self.contexts.insert(id, ContextState::new());
        Ok(id)
    }

    pub fn make_current(&mut self, ctx: ContextId) -> Result<(), GraphicsError> {
        if !self.contexts.contains_key(&ctx) {
            return Err(GraphicsError::UnknownContext(ctx));
        }
        self.current = Some(ctx);
        Ok(())
    }

    pub fn destroy_context(&mut self, ctx: ContextId) -> Result<ContextState<B>, GraphicsError> {
        let state = self
            .contexts
            .remove(&ctx)
            .ok_or(GraphicsError::UnknownContext(ctx))?;
        if self.current == Some(ctx) {
            self.current = None;
        }
        Ok(state)
    }

    pub fn current_id(&self) -> Option<ContextId> {
        self.current
    }

    pub fn current(&self) -> Result<&ContextState<B>, GraphicsError> {
        self.current
            .and_then(|id| self.contexts.get(&id))
            .ok_or(GraphicsError::NoCurrentContext)
    }

    pub fn current_mut(&mut self) -> Result<&mut ContextState<B>, GraphicsError> {
        self.current
            .and_then(|id| self.contexts.get_mut(&id))
            .ok_or(GraphicsError::NoCurrentContext)
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn live_objects(&self) -> usize {
        self.contexts.values().map(ContextState::live_objects).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::AttribFormat;

    const POS: VertexAttrib = VertexAttrib {
        location: 0,
        format: AttribFormat::Float32x3,
        stride: 12,
        offset: 0,
    };

    fn with_context() -> GlState<Vec<u8>> {
        let mut gl = GlState::default();
        let ctx = gl.create_context().unwrap();
        gl.make_current(ctx).unwrap();
        gl
    }

    #[test]
    fn calls_without_current_context_fail() {
        let mut gl: GlState<Vec<u8>> = GlState::default();
        assert_eq!(
            gl.current_mut().err(),
            Some(GraphicsError::NoCurrentContext)
        );
    }

    #[test]
    fn element_binding_lives_in_vertex_array() {
        let mut gl = with_context();
        let cx = gl.current_mut().unwrap();
        let vao = cx.create_vertex_array().unwrap();
        let ibo = cx.create_buffer().unwrap();

        cx.bind_vertex_array(Some(vao)).unwrap();
        cx.bind_buffer(BufferTarget::ElementArray, Some(ibo)).unwrap();
        cx.bind_vertex_array(None).unwrap();
        assert_eq!(cx.binding(BufferTarget::ElementArray), None);

        cx.bind_vertex_array(Some(vao)).unwrap();
        assert_eq!(cx.binding(BufferTarget::ElementArray), Some(ibo));
    }

    #[test]
    fn attrib_captures_array_binding() {
        let mut gl = with_context();
        let cx = gl.current_mut().unwrap();
        let vao = cx.create_vertex_array().unwrap();
        let vbo = cx.create_buffer().unwrap();

        cx.bind_vertex_array(Some(vao)).unwrap();
        assert_eq!(
            cx.vertex_attrib(POS),
            Err(GraphicsError::NothingBound("array buffer"))
        );

        cx.bind_buffer(BufferTarget::Array, Some(vbo)).unwrap();
        cx.vertex_attrib(POS).unwrap();
        cx.bind_buffer(BufferTarget::Array, None).unwrap();

        let (_, state) = cx.bound_vertex_array().unwrap();
        assert_eq!(state.attribs, vec![BoundAttrib { attrib: POS, buffer: vbo }]);
    }

    #[test]
    fn deleting_bound_buffer_unbinds_it() {
        let mut gl = with_context();
        let cx = gl.current_mut().unwrap();
        let vbo = cx.create_buffer().unwrap();
        cx.bind_buffer(BufferTarget::Array, Some(vbo)).unwrap();
        cx.delete_buffer(vbo).unwrap();

        assert_eq!(cx.binding(BufferTarget::Array), None);
        assert_eq!(cx.delete_buffer(vbo), Err(GraphicsError::UnknownResource(vbo)));
    }

    #[test]
    fn destroying_current_context_clears_current() {
        let mut gl: GlState<Vec<u8>> = GlState::default();
        let ctx = gl.create_context().unwrap();
        gl.make_current(ctx).unwrap();
        gl.destroy_context(ctx).unwrap();

        assert_eq!(gl.current_id(), None);
        assert_eq!(gl.make_current(ctx), Err(GraphicsError::UnknownContext(ctx)));
    }

    #[test]
    fn names_are_per_context() {
        let mut gl: GlState<Vec<u8>> = GlState::default();
        let a = gl.create_context().unwrap();
        let b = gl.create_context().unwrap();

        gl.make_current(a).unwrap();
        let in_a = gl.current_mut().unwrap().create_buffer().unwrap();
        gl.make_current(b).unwrap();
        let in_b = gl.current_mut().unwrap().create_buffer().unwrap();

        // Same name, different objects.
        assert_eq!(in_a, in_b);
        gl.current_mut().unwrap().delete_buffer(in_b).unwrap();
        gl.make_current(a).unwrap();
        assert!(gl.current().unwrap().buffers.contains_key(&in_a));
    }
}
