//! Graphics API seam.
//!
//! The render session talks to the GPU through [`GraphicsApi`], a narrow,
//! GL-shaped interface: named contexts, integer resource names, a bind-then-act
//! model for buffers and vertex arrays. Two backends implement it:
//! - [`WgpuGraphics`]: emulates the GL object model on top of wgpu and presents
//!   to a window surface.
//! - [`HeadlessGraphics`]: in-memory, records every call; used by tests and for
//!   running without a window.
//!
//! Resources are scoped to the context that was current when they were created.

mod error;
mod handle;
mod state;
mod types;

pub mod headless;
pub mod wgpu_backend;

pub use error::GraphicsError;
pub use handle::{ContextId, GpuHandle, ResourceId};
pub use headless::{GfxCall, HeadlessGraphics};
pub use types::{AttribFormat, BufferTarget, IndexType, VertexAttrib};
pub use wgpu_backend::WgpuGraphics;

use glam::Mat4;

use crate::coords::ColorRgba;

/// GL-style rendering interface consumed by the render session.
///
/// All calls act on the current context unless they name one explicitly.
/// Calls that need a current context fail with
/// [`GraphicsError::NoCurrentContext`] when there is none.
pub trait GraphicsApi {
    /// Creates a new, empty context. Does not make it current.
    fn create_context(&mut self) -> Result<ContextId, GraphicsError>;

    fn make_current(&mut self, ctx: ContextId) -> Result<(), GraphicsError>;

    /// Destroys `ctx` together with any resources still alive in it.
    ///
    /// If `ctx` was current, no context is current afterwards.
    fn destroy_context(&mut self, ctx: ContextId) -> Result<(), GraphicsError>;

    fn create_vertex_array(&mut self) -> Result<ResourceId, GraphicsError>;

    fn create_buffer(&mut self) -> Result<ResourceId, GraphicsError>;

    /// Binds a vertex array, or unbinds with `None`.
    ///
    /// The element-array binding and attribute pointers are part of the
    /// vertex array state.
    fn bind_vertex_array(&mut self, id: Option<ResourceId>) -> Result<(), GraphicsError>;

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        id: Option<ResourceId>,
    ) -> Result<(), GraphicsError>;

    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> Result<(), GraphicsError>;

    /// Enables `attrib` on the bound vertex array, sourcing from the buffer
    /// bound to [`BufferTarget::Array`].
    fn vertex_attrib(&mut self, attrib: VertexAttrib) -> Result<(), GraphicsError>;

    fn delete_vertex_array(&mut self, id: ResourceId) -> Result<(), GraphicsError>;

    fn delete_buffer(&mut self, id: ResourceId) -> Result<(), GraphicsError>;

    /// Clears the color buffer.
    fn clear(&mut self, color: ColorRgba) -> Result<(), GraphicsError>;

    /// Sets the transforms used by subsequent draws.
    ///
    /// `projection` follows the GL clip-space convention (depth in `-1..1`).
    fn set_transforms(&mut self, projection: &Mat4, model_view: &Mat4)
    -> Result<(), GraphicsError>;

    /// Draws `index_count` indices as a triangle list using the bound vertex
    /// array.
    fn draw_indexed(&mut self, index_count: u32, index_type: IndexType)
    -> Result<(), GraphicsError>;
}
