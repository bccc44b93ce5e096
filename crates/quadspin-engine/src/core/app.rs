use crate::gfx::GraphicsApi;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// Call order guaranteed by the runtime:
/// `on_surface_ready`, then any number of `on_tap` / `on_frame`, then
/// `on_surface_lost` exactly once if `on_surface_ready` was called.
pub trait App {
    /// The drawing surface exists; allocate GPU resources.
    fn on_surface_ready(&mut self, gfx: &mut dyn GraphicsApi) -> AppControl;

    /// A tap was recognized.
    fn on_tap(&mut self) {}

    /// While `true`, the runtime does not call `on_frame`.
    fn is_paused(&self) -> bool {
        false
    }

    /// Called once per displayed frame: update, then draw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// The surface is about to go away; release GPU resources.
    fn on_surface_lost(&mut self, gfx: &mut dyn GraphicsApi);
}
