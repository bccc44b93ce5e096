use crate::coords::Viewport;
use crate::gfx::GraphicsApi;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    pub gfx: &'a mut dyn GraphicsApi,
    pub time: FrameTime,
    /// Drawable size in physical pixels.
    pub viewport: Viewport,
}
