//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (display driver, input source,
//! lifecycle host) and the application owning a render session. Applications
//! see the GPU only as `dyn GraphicsApi`, so the same app runs against the
//! windowed backend or the headless one.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
