//! GPU device and window surface.
//!
//! [`Gpu`] is the wgpu half of [`WgpuGraphics`](crate::gfx::WgpuGraphics):
//! it picks an adapter able to present to the window, requests a device with
//! GLES-class limits, and hands out one swapchain texture per frame.

mod context;
mod error;
mod init;
mod surface;

pub use context::{Gpu, SurfaceFrame};
pub use error::FrameSkipped;
pub use init::{GpuInit, SurfaceEncoding};
