//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the wgpu graphics
//! backend, and drives an [`App`](crate::core::App) through its surface
//! lifecycle.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
