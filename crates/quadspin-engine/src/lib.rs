//! quadspin engine crate.
//!
//! A render session that uploads one colored quad, spins it, and draws it
//! through a GL-shaped graphics API, plus the platform pieces (window, GPU
//! device, input, frame clock) that host it.

pub mod coords;
pub mod effect;
pub mod geometry;
pub mod gfx;
pub mod session;

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod logging;
