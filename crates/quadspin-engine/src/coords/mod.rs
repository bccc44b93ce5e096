//! Small value types shared by the session, the backends and the runtime.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
