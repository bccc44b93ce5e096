//! Render session.
//!
//! Owns one graphics context and the three GPU objects holding the quad
//! (vertex array, vertex buffer, index buffer), plus the rotation driven by
//! `update`. Lifecycle:
//!
//! `Uninitialized --initialize--> Ready --update/draw--> Ready --teardown--> TornDown`
//!
//! `TornDown` is terminal. Every call made in the wrong state fails with a
//! [`SessionError`] before touching the graphics API.

mod config;
mod error;
mod render;

pub use config::SessionConfig;
pub use error::SessionError;
pub use render::{RenderSession, SessionState};
