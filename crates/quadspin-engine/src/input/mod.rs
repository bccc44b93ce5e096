//! Input subsystem.
//!
//! The sample reacts to exactly one gesture: a tap toggles pause. Runtime code
//! translates platform events into [`PointerEvent`]s, [`TapDetector`] turns
//! those into taps, and [`PauseState`] is what the display driver consults.
//!
//! Public API is platform-agnostic and does not expose winit types.

mod pause;
pub(crate) mod platform;
mod tap;

pub use pause::PauseState;
pub use tap::{PointerEvent, PointerId, PointerPhase, TapDetector};
