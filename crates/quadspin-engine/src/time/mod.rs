//! Time subsystem.
//!
//! One `FrameClock` per window; `tick()` once per presented frame yields the
//! `dt` for the session update.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
